//! Inode table lookup.

use crate::device::read_at;
use crate::error::{Ext2Error, Result};
use crate::group_desc::GroupDescriptor;
use crate::superblock::Superblock;
use std::io::{Read, Seek};
use std::mem::{size_of, zeroed};
use std::slice;

/// Fixed on-disk inode size this core assumes (rev-0 layout); larger
/// `inode_size` values from a rev-1 superblock are not read.
const INODE_SIZE: usize = size_of::<RawInode>();

const S_IFMT: u16 = 0xf000;
const S_IFDIR: u16 = 0x4000;
const S_IFREG: u16 = 0x8000;

#[repr(C, packed)]
pub(crate) struct RawInode {
	pub mode: u16,
	pub uid: u16,
	pub size: u32,
	pub atime: u32,
	pub ctime: u32,
	pub mtime: u32,
	pub dtime: u32,
	pub gid: u16,
	pub links_count: u16,
	pub blocks: u32,
	pub flags: u32,
	pub osd1: u32,
	pub block: [u32; 15],
	pub generation: u32,
	pub file_acl: u32,
	pub dir_acl: u32,
	pub faddr: u32,
	pub osd2: [u8; 12],
}

/// A decoded inode: the fields needed to resolve a path component to the
/// blocks holding its data.
#[derive(Clone, Copy, Debug)]
pub struct Inode {
	pub mode: u16,
	pub size: u32,
	pub links_count: u16,
	/// The 15 on-disk block pointers: 12 direct, then singly, doubly and
	/// trebly indirect.
	pub block: [u32; 15],
}

impl Inode {
	/// `true` if this inode's type bits mark it a directory.
	pub fn is_dir(&self) -> bool {
		self.mode & S_IFMT == S_IFDIR
	}

	/// `true` if this inode's type bits mark it a regular file.
	pub fn is_file(&self) -> bool {
		self.mode & S_IFMT == S_IFREG
	}

	/// Reads inode number `n` (1-based, per ext2 convention; inode 2 is
	/// always the root directory).
	pub(crate) fn read<D: Read + Seek>(
		dev: &mut D,
		partition_start: u64,
		superblock: &Superblock,
		n: u32,
	) -> Result<Self> {
		if n == 0 || superblock.inodes_per_group == 0 {
			return Err(Ext2Error::Internal);
		}

		let index = n - 1;
		let group = index / superblock.inodes_per_group;
		let index_in_group = index % superblock.inodes_per_group;

		let gd = GroupDescriptor::read(dev, partition_start, superblock, group)?;
		let offset = partition_start
			+ gd.inode_table as u64 * superblock.block_size as u64
			+ index_in_group as u64 * INODE_SIZE as u64;

		let bytes = read_at(dev, offset, INODE_SIZE)?;

		let mut raw: RawInode = unsafe { zeroed() };
		let dst = unsafe { slice::from_raw_parts_mut(&mut raw as *mut _ as *mut u8, INODE_SIZE) };
		dst.copy_from_slice(&bytes);

		Ok(Self {
			mode: raw.mode,
			size: raw.size,
			links_count: raw.links_count,
			block: raw.block,
		})
	}
}
