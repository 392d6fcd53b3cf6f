//! Block-group descriptor table lookup.

use crate::device::read_at;
use crate::error::Result;
use crate::superblock::Superblock;
use std::io::{Read, Seek};
use std::mem::{size_of, zeroed};
use std::slice;

/// On-disk size of the fields this crate decodes out of a group descriptor.
const DESCRIPTOR_SIZE: usize = size_of::<RawGroupDescriptor>();
/// Actual on-disk stride between two group descriptors: 14 reserved bytes
/// follow the fields below, padding every entry out to 32 bytes.
const GROUP_DESCRIPTOR_ENTRY_SIZE: u64 = 32;

#[repr(C, packed)]
struct RawGroupDescriptor {
	block_bitmap: u32,
	inode_bitmap: u32,
	inode_table: u32,
	free_blocks_count: u16,
	free_inodes_count: u16,
	used_dirs_count: u16,
}

/// A decoded block-group descriptor. Only `inode_table` is consulted by the
/// Inode Resolver.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GroupDescriptor {
	pub inode_table: u32,
}

impl GroupDescriptor {
	/// Reads the `group`-th group descriptor for the given superblock.
	pub(crate) fn read<D: Read + Seek>(
		dev: &mut D,
		partition_start: u64,
		superblock: &Superblock,
		group: u32,
	) -> Result<Self> {
		let table_block = superblock.descriptor_table_block() as u64;
		let offset = partition_start
			+ table_block * superblock.block_size as u64
			+ group as u64 * GROUP_DESCRIPTOR_ENTRY_SIZE;

		let bytes = read_at(dev, offset, DESCRIPTOR_SIZE)?;

		let mut raw: RawGroupDescriptor = unsafe { zeroed() };
		let dst = unsafe {
			slice::from_raw_parts_mut(&mut raw as *mut _ as *mut u8, DESCRIPTOR_SIZE)
		};
		dst.copy_from_slice(&bytes);

		Ok(Self { inode_table: raw.inode_table })
	}
}
