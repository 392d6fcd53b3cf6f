//! Reads and validates the superblock at a partition-relative offset.

use crate::device::read_at;
use crate::error::{Ext2Error, Result};
use std::io::{Read, Seek};
use std::mem::{size_of, zeroed};
use std::slice;

/// Offset of the superblock from the start of the partition.
pub(crate) const SUPERBLOCK_OFFSET: u64 = 1024;
/// Number of on-disk bytes the core interprets; everything past this is a
/// rev-1 field this implementation does not need.
const SUPERBLOCK_READ_LEN: usize = size_of::<RawSuperblock>();
/// The filesystem's signature.
const EXT2_MAGIC: u16 = 0xef53;

/// The fields of the on-disk superblock this crate interprets, in their
/// on-disk order. Fields past byte 84 (volume name, feature flags, 64-bit
/// sizes, journal fields, ...) are rev-1 additions this core does not
/// interpret.
#[repr(C, packed)]
struct RawSuperblock {
	inodes_count: u32,
	blocks_count: u32,
	r_blocks_count: u32,
	free_blocks_count: u32,
	free_inodes_count: u32,
	first_data_block: u32,
	log_block_size: u32,
	log_frag_size: u32,
	blocks_per_group: u32,
	frags_per_group: u32,
	inodes_per_group: u32,
	mtime: u32,
	wtime: u32,
	mnt_count: u16,
	max_mnt_count: u16,
	magic: u16,
	state: u16,
	errors: u16,
	minor_rev_level: u16,
	lastcheck: u32,
	checkinterval: u32,
	creator_os: u32,
	rev_level: u32,
	uid_reserved: u16,
	gid_reserved: u16,
}

/// A decoded ext2 superblock, established once per [`Session`](crate::Session)
/// and treated as immutable for the rest of the session's lifetime.
#[derive(Clone, Copy, Debug)]
pub struct Superblock {
	pub inodes_count: u32,
	pub blocks_count: u32,
	pub free_blocks_count: u32,
	pub free_inodes_count: u32,
	pub first_data_block: u32,
	pub log_block_size: u32,
	pub log_frag_size: u32,
	pub blocks_per_group: u32,
	pub inodes_per_group: u32,
	pub rev_level: u32,
	pub minor_rev_level: u16,
	/// Derived as `1024 << log_block_size`; always one of `{1024, 2048,
	/// 4096}`.
	pub block_size: u32,
}

impl Superblock {
	/// Reads and validates the superblock at `partition_start + 1024`.
	///
	/// Fails with [`Ext2Error::NotExt2`] if the magic number does not
	/// match, or [`Ext2Error::Internal`] if the derived block size is
	/// outside `{1024, 2048, 4096}`.
	pub(crate) fn read<D: Read + Seek>(dev: &mut D, partition_start: u64) -> Result<Self> {
		let bytes = read_at(dev, partition_start + SUPERBLOCK_OFFSET, SUPERBLOCK_READ_LEN)?;

		let mut raw: RawSuperblock = unsafe { zeroed() };
		let dst = unsafe {
			slice::from_raw_parts_mut(&mut raw as *mut _ as *mut u8, SUPERBLOCK_READ_LEN)
		};
		dst.copy_from_slice(&bytes);

		if raw.magic != EXT2_MAGIC {
			return Err(Ext2Error::NotExt2);
		}

		let block_size = 1024u32
			.checked_shl(raw.log_block_size)
			.filter(|size| matches!(size, 1024 | 2048 | 4096))
			.ok_or(Ext2Error::Internal)?;

		Ok(Self {
			inodes_count: raw.inodes_count,
			blocks_count: raw.blocks_count,
			free_blocks_count: raw.free_blocks_count,
			free_inodes_count: raw.free_inodes_count,
			first_data_block: raw.first_data_block,
			log_block_size: raw.log_block_size,
			log_frag_size: raw.log_frag_size,
			blocks_per_group: raw.blocks_per_group,
			inodes_per_group: raw.inodes_per_group,
			rev_level: raw.rev_level,
			minor_rev_level: raw.minor_rev_level,
			block_size,
		})
	}

	/// Block number of the block-group descriptor table: the block
	/// immediately following the superblock.
	pub(crate) fn descriptor_table_block(&self) -> u32 {
		if self.block_size == 1024 {
			2
		} else {
			1
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::session::test_support::build_image;
	use std::io::Cursor;

	#[test]
	fn rejects_bad_magic() {
		let mut dev = Cursor::new(vec![0u8; 4096]);
		let err = Superblock::read(&mut dev, 0).unwrap_err();
		assert!(matches!(err, Ext2Error::NotExt2));
	}

	#[test]
	fn derives_block_size() {
		for block_size in [1024u32, 2048, 4096] {
			let image = build_image(block_size, &[]);
			let mut dev = Cursor::new(image);
			let sb = Superblock::read(&mut dev, 0).unwrap();
			assert_eq!(sb.block_size, block_size);
		}
	}

	#[test]
	fn descriptor_table_block_matches_block_size() {
		let image = build_image(1024, &[]);
		let mut dev = Cursor::new(image);
		let sb = Superblock::read(&mut dev, 0).unwrap();
		assert_eq!(sb.descriptor_table_block(), 2);

		let image = build_image(4096, &[]);
		let mut dev = Cursor::new(image);
		let sb = Superblock::read(&mut dev, 0).unwrap();
		assert_eq!(sb.descriptor_table_block(), 1);
	}
}
