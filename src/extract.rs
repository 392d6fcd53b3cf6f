//! Copies a regular file's data out through a caller-supplied byte sink.

use crate::blocks::data_blocks;
use crate::device::read_at;
use crate::error::{Ext2Error, Result};
use crate::inode::Inode;
use std::io::{Read, Seek, Write};

/// The destination for extracted file data. A hole in the file (an
/// unallocated logical block) is synthesized here as `block_size` zero
/// bytes — `data_blocks` itself never does this, since it has no opinion
/// about what a hole should read as.
pub trait Sink {
	fn write_bytes(&mut self, data: &[u8]) -> Result<()>;
}

impl<W: Write> Sink for W {
	fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
		self.write_all(data).map_err(|_| Ext2Error::Internal)
	}
}

/// Writes `inode`'s data, in order, to `sink`. The last block is truncated
/// to whatever remains of `inode.size`, matching the source's "short last
/// block" behavior rather than padding it out to a full block.
pub(crate) fn extract<D: Read + Seek, S: Sink>(
	dev: &mut D,
	partition_start: u64,
	block_size: u32,
	inode: &Inode,
	sink: &mut S,
) -> Result<()> {
	let blocks = data_blocks(dev, partition_start, block_size, inode)?;
	let mut remaining = inode.size as u64;

	for block in blocks {
		let this_len = remaining.min(block_size as u64) as usize;
		if block == 0 {
			sink.write_bytes(&vec![0u8; this_len])?;
		} else {
			let bytes = read_at(dev, partition_start + block as u64 * block_size as u64, this_len)?;
			sink.write_bytes(&bytes)?;
		}
		remaining -= this_len as u64;
	}

	Ok(())
}
