//! Turns an inode's block pointers into the ordered list of physical blocks
//! holding its data, walking the singly, doubly and trebly indirect levels
//! as needed.

use crate::device::read_at;
use crate::error::Result;
use crate::inode::Inode;
use std::io::{Read, Seek};

/// Reads a block of `u32` pointers. A zero block number is a hole: every
/// pointer beneath it is implicitly zero too, and no read is issued for it.
fn read_ptr_table<D: Read + Seek>(
	dev: &mut D,
	partition_start: u64,
	block_num: u32,
	block_size: u32,
) -> Result<Vec<u32>> {
	let count = block_size as usize / 4;
	if block_num == 0 {
		return Ok(vec![0u32; count]);
	}
	let bytes = read_at(dev, partition_start + block_num as u64 * block_size as u64, block_size as usize)?;
	Ok(bytes
		.chunks_exact(4)
		.map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
		.collect())
}

/// Returns the ordered list of physical block numbers backing `inode`'s
/// data, one entry per logical block in `0..ceil(inode.size / block_size)`.
///
/// A pointer that is zero — whether a direct pointer or one found inside an
/// indirect table — is returned unchanged as `0`; this function never reads
/// beyond what the file's size requires, and never synthesizes bytes for a
/// hole. That is the caller's job.
pub fn data_blocks<D: Read + Seek>(
	dev: &mut D,
	partition_start: u64,
	block_size: u32,
	inode: &Inode,
) -> Result<Vec<u32>> {
	let n = (inode.size as u64).div_ceil(block_size as u64) as usize;
	if n == 0 {
		return Ok(Vec::new());
	}

	let a = block_size as usize / 4;
	let direct_end = 12;
	let singly_end = direct_end + a;
	let doubly_end = singly_end + a * a;
	let trebly_end = doubly_end + a * a * a;

	let mut out = Vec::with_capacity(n);

	let mut singly_table: Option<Vec<u32>> = None;
	let mut doubly_top: Option<Vec<u32>> = None;
	let mut doubly_inner: Option<(usize, Vec<u32>)> = None;
	let mut trebly_top: Option<Vec<u32>> = None;
	let mut trebly_mid: Option<(usize, Vec<u32>)> = None;
	let mut trebly_inner: Option<(usize, usize, Vec<u32>)> = None;

	for i in 0..n {
		let block = if i < direct_end {
			inode.block[i]
		} else if i < singly_end {
			let table = match &singly_table {
				Some(t) => t,
				None => {
					singly_table = Some(read_ptr_table(dev, partition_start, inode.block[12], block_size)?);
					singly_table.as_ref().unwrap()
				}
			};
			table[i - direct_end]
		} else if i < doubly_end {
			let idx = i - singly_end;
			let outer = idx / a;
			let inner = idx % a;

			let top = match &doubly_top {
				Some(t) => t,
				None => {
					doubly_top = Some(read_ptr_table(dev, partition_start, inode.block[13], block_size)?);
					doubly_top.as_ref().unwrap()
				}
			};
			let inner_block_num = top[outer];

			let needs_reload = !matches!(&doubly_inner, Some((cached_outer, _)) if *cached_outer == outer);
			if needs_reload {
				doubly_inner = Some((outer, read_ptr_table(dev, partition_start, inner_block_num, block_size)?));
			}
			doubly_inner.as_ref().unwrap().1[inner]
		} else if i < trebly_end {
			let idx = i - doubly_end;
			let outer = idx / (a * a);
			let mid = (idx / a) % a;
			let inner = idx % a;

			let top = match &trebly_top {
				Some(t) => t,
				None => {
					trebly_top = Some(read_ptr_table(dev, partition_start, inode.block[14], block_size)?);
					trebly_top.as_ref().unwrap()
				}
			};
			let mid_block_num = top[outer];

			let mid_needs_reload = !matches!(&trebly_mid, Some((cached_outer, _)) if *cached_outer == outer);
			if mid_needs_reload {
				trebly_mid = Some((outer, read_ptr_table(dev, partition_start, mid_block_num, block_size)?));
			}
			let inner_block_num = trebly_mid.as_ref().unwrap().1[mid];

			let inner_needs_reload = !matches!(
				&trebly_inner,
				Some((cached_outer, cached_mid, _)) if *cached_outer == outer && *cached_mid == mid
			);
			if inner_needs_reload {
				trebly_inner = Some((outer, mid, read_ptr_table(dev, partition_start, inner_block_num, block_size)?));
			}
			trebly_inner.as_ref().unwrap().2[inner]
		} else {
			// A file this large would need a fourth indirection level,
			// which ext2 does not define; treat anything past it as a hole.
			0
		};

		out.push(block);
	}

	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::session::test_support::{build_image, FileSpec};
	use crate::superblock::Superblock;
	use std::io::Cursor;

	fn file_blocks(block_size: u32, size: u64) -> Vec<u32> {
		let content = vec![0xABu8; size as usize];
		let image = build_image(block_size, &[FileSpec::file("f", content)]);
		let mut dev = Cursor::new(image);
		let sb = Superblock::read(&mut dev, 0).unwrap();
		let root = Inode::read(&mut dev, 0, &sb, 2).unwrap();
		let entry = crate::dir::find_in_directory(&mut dev, 0, sb.block_size, &root, "f")
			.unwrap()
			.unwrap();
		let inode = Inode::read(&mut dev, 0, &sb, entry.inode).unwrap();
		data_blocks(&mut dev, 0, sb.block_size, &inode).unwrap()
	}

	#[test]
	fn exactly_direct_blocks() {
		for block_size in [1024u32, 2048, 4096] {
			let blocks = file_blocks(block_size, 12 * block_size as u64);
			assert_eq!(blocks.len(), 12);
			assert!(blocks.iter().all(|&b| b != 0));
		}
	}

	#[test]
	fn crosses_into_singly_indirect() {
		for block_size in [1024u32, 2048, 4096] {
			let a = (block_size / 4) as u64;
			let blocks = file_blocks(block_size, (12 + a) * block_size as u64);
			assert_eq!(blocks.len() as u64, 12 + a);
			assert!(blocks.iter().all(|&b| b != 0));
		}
	}

	#[test]
	fn crosses_into_doubly_indirect() {
		for block_size in [1024u32, 2048, 4096] {
			let a = (block_size / 4) as u64;
			let blocks = file_blocks(block_size, (12 + a + 1) * block_size as u64);
			assert_eq!(blocks.len() as u64, 12 + a + 1);
			assert!(blocks.iter().all(|&b| b != 0));
		}
	}
}
