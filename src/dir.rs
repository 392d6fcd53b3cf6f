//! Directory-entry layout and path resolution.

use crate::blocks::data_blocks;
use crate::device::read_at;
use crate::error::{Ext2Error, Result};
use crate::inode::Inode;
use crate::superblock::Superblock;
use std::io::{Read, Seek};

/// The on-disk `file_type` tag carried by each directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
	Unknown,
	RegularFile,
	Directory,
	CharacterDevice,
	BlockDevice,
	Fifo,
	Socket,
	Symlink,
}

impl FileType {
	fn from_raw(raw: u8) -> Self {
		match raw {
			1 => Self::RegularFile,
			2 => Self::Directory,
			3 => Self::CharacterDevice,
			4 => Self::BlockDevice,
			5 => Self::Fifo,
			6 => Self::Socket,
			7 => Self::Symlink,
			_ => Self::Unknown,
		}
	}
}

/// A single decoded directory entry.
#[derive(Clone, Debug)]
pub struct DirEntry {
	pub inode: u32,
	pub name: String,
	pub file_type: FileType,
}

/// A directory entry as surfaced by the public listing API, with
/// directory-ness resolved (falling back to the target inode's mode bits
/// when `file_type` was never populated — see `Session::list_children`).
#[derive(Clone, Debug)]
pub struct DirEntryInfo {
	pub name: String,
	pub inode: u32,
	pub is_directory: bool,
}

/// Longest name this implementation accepts, per the on-disk `name_len`
/// byte.
const MAX_NAME_LEN: usize = 255;

/// Decodes every live entry (`inode != 0`) in `dir_inode`'s data blocks, in
/// on-disk order. A hole (physical block `0`) contributes no entries.
pub(crate) fn read_entries<D: Read + Seek>(
	dev: &mut D,
	partition_start: u64,
	block_size: u32,
	dir_inode: &Inode,
) -> Result<Vec<DirEntry>> {
	let blocks = data_blocks(dev, partition_start, block_size, dir_inode)?;
	let mut entries = Vec::new();

	for block in blocks {
		if block == 0 {
			continue;
		}

		let bytes = read_at(dev, partition_start + block as u64 * block_size as u64, block_size as usize)?;
		let mut offset = 0usize;

		while offset + 8 <= bytes.len() {
			let inode = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
			let rec_len = u16::from_le_bytes(bytes[offset + 4..offset + 6].try_into().unwrap()) as usize;
			let name_len = bytes[offset + 6] as usize;
			let file_type = bytes[offset + 7];

			if rec_len < 8 || offset + rec_len > bytes.len() {
				return Err(Ext2Error::FileMissing);
			}

			if inode != 0 {
				if name_len > MAX_NAME_LEN || offset + 8 + name_len > bytes.len() {
					return Err(Ext2Error::Internal);
				}
				let name_bytes = &bytes[offset + 8..offset + 8 + name_len];
				let name = String::from_utf8_lossy(name_bytes).into_owned();
				entries.push(DirEntry {
					inode,
					name,
					file_type: FileType::from_raw(file_type),
				});
			}

			offset += rec_len;
		}
	}

	Ok(entries)
}

/// Looks up `name` among `dir_inode`'s live entries.
pub(crate) fn find_in_directory<D: Read + Seek>(
	dev: &mut D,
	partition_start: u64,
	block_size: u32,
	dir_inode: &Inode,
	name: &str,
) -> Result<Option<DirEntry>> {
	if name.len() > MAX_NAME_LEN {
		return Err(Ext2Error::Internal);
	}
	let entries = read_entries(dev, partition_start, block_size, dir_inode)?;
	Ok(entries.into_iter().find(|e| e.name == name))
}

/// Walks `path` starting from `base`, requiring every intermediate
/// component to resolve to a directory. A trailing slash does not change
/// the result: components are obtained by splitting on `/` and discarding
/// empty segments, so `"a/b/"` and `"a/b"` resolve identically.
pub(crate) fn resolve_from<D: Read + Seek>(
	dev: &mut D,
	partition_start: u64,
	superblock: &Superblock,
	base: (u32, Inode),
	path: &str,
) -> Result<(u32, Inode)> {
	let (mut current_num, mut current) = base;

	for component in path.split('/').filter(|c| !c.is_empty()) {
		if component.len() > MAX_NAME_LEN {
			return Err(Ext2Error::Internal);
		}
		if !current.is_dir() {
			return Err(Ext2Error::FileMissing);
		}

		let entry = find_in_directory(dev, partition_start, superblock.block_size, &current, component)?
			.ok_or(Ext2Error::FileMissing)?;
		current_num = entry.inode;
		current = Inode::read(dev, partition_start, superblock, entry.inode)?;
	}

	Ok((current_num, current))
}
