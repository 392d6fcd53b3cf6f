//! Ties the device, superblock and block size together behind one handle.
//!
//! Every other module in this crate is a free function taking an explicit
//! `&mut D` device, partition offset and superblock — none of it keeps
//! state of its own. `Session` is where that state actually lives, in
//! place of the process-global `g_mainSuperBlock`/`g_partitionStart`
//! variables a single-session explorer would otherwise reach for.

use crate::dir::{self, DirEntryInfo, FileType};
use crate::error::Result;
use crate::extract::{self, Sink};
use crate::inode::Inode;
use crate::superblock::Superblock;
use std::io::{Read, Seek};

/// The root directory is always inode 2.
const ROOT_INODE: u32 = 2;

/// An open ext2 partition: the device handle, its validated superblock,
/// and the partition's byte offset on the device.
pub struct Session<D> {
	device: D,
	partition_start: u64,
	superblock: Superblock,
}

impl<D: Read + Seek> Session<D> {
	/// Reads and validates the superblock at `partition_start`, establishing
	/// a session. Fails with [`crate::Ext2Error::NotExt2`] if the magic
	/// number does not match.
	pub fn open(mut device: D, partition_start: u64) -> Result<Self> {
		let superblock = Superblock::read(&mut device, partition_start)?;
		Ok(Self { device, partition_start, superblock })
	}

	/// The validated superblock, for callers that want to report disk
	/// geometry (block count, free space, ...).
	pub fn superblock(&self) -> &Superblock {
		&self.superblock
	}

	/// Inode number of the root directory.
	pub fn root(&self) -> u32 {
		ROOT_INODE
	}

	fn get_inode(&mut self, n: u32) -> Result<Inode> {
		Inode::read(&mut self.device, self.partition_start, &self.superblock, n)
	}

	/// Resolves an absolute path (rooted at `/`, regardless of a leading
	/// slash) to an inode number.
	pub fn resolve_absolute(&mut self, path: &str) -> Result<u32> {
		self.resolve_relative(ROOT_INODE, path)
	}

	/// Resolves `path` relative to `base`, an inode number previously
	/// returned by this session (e.g. from `resolve_absolute` or
	/// `list_children`).
	pub fn resolve_relative(&mut self, base: u32, path: &str) -> Result<u32> {
		let base_inode = self.get_inode(base)?;
		let (num, _) = dir::resolve_from(
			&mut self.device,
			self.partition_start,
			&self.superblock,
			(base, base_inode),
			path,
		)?;
		Ok(num)
	}

	/// Tells whether `inode_num` is a directory.
	pub fn is_directory(&mut self, inode_num: u32) -> Result<bool> {
		Ok(self.get_inode(inode_num)?.is_dir())
	}

	/// Lists the children of a directory inode.
	pub fn list_children(&mut self, inode_num: u32) -> Result<Vec<DirEntryInfo>> {
		let inode = self.get_inode(inode_num)?;
		let entries = dir::read_entries(&mut self.device, self.partition_start, self.superblock.block_size, &inode)?;

		let mut out = Vec::with_capacity(entries.len());
		for entry in entries {
			let is_directory = match entry.file_type {
				FileType::Directory => true,
				FileType::Unknown => self.get_inode(entry.inode)?.is_dir(),
				_ => false,
			};
			out.push(DirEntryInfo { name: entry.name, inode: entry.inode, is_directory });
		}
		Ok(out)
	}

	/// Copies a regular file's data to `sink`.
	pub fn extract<S: Sink>(&mut self, inode_num: u32, sink: &mut S) -> Result<()> {
		let inode = self.get_inode(inode_num)?;
		extract::extract(&mut self.device, self.partition_start, self.superblock.block_size, &inode, sink)
	}
}


#[cfg(test)]
mod test {
	use super::test_support::{build_image, FileSpec};
	use super::*;
	use std::io::Cursor;

	#[test]
	fn root_resolves_and_lists_children() {
		let image = build_image(1024, &[FileSpec::file("a.txt", b"hello".to_vec())]);
		let mut session = Session::open(Cursor::new(image), 0).unwrap();

		let root = session.resolve_absolute("/").unwrap();
		assert_eq!(root, session.root());

		let children = session.list_children(root).unwrap();
		assert!(children.iter().any(|c| c.name == "a.txt" && !c.is_directory));
	}

	#[test]
	fn resolves_nested_path_and_extracts_contents() {
		let image = build_image(
			1024,
			&[FileSpec::dir("sub", &[FileSpec::file("leaf.txt", b"contents".to_vec())])],
		);
		let mut session = Session::open(Cursor::new(image), 0).unwrap();

		let leaf = session.resolve_absolute("/sub/leaf.txt").unwrap();
		let mut out = Vec::new();
		session.extract(leaf, &mut out).unwrap();
		assert_eq!(out, b"contents");
	}

	#[test]
	fn relative_resolution_from_a_subdirectory() {
		let image = build_image(
			1024,
			&[FileSpec::dir("sub", &[FileSpec::file("leaf.txt", b"x".to_vec())])],
		);
		let mut session = Session::open(Cursor::new(image), 0).unwrap();

		let sub = session.resolve_absolute("/sub").unwrap();
		let leaf = session.resolve_relative(sub, "leaf.txt").unwrap();
		let mut out = Vec::new();
		session.extract(leaf, &mut out).unwrap();
		assert_eq!(out, b"x");
	}
}
