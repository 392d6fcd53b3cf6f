//! Error kinds shared by every operation in the crate.

use std::fmt;
use std::io;

/// The four error kinds produced by the core, matching the propagation
/// policy: each component returns one of these unchanged to its caller.
#[derive(Debug)]
pub enum Ext2Error {
	/// The superblock's magic number did not match `0xEF53`.
	NotExt2,
	/// A named path component was not found, a path walked into a
	/// non-directory, or a directory block was malformed (a short or zero
	/// `rec_len`).
	FileMissing,
	/// The underlying device faulted.
	ReadingDisk,
	/// A component name was longer than 255 bytes, or a byte sink failed.
	Internal,
}

impl fmt::Display for Ext2Error {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
		let msg = match self {
			Self::NotExt2 => "not an ext2 filesystem",
			Self::FileMissing => "no such file or directory",
			Self::ReadingDisk => "error reading disk",
			Self::Internal => "internal error",
		};
		write!(fmt, "{msg}")
	}
}

impl std::error::Error for Ext2Error {}

impl From<io::Error> for Ext2Error {
	fn from(_: io::Error) -> Self {
		Self::ReadingDisk
	}
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Ext2Error>;
