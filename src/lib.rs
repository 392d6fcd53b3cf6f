//! Read-only decoder for the ext2 on-disk format.
//!
//! This crate owns the part of an ext2 explorer that must be byte-exact:
//! the superblock, the block-group descriptor table, the inode table, the
//! directory-entry layout, and the multi-level indirect block-pointer
//! traversal that turns an inode into the ordered list of physical blocks
//! holding its data. It does not enumerate disks, parse a partition table,
//! run a REPL, or write extracted bytes anywhere — those are external
//! collaborators, built on top of this crate in the `dext2-cli` binary.

mod blocks;
mod device;
mod dir;
mod error;
mod extract;
mod group_desc;
mod inode;
mod session;
mod superblock;

pub use blocks::data_blocks;
pub use dir::{DirEntry, DirEntryInfo, FileType};
pub use error::{Ext2Error, Result};
pub use extract::Sink;
pub use inode::Inode;
pub use session::Session;
pub use superblock::Superblock;
