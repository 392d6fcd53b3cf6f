//! Disk enumeration. Finding candidate devices and reading their size is
//! the whole job here; everything past the partition table belongs to
//! `dext2`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use utils::disk::get_disk_size;

/// A candidate disk device found under `/dev`.
pub struct Disk {
	pub path: PathBuf,
	/// Size of the disk in 512-byte sectors.
	pub sectors_count: u64,
}

/// Tells whether `path` looks like a whole-disk device rather than an
/// existing partition (`/dev/sda` but not `/dev/sda1`, `/dev/nvme0n1` but
/// not `/dev/nvme0n1p1`).
fn is_whole_disk(path: &Path) -> bool {
	let Some(path_str) = path.as_os_str().to_str() else {
		return false;
	};

	if path_str.starts_with("/dev/sd") && !path_str.contains(|c: char| c.is_numeric()) {
		return true;
	}
	if path_str.starts_with("/dev/nvme0n") && !path_str.contains('p') {
		return true;
	}

	false
}

/// Lists whole-disk devices present under `/dev`.
pub fn list() -> io::Result<Vec<Disk>> {
	let mut disks = Vec::new();

	for entry in fs::read_dir("/dev")? {
		let path = entry?.path();
		if !is_whole_disk(&path) {
			continue;
		}
		let Ok(sectors_count) = get_disk_size(&path) else {
			continue;
		};
		disks.push(Disk { path, sectors_count });
	}

	Ok(disks)
}
