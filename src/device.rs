//! Sector-aligned reads against an opaque device handle.
//!
//! Every byte fetched from the device by any other module in this crate
//! goes through [`read_at`]. The device is assumed to be accessed as a raw
//! disk: reads are rounded to the logical sector size (512 bytes) before
//! being issued, and the requested window is copied back out of the
//! rounded buffer.

use crate::error::Result;
use std::io::{Read, Seek, SeekFrom};

/// Assumed logical sector size of the underlying device.
const SECTOR_SIZE: u64 = 512;

/// Reads exactly `length` bytes starting at `absolute_offset`.
///
/// `absolute_offset` is rounded down to a sector boundary and `length` is
/// rounded up to the next sector multiple before the underlying read is
/// issued; the caller's window is then copied out of that buffer. This
/// mirrors what a raw disk handle requires: reads below sector granularity
/// are not guaranteed to succeed.
pub fn read_at<D: Read + Seek>(dev: &mut D, absolute_offset: u64, length: usize) -> Result<Vec<u8>> {
	let start_offset = absolute_offset % SECTOR_SIZE;
	let aligned_offset = absolute_offset - start_offset;

	let needed = start_offset + length as u64;
	let aligned_len = needed.div_ceil(SECTOR_SIZE) * SECTOR_SIZE;

	let mut buf = vec![0u8; aligned_len as usize];
	dev.seek(SeekFrom::Start(aligned_offset))?;
	dev.read_exact(&mut buf)?;

	let start = start_offset as usize;
	Ok(buf[start..start + length].to_vec())
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn reads_exact_window() {
		let data: Vec<u8> = (0..2048u32).map(|i| (i % 256) as u8).collect();
		let mut dev = Cursor::new(data.clone());

		let got = read_at(&mut dev, 100, 50).unwrap();
		assert_eq!(got, data[100..150]);
	}

	#[test]
	fn reads_unaligned_offset_and_length() {
		let data: Vec<u8> = (0..4096u32).map(|i| (i % 256) as u8).collect();
		let mut dev = Cursor::new(data.clone());

		// Offset and length both deliberately not multiples of 512.
		let got = read_at(&mut dev, 513, 7).unwrap();
		assert_eq!(got, data[513..520]);
	}

	#[test]
	fn reads_at_zero() {
		let data: Vec<u8> = (0..1024u32).map(|i| (i % 256) as u8).collect();
		let mut dev = Cursor::new(data.clone());

		let got = read_at(&mut dev, 0, 1024).unwrap();
		assert_eq!(got, data);
	}
}
