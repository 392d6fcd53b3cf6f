//! Read-only MBR partition table parsing.
//!
//! GPT disks are detected (a protective MBR entry of type `0xee`) but not
//! parsed: walking their partition entries is out of scope here, so a GPT
//! disk is surfaced to the caller as a single opaque, unsupported table.

use std::io;
use std::io::{Read, Seek, SeekFrom};
use std::mem::{size_of, zeroed};
use std::slice;

const MBR_SIGNATURE: u16 = 0xaa55;
const GPT_PROTECTIVE_TYPE: u8 = 0xee;

#[repr(C, packed)]
struct MBRPartition {
	attrs: u8,
	chs_start: [u8; 3],
	partition_type: u8,
	chs_end: [u8; 3],
	lba_start: u32,
	sectors_count: u32,
}

impl MBRPartition {
	fn is_active(&self) -> bool {
		self.attrs & (1 << 7) != 0
	}
}

#[repr(C, packed)]
struct MBRTable {
	boot: [u8; 440],
	disk_signature: u32,
	zero: u16,
	partitions: [MBRPartition; 4],
	signature: u16,
}

/// A single partition entry read from a disk's MBR.
#[derive(Clone, Copy, Debug)]
pub struct Partition {
	/// Start of the partition, in sectors from the start of the disk.
	pub start_sector: u64,
	/// Size of the partition, in sectors.
	pub sectors_count: u64,
	/// The MBR partition type byte (e.g. `0x83` for a native Linux
	/// partition).
	pub partition_type: u8,
	pub bootable: bool,
}

impl Partition {
	/// Byte offset of the partition on the disk, for use as a
	/// `dext2::Session` partition start.
	pub fn byte_offset(&self) -> u64 {
		self.start_sector * 512
	}
}

/// The result of reading a disk's partition table.
pub enum PartitionTable {
	Mbr(Vec<Partition>),
	/// A GPT protective MBR was found; GPT itself is not parsed.
	GptUnsupported,
	/// No recognized partition table signature was found.
	None,
}

/// Reads the partition table at the start of `dev`.
pub fn read<D: Read + Seek>(dev: &mut D) -> io::Result<PartitionTable> {
	let len = size_of::<MBRTable>();
	let mut bytes = vec![0u8; len];
	dev.seek(SeekFrom::Start(0))?;
	dev.read_exact(&mut bytes)?;

	let mut raw: MBRTable = unsafe { zeroed() };
	let dst = unsafe { slice::from_raw_parts_mut(&mut raw as *mut _ as *mut u8, len) };
	dst.copy_from_slice(&bytes);

	if raw.signature != MBR_SIGNATURE {
		return Ok(PartitionTable::None);
	}

	if raw.partitions.iter().any(|p| p.partition_type == GPT_PROTECTIVE_TYPE) {
		return Ok(PartitionTable::GptUnsupported);
	}

	let partitions = raw
		.partitions
		.iter()
		.filter(|p| p.sectors_count > 0)
		.map(|p| Partition {
			start_sector: p.lba_start as u64,
			sectors_count: p.sectors_count as u64,
			partition_type: p.partition_type,
			bootable: p.is_active(),
		})
		.collect();

	Ok(PartitionTable::Mbr(partitions))
}
