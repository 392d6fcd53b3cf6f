//! `dext2` is an interactive explorer for read-only ext2 filesystems: it
//! picks a disk and a partition, opens a session against the core crate,
//! then runs a small command loop (`ls`, `cd`, `read`, `pwd`) on top of
//! it.

mod disk;
mod partition;

use dext2::{Ext2Error, Session};
use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::process::exit;
use utils::prompt::prompt;
use utils::util::ByteSize;

/// Structure storing command line arguments.
#[derive(Default)]
struct Args {
	/// The name of the current program used in command line.
	prog: String,
	/// If true, print command line help.
	help: bool,
	/// The disk device to open, if given on the command line.
	disk: Option<PathBuf>,
}

fn parse_args() -> Args {
	let mut args: Args = Default::default();

	let mut iter = env::args();
	args.prog = iter.next().unwrap_or_else(|| "dext2".to_owned());

	for arg in iter {
		match arg.as_str() {
			"-h" | "--help" => args.help = true,
			_ => args.disk = Some(arg.into()),
		}
	}

	args
}

fn print_help(prog: &str) {
	println!();
	println!("Usage:");
	println!(" {} [options] [disk]", prog);
	println!();
	println!("Explores a read-only ext2 filesystem.");
	println!();
	println!("Options:");
	println!(" -h, --help\tPrints help.");
	println!();
	println!("Commands once a filesystem is open:");
	println!(" ls              list the current directory");
	println!(" cd <path>       change the current directory");
	println!(" read <src> <dst>  copy a file to the host filesystem");
	println!(" pwd             print the current path");
	println!(" exit            leave the program");
}

/// Picks a disk device: the one given on the command line, or an
/// interactively chosen one among those found under `/dev`.
fn pick_disk(args: &Args) -> Option<PathBuf> {
	if let Some(path) = &args.disk {
		return Some(path.clone());
	}

	let disks = match disk::list() {
		Ok(disks) => disks,
		Err(e) => {
			eprintln!("cannot list disks: {e}");
			return None;
		}
	};
	if disks.is_empty() {
		eprintln!("no disks found");
		return None;
	}

	for (i, d) in disks.iter().enumerate() {
		println!("{}) {} ({})", i, d.path.display(), ByteSize::from_sectors_count(d.sectors_count));
	}

	let input = prompt(Some("Disk: "), false)?;
	let index: usize = input.trim().parse().ok()?;
	disks.get(index).map(|d| d.path.clone())
}

/// Picks a partition's byte offset: prompts among the disk's MBR
/// partitions if any are present, otherwise falls back to treating the
/// whole disk as a single filesystem.
fn pick_partition_offset(dev: &mut File) -> Option<u64> {
	match partition::read(dev) {
		Ok(partition::PartitionTable::Mbr(parts)) if !parts.is_empty() => {
			for (i, p) in parts.iter().enumerate() {
				println!(
					"{}) start={} sectors={} type={:02x}{}",
					i,
					p.start_sector,
					p.sectors_count,
					p.partition_type,
					if p.bootable { " bootable" } else { "" }
				);
			}
			let input = prompt(Some("Partition: "), false)?;
			let index: usize = input.trim().parse().ok()?;
			parts.get(index).map(|p| p.byte_offset())
		}
		Ok(partition::PartitionTable::Mbr(_)) => Some(0),
		Ok(partition::PartitionTable::GptUnsupported) => {
			eprintln!("GPT partition tables are not supported");
			None
		}
		Ok(partition::PartitionTable::None) => Some(0),
		Err(e) => {
			eprintln!("cannot read partition table: {e}");
			None
		}
	}
}

fn run_shell(mut session: Session<File>) {
	let mut cwd_inode = session.root();
	let mut cwd_path = String::from("/");

	while let Some(line) = prompt(Some(&format!("{cwd_path} > ")), false) {
		let mut words = line.split_whitespace();
		let Some(cmd) = words.next() else {
			continue;
		};
		let rest: Vec<&str> = words.collect();

		match cmd {
			"ls" | "dir" => match session.list_children(cwd_inode) {
				Ok(entries) => {
					for e in entries {
						println!("{}{}", e.name, if e.is_directory { "/" } else { "" });
					}
				}
				Err(e) => eprintln!("{e}"),
			},

			"cd" => {
				let Some(path) = rest.first() else {
					eprintln!("usage: cd <path>");
					continue;
				};
				let resolved = if path.starts_with('/') {
					session.resolve_absolute(path)
				} else {
					session.resolve_relative(cwd_inode, path)
				};
				match resolved {
					Ok(inode) => match session.is_directory(inode) {
						Ok(true) => {
							cwd_inode = inode;
							cwd_path = normalize_path(&cwd_path, path);
						}
						Ok(false) => eprintln!("{path}: not a directory"),
						Err(e) => eprintln!("{e}"),
					},
					Err(e) => eprintln!("{e}"),
				}
			}

			"read" => {
				let (Some(src), Some(dst)) = (rest.first(), rest.get(1)) else {
					eprintln!("usage: read <src> <dst>");
					continue;
				};
				let resolved = if src.starts_with('/') {
					session.resolve_absolute(src)
				} else {
					session.resolve_relative(cwd_inode, src)
				};
				match resolved {
					Ok(inode) => match File::create(dst) {
						Ok(mut out) => {
							if let Err(e) = session.extract(inode, &mut out) {
								eprintln!("{e}");
							}
						}
						Err(e) => eprintln!("{dst}: {e}"),
					},
					Err(e) => eprintln!("{e}"),
				}
			}

			"pwd" => println!("{cwd_path}"),

			"help" | "h" => print_help("dext2"),

			"exit" | "quit" => break,

			_ => eprintln!("unknown command: {cmd}"),
		}
	}
}

/// Appends `component` to `base`, collapsing `.`/`..` for display purposes
/// only — actual resolution already happened against the filesystem.
fn normalize_path(base: &str, component: &str) -> String {
	let mut parts: Vec<&str> = base.split('/').filter(|c| !c.is_empty()).collect();
	for part in component.split('/').filter(|c| !c.is_empty()) {
		match part {
			"." => {}
			".." => {
				parts.pop();
			}
			_ => parts.push(part),
		}
	}
	format!("/{}", parts.join("/"))
}

fn main() {
	let args = parse_args();

	if args.help {
		print_help(&args.prog);
		exit(0);
	}

	let Some(disk_path) = pick_disk(&args) else {
		exit(1);
	};

	let mut dev = match File::open(&disk_path) {
		Ok(f) => f,
		Err(e) => {
			eprintln!("{}: cannot open {}: {}", args.prog, disk_path.display(), e);
			exit(1);
		}
	};

	let Some(partition_start) = pick_partition_offset(&mut dev) else {
		exit(1);
	};

	let session = match Session::open(dev, partition_start) {
		Ok(s) => s,
		Err(Ext2Error::NotExt2) => {
			eprintln!("{}: not an ext2 filesystem", args.prog);
			exit(1);
		}
		Err(e) => {
			eprintln!("{}: {}", args.prog, e);
			exit(1);
		}
	};

	run_shell(session);
}
