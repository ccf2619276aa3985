use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use raisin64::isa::r64::R64Decoder;
use raisin64::{disassemble_at, OpcodeTable};

use raisin64_disasm::{is_mapped, load_raw_bin, read_u8, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "raisin64 disassembler CLI", long_about = None)]
struct Cli {
    /// Load address for the binary in target address space
    #[arg(long, default_value = "0", value_parser = parse_u64)]
    base: u64,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded segments
    Sections,
    /// Disassemble a range [start, end) in bytes
    Range {
        /// Start address (hex or dec)
        #[arg(value_parser = parse_u64)]
        start: u64,
        /// End address (hex or dec, exclusive)
        #[arg(value_parser = parse_u64)]
        end: u64,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Line {
    addr: u64,
    bytes: Vec<u8>,
    text: String,
}

fn parse_u64(s: &str) -> Result<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u64::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u64>()?)
    }
}

/// Linear sweep over [start, end). Stops at the first address whose 8-byte read is not
/// fully mapped.
fn disassemble_range(img: &Image, start: u64, end: u64) -> Vec<Line> {
    let table = OpcodeTable::new();
    let dec = R64Decoder::new(&table);
    let mut lines = Vec::new();
    let mut pc = start;
    while pc < end {
        let d = match disassemble_at(img, &dec, pc) {
            Ok(d) => d,
            Err(e) => {
                debug!("stopping sweep: {e}");
                break;
            }
        };
        let bytes = (0..d.len as u64).filter_map(|i| read_u8(img, pc + i)).collect();
        lines.push(Line { addr: pc, bytes, text: d.text });
        pc = pc.wrapping_add(d.len as u64);
    }
    lines
}

fn render_text(lines: &[Line], show_bytes: bool) -> String {
    let mut buf = String::new();
    for l in lines {
        let _ = write!(buf, "{:#010x}: ", l.addr);
        if show_bytes {
            for b in &l.bytes {
                let _ = write!(buf, "{b:02x} ");
            }
            // pad to the widest form
            buf.push_str(&"   ".repeat(8 - l.bytes.len()));
            buf.push(' ');
        }
        let _ = writeln!(buf, "{}", l.text);
    }
    buf
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let img = load_raw_bin(Path::new(&cli.input), cli.base, cli.skip, cli.len)?;

    match cli.cmd {
        Command::Sections => {
            println!("{:<10} {:<18} {:<18} {:<6} {:<6}", "name", "start", "end", "perms", "kind");
            for s in &img.segments {
                let end = s.base + s.bytes.len() as u64;
                println!("{:<10} {:#018x} {end:#018x} {:<6} {:<6}", s.name, s.base, s.perms, s.kind);
            }
        }
        Command::Range { start, end, show_bytes, format, out } => {
            anyhow::ensure!(end >= start, "end must be >= start");
            anyhow::ensure!(start == end || is_mapped(&img, start), "start {start:#x} is not mapped");
            let lines = disassemble_range(&img, start, end);
            let buf = match format {
                OutputFormat::Text => render_text(&lines, show_bytes),
                OutputFormat::Json => serde_json::to_string_pretty(&lines)? + "\n",
            };
            if let Some(path) = out {
                std::fs::write(path, buf)?;
            } else {
                print!("{buf}");
            }
        }
    }

    Ok(())
}
