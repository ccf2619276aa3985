use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use raisin64::{Assembler, AssemblerConfig, OpcodeTable};

#[derive(Parser, Debug)]
#[command(author, version, about = "raisin64 assembler: source text to a raw big-endian image")]
struct Opts {
    /// Input assembly file
    #[arg(short, long)]
    input: PathBuf,
    /// Output binary file
    #[arg(short, long)]
    output: PathBuf,
    /// Address of the first instruction (hex or dec)
    #[arg(long, default_value = "0", value_parser = parse_u64)]
    base: u64,
    /// Treat warnings as errors
    #[arg(long)]
    fatal_warnings: bool,
    /// Write unresolved relocations as JSON
    #[arg(long, value_name = "FILE")]
    relocs: Option<PathBuf>,
}

fn parse_u64(s: &str) -> Result<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u64::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u64>()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let src = std::fs::read_to_string(&opts.input)?;
    let table = OpcodeTable::new();
    let cfg = AssemblerConfig { base: opts.base, fatal_warnings: opts.fatal_warnings };
    let asm = Assembler::new(&table, cfg).assemble(&src)?;

    let name = opts.input.display();
    for d in &asm.diagnostics {
        eprintln!("{name}:{d}");
    }
    if asm.has_errors() {
        bail!("{name}: assembly failed");
    }

    std::fs::write(&opts.output, &asm.bytes)?;
    if let Some(path) = opts.relocs {
        std::fs::write(path, serde_json::to_string_pretty(&asm.relocations)?)?;
    }
    Ok(())
}
