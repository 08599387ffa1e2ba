use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sigma16_rs::assemble_source;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sigma16 assembler")]
struct Opts {
    /// Input assembly file
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
    /// Output image (big-endian words)
    #[arg(short, long)]
    output: PathBuf,
    /// Also write the label table as `name:address` lines
    #[arg(long, value_name = "FILE")]
    symbols: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let src = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let asm = assemble_source(&src).with_context(|| format!("assembling {}", opts.input.display()))?;

    fs::write(&opts.output, asm.to_bytes())
        .with_context(|| format!("writing {}", opts.output.display()))?;
    if let Some(path) = &opts.symbols {
        fs::write(path, asm.symbols.to_symbol_file())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    tracing::info!(words = asm.words.len(), labels = asm.symbols.len(), "assembled");
    Ok(())
}
