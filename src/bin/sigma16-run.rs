use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sigma16_rs::decoder::Decoded;
use sigma16_rs::disasm::fmt_decoded;
use sigma16_rs::exec::IntExecutor;
use sigma16_rs::isa::sigma16::Sigma16Decoder;
use sigma16_rs::memory::words_from_be_bytes;
use sigma16_rs::symbols::ReverseSymbols;
use sigma16_rs::{Cpu, CpuConfig, LinearMemory, StdConsole};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run a Sigma16 binary image on the sigma16-rs emulator"
)]
struct Opts {
    /// Symbol file (`name:address` lines) used to label trace output
    #[arg(short, long)]
    symbols: Option<String>,
    /// Print every executed instruction and the register file to stderr
    #[arg(short, long)]
    trace: bool,
    /// Stop after this many instructions even if the program has not halted
    #[arg(long)]
    max_steps: Option<u64>,
    /// Dump registers when execution stops
    #[arg(long)]
    dump: bool,
    #[arg(value_name = "BINFILE")]
    input: String,
}

fn print_state(cpu: &Cpu, d: &Decoded, syms: Option<&ReverseSymbols>) {
    let pc = cpu.pc.wrapping_sub(d.width as u16);
    if let Some(name) = syms.and_then(|s| s.get(pc)) {
        eprintln!("{name}:");
    }
    let regs: Vec<String> = cpu.reg.iter().map(|r| format!("{r:04x}")).collect();
    eprintln!("{pc:04x}  {:<24} {}", fmt_decoded(d, syms), regs.join(" "));
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();

    let bytes = std::fs::read(&opts.input).with_context(|| format!("reading {}", opts.input))?;
    let image = words_from_be_bytes(&bytes).with_context(|| format!("loading {}", opts.input))?;
    let mut mem = LinearMemory::with_image(&image)?;

    // Symbols only affect what is printed
    let symbols = match &opts.symbols {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            let rev = ReverseSymbols::parse(&text)?;
            tracing::debug!(symbols = rev.len(), "symbol file loaded");
            Some(rev)
        }
        None => None,
    };

    let cfg = if opts.trace {
        CpuConfig::with_trace(move |cpu, d| print_state(cpu, d, symbols.as_ref()))
    } else {
        CpuConfig::default()
    };
    let mut cpu = Cpu::new(cfg);
    cpu.reset(0);

    let dec = Sigma16Decoder::new();
    let mut exec = IntExecutor::new(StdConsole);

    let summary = cpu.run(&mut mem, &dec, &mut exec, opts.max_steps)?;
    if !summary.halted {
        eprintln!("stopped after {} instructions without halting", summary.steps);
    }
    if opts.dump {
        for (i, r) in cpu.reg.iter().enumerate() {
            eprintln!("R{i:<2} = {r:#06x}");
        }
    }

    Ok(())
}
