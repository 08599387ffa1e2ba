use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sigma16_rs::disasm::{disassemble, Line};
use sigma16_rs::isa::sigma16::Sigma16Decoder;
use sigma16_rs::symbols::ReverseSymbols;
use sigma16_rs::Word;

use sigma16_disasm::{load_image, load_symbols, parse_u16, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "Sigma16 disassembler CLI", long_about = None)]
struct Cli {
    /// Load address of the image in target memory
    #[arg(long, default_value = "0", value_parser = parse_addr)]
    base: Word,
    /// Skip N words at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Symbol file (`name:address` lines) used to label addresses
    #[arg(long, value_name = "FILE")]
    symbols: Option<PathBuf>,
    /// Input image path (big-endian words)
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Disassemble a range [start, end) in words
    Range {
        /// Start address (hex or dec)
        start: String,
        /// End address (hex or dec, exclusive)
        end: String,
        /// Show instruction words
        #[arg(long)]
        show_words: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Linear listing of the whole image
    Listing {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Show instruction words (text format only)
        #[arg(long)]
        show_words: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_addr(s: &str) -> Result<Word, String> {
    parse_u16(s).map_err(|e| e.to_string())
}

/// Slice of the image covering `[start, end)`, clamped to what was loaded.
fn window(img: &Image, start: Word, end: Word) -> &[Word] {
    let lo = (start.wrapping_sub(img.base) as usize).min(img.words.len());
    let hi = (end.wrapping_sub(img.base) as usize).clamp(lo, img.words.len());
    &img.words[lo..hi]
}

fn render_text(lines: &[Line], show_words: bool) -> String {
    let mut buf = String::new();
    for l in lines {
        if let Some(lbl) = &l.label {
            let _ = writeln!(buf, "{:04x} <{lbl}>:", l.addr);
        }
        let _ = write!(buf, "  {:04x}: ", l.addr);
        if show_words {
            for w in &l.words {
                let _ = write!(buf, "{w:04x} ");
            }
            // pad single-word instructions so mnemonics line up
            if l.words.len() == 1 {
                buf.push_str("     ");
            }
            buf.push_str("  ");
        }
        let _ = writeln!(buf, "{}", l.text);
    }
    buf
}

fn emit(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let img = load_image(&cli.input, cli.base, cli.skip)?;
    let symbols: Option<ReverseSymbols> = cli.symbols.as_deref().map(load_symbols).transpose()?;
    let dec = Sigma16Decoder::new();
    tracing::debug!(words = img.words.len(), base = img.base, "image loaded");

    match cli.cmd {
        Command::Range { start, end, show_words, out } => {
            let start = parse_u16(&start)?;
            let end = parse_u16(&end)?;
            anyhow::ensure!(end >= start, "end must be >= start");
            let lines = disassemble(&dec, window(&img, start, end), start, symbols.as_ref());
            emit(out.as_deref(), &render_text(&lines, show_words))?;
        }
        Command::Listing { format, show_words, out } => {
            let lines = disassemble(&dec, &img.words, img.base, symbols.as_ref());
            let text = match format {
                OutputFormat::Text => render_text(&lines, show_words),
                OutputFormat::Json => serde_json::to_string_pretty(&lines)? + "\n",
            };
            emit(out.as_deref(), &text)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn image() -> Image {
        // add R1,R2,R3 ; load R4,0003[R0] ; trap R0,R0,R0
        Image { base: 0, words: vec![0x0123, 0xf401, 0x0003, 0xd000] }
    }

    #[test]
    fn window_clamps_to_image() {
        let img = image();
        assert_eq!(window(&img, 1, 3), &[0xf401, 0x0003]);
        assert_eq!(window(&img, 2, 0x100), &[0x0003, 0xd000]);
        assert!(window(&img, 0x100, 0x200).is_empty());
    }

    #[test]
    fn text_listing_with_labels() {
        let img = image();
        let mut syms = ReverseSymbols::default();
        syms.insert(0, "start");
        syms.insert(3, "x");
        let lines = disassemble(&Sigma16Decoder::new(), &img.words, 0, Some(&syms));
        let text = render_text(&lines, false);
        assert_eq!(
            text,
            "0000 <start>:\n  0000: add R1,R2,R3\n  0001: load R4,x[R0]\n0003 <x>:\n  0003: trap R0,R0,R0\n"
        );
    }

    #[test]
    fn text_listing_shows_words() {
        let img = image();
        let lines = disassemble(&Sigma16Decoder::new(), &img.words[..3], 0, None);
        let text = render_text(&lines, true);
        assert_eq!(text, "  0000: 0123        add R1,R2,R3\n  0001: f401 0003   load R4,0003[R0]\n");
    }

    #[test]
    fn json_listing_has_addresses() {
        let img = image();
        let lines = disassemble(&Sigma16Decoder::new(), &img.words, 0, None);
        let v: serde_json::Value = serde_json::from_str(&serde_json::to_string(&lines).unwrap()).unwrap();
        assert_eq!(v[1]["addr"], 1);
        assert_eq!(v[1]["text"], "load R4,0003[R0]");
        assert_eq!(v[2]["addr"], 3);
    }
}
