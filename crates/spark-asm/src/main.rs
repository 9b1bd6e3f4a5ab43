use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use spark_rs::{assemble_file, disassemble, to_be_bytes, Registry};

#[derive(Parser, Debug)]
#[command(author, version, about = "SPARK assembler/disassembler", long_about = None)]
struct Opts {
    /// Input file: assembly text (assemble) or flat big-endian words
    /// (disassemble)
    #[arg(short = 'i', long)]
    input_file: PathBuf,
    /// Output file
    #[arg(short = 'o', long)]
    output_file: PathBuf,
    /// What to do: assemble (a) or disassemble (d)
    #[arg(long, alias = "op", value_enum, ignore_case = true)]
    operation: Operation,
    /// Append a per-line `; <word> <byte offset>` comment (disassemble only)
    #[arg(long)]
    hexdump: bool,
    /// Write the label table as JSON after assembly
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Operation {
    #[value(alias = "a")]
    Assemble,
    #[value(alias = "d")]
    Disassemble,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let registry = Registry::spark()?;

    match opts.operation {
        Operation::Assemble => {
            let out = assemble_file(&registry, &opts.input_file)?;
            fs::write(&opts.output_file, to_be_bytes(&out.words))
                .with_context(|| format!("failed to write {}", opts.output_file.display()))?;
            if let Some(path) = &opts.labels_out {
                let json = serde_json::to_string_pretty(&out.labels)?;
                fs::write(path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            tracing::info!(
                "assembled {} words into {}",
                out.words.len(),
                opts.output_file.display()
            );
        }
        Operation::Disassemble => {
            let bytes = fs::read(&opts.input_file)
                .with_context(|| format!("failed to read {}", opts.input_file.display()))?;
            let text = disassemble(&registry, &bytes, opts.hexdump)?;
            fs::write(&opts.output_file, text)
                .with_context(|| format!("failed to write {}", opts.output_file.display()))?;
            tracing::info!(
                "disassembled {} words into {}",
                bytes.len() / 4,
                opts.output_file.display()
            );
        }
    }

    Ok(())
}
