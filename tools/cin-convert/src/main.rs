//! cin-convert - CIN animation file converter
//!
//! Converts binary .cin files to editable JSON and JSON back to .cin.
//! The output is written next to the input with the target extension
//! appended (`anim.cin` -> `anim.cin.json`).

use anyhow::{Context, Result, bail};
use cin_format::{Format, decode, encode, output_path};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "cin-convert")]
#[command(about = "Converts .cin files to JSON and back")]
#[command(version)]
struct Cli {
    /// The .cin or .json file to convert
    input: PathBuf,

    /// The file type the input will be converted to
    #[arg(value_enum)]
    target: Target,

    /// Output file (default: input path with the target extension appended)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Check frame and object sentinels before writing
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Json,
    Cin,
}

impl From<Target> for Format {
    fn from(target: Target) -> Self {
        match target {
            Target::Json => Format::Json,
            Target::Cin => Format::Cin,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let from = Format::from_path(&cli.input)?;
    let to = Format::from(cli.target);
    if from == to {
        bail!("Can't convert .{from} to .{to}, stopping");
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| output_path(&cli.input, to));
    info!("Converting {} to {}...", cli.input.display(), to);

    let data = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let document = decode(&data, from)
        .with_context(|| format!("Failed to decode {}", cli.input.display()))?;
    debug!(
        objects = document.objects.len(),
        hold_frame = document.header.hold_frame,
        "decoded document"
    );

    if cli.strict {
        document
            .validate()
            .with_context(|| format!("{} failed validation", cli.input.display()))?;
    }

    let bytes = encode(&document, to)?;
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Converted to {} successfully: {}", to, output.display());
    Ok(())
}
