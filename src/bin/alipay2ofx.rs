//! alipay2ofx - CLI tool converting Alipay statements to OFX.

use alipay2ofx::{alipay_format::AlipayStatement, ConvertOptions, OutputZone, Result};
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// File name used when the output path is a directory.
const DEFAULT_OUTPUT_NAME: &str = "alipay_export.ofx";

#[derive(Parser)]
#[command(name = "alipay2ofx")]
#[command(about = "Convert an Alipay transaction statement to OFX", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file or directory path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source encoding label (gb2312, gbk, gb18030, utf-8)
    #[arg(long, default_value = "gb2312")]
    encoding: String,

    /// Timezone for emitted timestamps (home, local)
    #[arg(long, default_value = "home")]
    zone: String,

    /// Statement currency
    #[arg(long, default_value = "CNY")]
    currency: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut options = ConvertOptions::default()
        .with_encoding_label(&cli.encoding)?
        .with_output_zone(cli.zone.parse::<OutputZone>()?);
    options.currency = cli.currency;

    let statement = if let Some(ref input_path) = cli.input {
        let mut file = File::open(input_path)?;
        AlipayStatement::from_read(&mut file, options.encoding)?
    } else {
        let mut stdin = io::stdin();
        AlipayStatement::from_read(&mut stdin, options.encoding)?
    };

    if let Some(output_path) = cli.output {
        let path = if output_path.is_dir() {
            output_path.join(DEFAULT_OUTPUT_NAME)
        } else {
            output_path
        };
        let mut file = File::create(&path)?;
        statement.write_to(&mut file, &options)?;
        tracing::info!(path = %path.display(), "wrote OFX document");
    } else {
        let mut stdout = io::stdout();
        statement.write_to(&mut stdout, &options)?;
    }

    Ok(())
}
