//! Text command - structure plain text without acquisition.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use console::style;

use billscan_core::TextStructurer;

use super::config::load_config;
use super::output::{render, OutputFormat};

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// Text file to structure, or `-` for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: TextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let text = if args.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        let bytes = fs::read(&args.input)?;
        String::from_utf8_lossy(&bytes).into_owned()
    };

    let structurer = TextStructurer::new(&config.extraction)?;
    let document = structurer.structure(&text);
    let output = render(&document, args.format, args.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!("{} Output written to {}", style("✓").green(), output_path.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}
