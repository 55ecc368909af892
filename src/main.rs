//! CLI wrapper that re-categorizes a canonical CSV:
//!   cargo run -- canonical.csv > categorized.csv
//!   cargo run -- --input canonical.csv --rules rules.csv --output out.csv

use anyhow::{Result, bail};
use clap::{Arg, ArgAction, Command};
use statement_canon::{Categorizer, CsvFormat, Engine, RuleCategorizer, csv_io};
use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // ---------------------------------------------------------------- logging
    // send all tracing output to STDERR, keeping STDOUT clean for CSV
    let subscriber = FmtSubscriber::builder()
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // ---------------------------------------------------------------- flags
    let matches = Command::new("statement-canon")
        .arg(
            Arg::new("input")
                .long("input")
                .value_name("FILE")
                .help("Canonical transactions CSV"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .help("Categorized CSV (defaults to stdout)"),
        )
        .arg(
            Arg::new("rules")
                .long("rules")
                .value_name("FILE")
                .help("Categorization rules CSV (kind,pattern,category)"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .value_name("LABEL")
                .default_value("canonical-csv")
                .help("Source label reported in the categorization summary"),
        )
        .arg(
            Arg::new("delimiter")
                .long("delimiter")
                .value_name("CHAR")
                .default_value(",")
                .help("Field delimiter for input and output"),
        )
        .arg(
            Arg::new("no-headers")
                .long("no-headers")
                .action(ArgAction::SetTrue)
                .help("Input has no header row and none is written"),
        )
        .arg(Arg::new("input_pos").index(1).value_name("INPUT").hide(true))
        .arg(Arg::new("output_pos").index(2).value_name("OUTPUT").hide(true))
        .disable_help_subcommand(true)
        .get_matches();

    // ---------------------------------------------------- positional fallbacks
    let in_path = matches
        .get_one::<String>("input")
        .or_else(|| matches.get_one::<String>("input_pos"))
        .map(PathBuf::from);

    let out_path = matches
        .get_one::<String>("output")
        .or_else(|| matches.get_one::<String>("output_pos"))
        .map(PathBuf::from);

    let Some(in_path) = in_path else {
        eprintln!("Usage: statement-canon canonical.csv [--rules rules.csv] > categorized.csv");
        std::process::exit(1);
    };

    let format = CsvFormat {
        delimiter: parse_delimiter(matches.get_one::<String>("delimiter").map(String::as_str))?,
        has_headers: !matches.get_flag("no-headers"),
    };
    let source = matches
        .get_one::<String>("source")
        .cloned()
        .unwrap_or_else(|| "canonical-csv".to_string());

    // ---------------------------------------------------------------- ingest
    let mut txs = csv_io::read_transactions(File::open(&in_path)?, &format)?;
    info!(path = %in_path.display(), rows = txs.len(), "Finished ingest");

    // ------------------------------------------------------------ categorize
    let rules = matches
        .get_one::<String>("rules")
        .map(RuleCategorizer::from_path)
        .transpose()?;
    let categorizer = rules.as_ref().map(|r| r as &dyn Categorizer);

    let mut engine = Engine::new(source, categorizer);
    engine.categorize_batch(&mut txs);

    // ---------------------------------------------------------------- emit
    let sink: Box<dyn Write> = match out_path {
        Some(p) => Box::new(File::create(p)?),
        None => Box::new(io::stdout()),
    };
    csv_io::write_transactions(sink, &txs, &format)?;
    Ok(())
}

fn parse_delimiter(raw: Option<&str>) -> Result<u8> {
    match raw.map(|s| s.as_bytes()) {
        None => Ok(b','),
        Some([b]) => Ok(*b),
        Some(_) => bail!("--delimiter must be a single ASCII character"),
    }
}
