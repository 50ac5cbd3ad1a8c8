//! csv-salvage CLI - check that a CSV file imports cleanly

use clap::Parser;
use csv_salvage::{Dialect, HeaderMode, ReaderBuilder, Schema, Transform, encoding_for_label};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Import a CSV file with an ad-hoc schema and report what could be read.
///
/// Mostly useful to see whether a complete file can be read without errors.
/// Bad rows and fields are logged as warnings and skipped.
#[derive(Parser, Debug)]
#[command(name = "csv-salvage")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file to import
    file: PathBuf,

    /// Output field as NAME or NAME:KIND (KIND: string, int, bool, text, raw)
    #[arg(short = 'f', long = "field", required = true)]
    fields: Vec<String>,

    /// Zero-based input column to drop (repeatable)
    #[arg(short = 's', long = "skip")]
    skip: Vec<usize>,

    /// Number of records to print
    #[arg(short = 'n', long = "print", default_value = "0")]
    lines_to_print: usize,

    /// Print the value of this field for every record
    #[arg(short = 'k', long)]
    print_key: Option<String>,

    /// Stop at the first bad row or field
    #[arg(long)]
    raise: bool,

    /// Join rows continued with a trailing backslash
    #[arg(short = 'm', long)]
    multiline: bool,

    /// Encoding tried first (any WHATWG label)
    #[arg(short = 'e', long, default_value = "utf-8")]
    encoding: String,

    /// Guess the initial encoding from the file contents
    #[arg(long)]
    detect_encoding: bool,

    /// Tokenizer dialect: excel, excel-tab or unix
    #[arg(short = 'd', long, default_value = "excel")]
    dialect: String,

    /// Header handling: detect, present or absent
    #[arg(long, default_value = "detect")]
    header: String,

    /// Maximum attempts to find a good row
    #[arg(long, default_value_t = csv_salvage::DEFAULT_MAX_TRIES)]
    max_tries: usize,

    /// Log debug output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match import_file(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error processing {}: {}", args.file.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_schema(args: &Args) -> Result<Schema, Box<dyn std::error::Error>> {
    let mut builder = Schema::builder();
    for arg in &args.fields {
        let (name, kind) = arg.split_once(':').unwrap_or((arg.as_str(), "raw"));
        builder = match kind {
            "raw" => builder.raw_field(name),
            kind => {
                let transform = Transform::from_name(kind)
                    .ok_or_else(|| format!("unknown field kind {kind:?} for field {name:?}"))?;
                builder.field(name, transform)
            }
        };
    }
    for &index in &args.skip {
        builder = builder.skip(index);
    }
    Ok(builder.build()?)
}

fn import_file(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let schema = parse_schema(args)?;
    let header = HeaderMode::from_name(&args.header)
        .ok_or_else(|| format!("unknown header mode {:?}", args.header))?;

    let mut builder = ReaderBuilder::new(schema);
    builder
        .dialect(Dialect::from_name(&args.dialect)?)
        .encoding(encoding_for_label(&args.encoding)?)
        .detect_encoding(args.detect_encoding)
        .raise_on_error(args.raise)
        .multiline(args.multiline)
        .header_mode(header)
        .max_tries(args.max_tries);

    tracing::info!(file = %args.file.display(), "reading file");
    let mut reader = builder.from_path(&args.file)?;

    let mut printed = 0;
    while let Some(record) = reader.read_record()? {
        if let Some(key) = &args.print_key {
            match record.get(key) {
                Some(value) => println!("{value}"),
                None => println!("null"),
            }
        }
        if printed < args.lines_to_print {
            println!("{record}");
            printed += 1;
        }
    }

    let summary = reader.summary();
    tracing::info!(
        success = summary.success,
        ignored = summary.ignored,
        "{summary}"
    );
    Ok(())
}
