//! Rebuild the xref table and trailer of a PDF file.
//!
//! Usage:
//!   cargo run --release --bin fix_xref -- input.pdf
//!   cargo run --release --bin fix_xref -- input.pdf --output fixed.pdf
//!   cargo run --release --bin fix_xref -- input.pdf -o fixed.pdf --robust --report
//!
//! Without `--output`, the rebuilt PDF is written to stdout.
//! `RUST_LOG` controls log output; `--verbose` defaults it to debug.

use pdf_xref_fix::{DuplicatePolicy, RebuildOptions, RebuildReport, XrefRebuilder};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

struct FixConfig {
    input: PathBuf,
    output: Option<PathBuf>,
    options: RebuildOptions,
    report: bool,
    verbose: bool,
}

impl FixConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut input = None;
        let mut output = None;
        let mut options = RebuildOptions::default();
        let mut first_wins = false;
        let mut max_table_size = None;
        let mut report = false;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    let path = args.get(i).ok_or("--output needs a path")?;
                    output = Some(PathBuf::from(path));
                },
                "--robust" => {
                    options = RebuildOptions::robust();
                },
                "--first-wins" => {
                    first_wins = true;
                },
                "--max-table-size" => {
                    i += 1;
                    let value = args.get(i).ok_or("--max-table-size needs a number")?;
                    let limit = value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid --max-table-size: {}", value))?;
                    max_table_size = Some(limit);
                },
                "--report" => {
                    report = true;
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                other if other.starts_with('-') => {
                    return Err(format!("unknown option: {}", other));
                },
                other => {
                    if input.is_some() {
                        return Err(format!("unexpected argument: {}", other));
                    }
                    input = Some(PathBuf::from(other));
                },
            }
            i += 1;
        }

        // Presets replace the whole struct, so apply overrides last
        if first_wins {
            options = options.with_duplicate_policy(DuplicatePolicy::FirstWins);
        }
        if let Some(limit) = max_table_size {
            options = options.with_max_table_size(limit);
        }

        Ok(Self {
            input: input.ok_or("missing input file")?,
            output,
            options,
            report,
            verbose,
        })
    }
}

fn print_usage() {
    eprintln!(
        "Usage: fix_xref <input.pdf> [-o|--output <out.pdf>] [--robust] [--first-wins] \
         [--max-table-size <n>] [--report] [-v|--verbose]"
    );
}

fn write_report(report: &RebuildReport) -> pdf_xref_fix::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    eprintln!("{}", json);
    Ok(())
}

fn run(config: &FixConfig) -> pdf_xref_fix::Result<()> {
    let data = fs::read(&config.input)?;
    log::debug!("Read {} bytes from {}", data.len(), config.input.display());

    let rebuilder = XrefRebuilder::with_options(config.options);
    let (pdf, report) = rebuilder.rebuild_with_report(&data)?;

    match &config.output {
        Some(path) => {
            fs::write(path, &pdf)?;
            log::info!("Wrote {} bytes to {}", pdf.len(), path.display());
        },
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(&pdf)?;
            lock.flush()?;
        },
    }

    if config.report {
        write_report(&report)?;
    }

    Ok(())
}

fn main() {
    let config = match FixConfig::from_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            std::process::exit(2);
        },
    };

    let default_level = if config.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(&config) {
        eprintln!("Error: {}: {}", config.input.display(), e);
        std::process::exit(1);
    }
}
