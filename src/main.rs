//! Gridcalc - a spreadsheet calculator for the command line

mod config;
mod error;

use anyhow::{Context, Result};
use error::CliError;
use gridcalc_core::{NamePattern, Spreadsheet, Value};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GRIDCALC_LOG";

fn print_usage() {
    eprintln!("Usage: gridcalc [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Spreadsheet file to open (.xml)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula against the sheet and print it");
    eprintln!("  -s, --set <CELL=TEXT>     Set a cell before evaluating (can be repeated)");
    eprintln!("  -o, --output <FILE>       Save the resulting sheet");
    eprintln!("  --pattern <REGEX>         Only accept cell names matching REGEX");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    file: Option<PathBuf>,
    command: Option<String>,
    assignments: Vec<(String, String)>,
    output: Option<PathBuf>,
    pattern: Option<String>,
    no_config: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> std::result::Result<Options, CliError> {
    let mut options = Options::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                options.help = true;
                return Ok(options);
            }
            "-c" | "--command" => {
                i += 1;
                let formula = args.get(i).ok_or(CliError::MissingValue("--command"))?;
                options.command = Some(formula.to_string());
            }
            "-s" | "--set" => {
                i += 1;
                let assignment = args.get(i).ok_or(CliError::MissingValue("--set"))?;
                let (cell, text) = assignment
                    .split_once('=')
                    .ok_or_else(|| CliError::InvalidAssignment(assignment.to_string()))?;
                options
                    .assignments
                    .push((cell.trim().to_string(), text.to_string()));
            }
            "-o" | "--output" => {
                i += 1;
                let path = args.get(i).ok_or(CliError::MissingValue("--output"))?;
                options.output = Some(PathBuf::from(path));
            }
            "--pattern" => {
                i += 1;
                let pattern = args.get(i).ok_or(CliError::MissingValue("--pattern"))?;
                options.pattern = Some(pattern.to_string());
            }
            "--no-config" => options.no_config = true,
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(CliError::UnknownOption(arg.to_string()));
            }
            arg => {
                if options.file.is_some() {
                    return Err(CliError::UnexpectedArgument(arg.to_string()));
                }
                options.file = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(options)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn name_pattern(options: &Options) -> Result<NamePattern> {
    let source = match &options.pattern {
        Some(pattern) => Some(pattern.clone()),
        None if options.no_config => None,
        None => config::load_config()?.pattern,
    };
    match source {
        Some(source) => {
            NamePattern::new(&source).with_context(|| format!("invalid pattern {:?}", source))
        }
        None => Ok(NamePattern::accept_all()),
    }
}

/// Run the command line. Returns the process exit code.
fn run(options: Options) -> Result<i32> {
    let pattern = name_pattern(&options)?;
    debug!(pattern = %pattern, "using cell name pattern");

    let mut sheet = match &options.file {
        Some(path) => Spreadsheet::load_file(path, pattern)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Spreadsheet::with_pattern(pattern),
    };

    for (cell, text) in &options.assignments {
        sheet
            .set_contents_of_cell(cell, text)
            .with_context(|| format!("failed to set {}", cell))?;
    }

    let mut code = 0;
    if let Some(formula) = &options.command {
        let value = sheet.evaluate(formula)?;
        println!("{}", value);
        if matches!(value, Value::Error(_)) {
            code = 1;
        }
    } else {
        for name in sheet.get_names_of_non_empty_cells() {
            let contents = sheet.get_cell_contents(name.as_str())?;
            let value = sheet.get_cell_value(name.as_str())?;
            println!("{}: {} => {}", name, contents, value);
        }
    }

    if let Some(path) = &options.output {
        sheet
            .save_file(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
    }

    Ok(code)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };
    if options.help {
        print_usage();
        return;
    }

    init_logging();

    match run(options) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
