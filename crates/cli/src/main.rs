//! jsonq CLI
//!
//! Command-line front end for json-core: reads JSON from a file or stdin,
//! validates it, and either re-serializes it (compact or pretty) or
//! extracts one value by a dotted/bracketed path.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use json_core::{JsonError, ParseOptions, StringifyOptions, Value};

#[derive(ClapParser)]
#[command(name = "jsonq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query and pretty-print JSON from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-serialize a JSON document, compact or pretty-printed
    Format {
        /// Input file; reads stdin if omitted
        input: Option<PathBuf>,

        /// Pretty-print with indentation instead of minifying
        #[arg(short, long)]
        pretty: bool,

        /// Spaces per indentation level (only with --pretty)
        #[arg(long, default_value_t = 2)]
        indent: u32,

        /// Permit a trailing comma before a closing `]` or `}`
        #[arg(long)]
        allow_trailing: bool,

        /// Maximum nesting depth; 0 means unlimited
        #[arg(long, default_value_t = 0)]
        max_depth: usize,
    },

    /// Extract one value by a dotted path, e.g. `a.b.0.c`
    Get {
        /// Input file; reads stdin if omitted
        input: Option<PathBuf>,

        /// Dotted path to the value, e.g. `users.0.name`
        path: String,

        /// Pretty-print the extracted value
        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate that input is well-formed JSON, printing nothing on success
    Check {
        /// Input file; reads stdin if omitted
        input: Option<PathBuf>,

        /// Maximum nesting depth; 0 means unlimited
        #[arg(long, default_value_t = 0)]
        max_depth: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jsonq=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    json_core::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Format {
            input,
            pretty,
            indent,
            allow_trailing,
            max_depth,
        } => run_format(input, pretty, indent, allow_trailing, max_depth),
        Commands::Get {
            input,
            path,
            pretty,
        } => run_get(input, &path, pretty),
        Commands::Check { input, max_depth } => run_check(input, max_depth),
    };

    if let Err(message) = result {
        eprintln!("Error: {message}");
        process::exit(1);
    }
}

fn read_input(input: Option<PathBuf>) -> Result<Vec<u8>, String> {
    match input {
        Some(path) => fs::read(&path).map_err(|e| format!("reading {}: {e}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| format!("reading stdin: {e}"))?;
            Ok(buf)
        }
    }
}

fn describe_parse_error(err: JsonError) -> String {
    err.to_string()
}

fn run_format(
    input: Option<PathBuf>,
    pretty: bool,
    indent: u32,
    allow_trailing: bool,
    max_depth: usize,
) -> Result<(), String> {
    let bytes = read_input(input)?;
    let options = ParseOptions {
        allow_trailing,
        max_depth,
        ..ParseOptions::default()
    };
    let doc = json_core::parse_with(&bytes, &options).map_err(describe_parse_error)?;

    let stringify_options = StringifyOptions {
        pretty,
        indent,
        ..StringifyOptions::default()
    };
    println!("{}", doc.stringify_with(&stringify_options));
    Ok(())
}

fn run_check(input: Option<PathBuf>, max_depth: usize) -> Result<(), String> {
    let bytes = read_input(input)?;
    let options = ParseOptions {
        max_depth,
        ..ParseOptions::default()
    };
    json_core::parse_with(&bytes, &options).map_err(describe_parse_error)?;
    Ok(())
}

fn run_get(input: Option<PathBuf>, path: &str, pretty: bool) -> Result<(), String> {
    let bytes = read_input(input)?;
    let doc = json_core::parse(&bytes).map_err(describe_parse_error)?;

    let mut current = doc.root();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = navigate(current, segment)
            .ok_or_else(|| format!("no value at path segment '{segment}'"))?;
    }

    let options = if pretty {
        StringifyOptions::pretty()
    } else {
        StringifyOptions::default()
    };
    println!("{}", json_core::stringify(current, &options));
    Ok(())
}

/// Resolves one path segment against a value: an object member by key, or
/// (if `segment` parses as an integer) an array element by index.
fn navigate<'doc>(value: Value<'doc>, segment: &str) -> Option<Value<'doc>> {
    if let Ok(index) = segment.parse::<usize>() {
        if let Some(v) = value.get_index(index) {
            return Some(v);
        }
    }
    value.get(segment)
}
