//! sourcedeco - decorate a source file with highlighting markup
//!
//! Reads a source file and its highlighting ranges, then prints one
//! decorated line per source line.

use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use sourcedeco::{
    AnsiMarkup, Config, DecorationError, HtmlMarkup, LineDecorator, LineWindow, Markup,
    RangeStore, Result,
};

/// Command line options, layered over the config file
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    file: Option<PathBuf>,
    ranges: Option<String>,
    ranges_file: Option<PathBuf>,
    symbols: Option<String>,
    occurrences: Option<String>,
    window: LineWindow,
    ansi: Option<bool>,
    line_numbers: bool,
    strict: bool,
    help: bool,
    version: bool,
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr, filtered by SOURCEDECO_LOG (default: warn)
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("SOURCEDECO_LOG")
        .unwrap_or_else(|_| EnvFilter::new("sourcedeco=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init();
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;

    if options.help {
        print_usage();
        return Ok(());
    }
    if options.version {
        print_version();
        return Ok(());
    }

    let mut config = Config::load();
    config.show_line_numbers |= options.line_numbers;
    config.strict_nesting |= options.strict;
    if let Some(ansi) = options.ansi {
        config.ansi = ansi;
    }

    let file = options
        .file
        .as_ref()
        .ok_or_else(|| DecorationError::Usage("no source file given (try --help)".into()))?;
    let text = fs::read_to_string(file)?;

    let mut store = RangeStore::new();
    if let Some(path) = &options.ranges_file {
        store.load_syntax_highlighting(&fs::read_to_string(path)?)?;
    }
    if let Some(ranges) = &options.ranges {
        store.load_syntax_highlighting(ranges)?;
    }
    if let Some(symbols) = &options.symbols {
        store.load_symbol_references(symbols)?;
    }
    if let Some(occurrences) = &options.occurrences {
        store.load_symbol_occurrences(occurrences)?;
    }
    tracing::info!(file = %file.display(), ranges = store.len(), "decorating");

    let lines = if config.ansi {
        decorate(AnsiMarkup::new(), &config, &text, &store, options.window)?
    } else {
        decorate(HtmlMarkup::from_config(&config), &config, &text, &store, options.window)?
    };

    let first_line = options.window.from.unwrap_or(1).max(1);
    print_lines(&lines, first_line, config.show_line_numbers)
}

fn decorate<M: Markup>(
    markup: M,
    config: &Config,
    text: &str,
    store: &RangeStore,
    window: LineWindow,
) -> Result<Vec<String>> {
    LineDecorator::new(markup)
        .with_strict_nesting(config.strict_nesting)
        .decorate_window(text, store, window)
}

fn print_lines(lines: &[String], first_line: usize, line_numbers: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let width = line_number_width(first_line + lines.len().saturating_sub(1));

    for (idx, line) in lines.iter().enumerate() {
        if line_numbers {
            write!(out, "{:>width$} ", first_line + idx, width = width)?;
        }
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

/// Digits needed for the largest line number, minimum 3
fn line_number_width(last_line: usize) -> usize {
    last_line.max(1).to_string().len().max(3)
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--version" | "-V" => options.version = true,
            "--ranges" | "-r" => options.ranges = Some(value(arg, iter.next())?.to_string()),
            "--ranges-file" => options.ranges_file = Some(PathBuf::from(value(arg, iter.next())?)),
            "--symbols" | "-s" => options.symbols = Some(value(arg, iter.next())?.to_string()),
            "--occurrences" => options.occurrences = Some(value(arg, iter.next())?.to_string()),
            "--from" => options.window.from = Some(line_number(arg, iter.next())?),
            "--to" => options.window.to = Some(line_number(arg, iter.next())?),
            "--ansi" => options.ansi = Some(true),
            "--html" => options.ansi = Some(false),
            "--line-numbers" | "-n" => options.line_numbers = true,
            "--strict" => options.strict = true,
            other if other.starts_with('-') => {
                return Err(DecorationError::Usage(format!("unknown option: {}", other)));
            }
            path => {
                if options.file.is_some() {
                    return Err(DecorationError::Usage(format!("unexpected argument: {}", path)));
                }
                options.file = Some(PathBuf::from(path));
            }
        }
    }

    Ok(options)
}

fn value<'a>(option: &str, value: Option<&'a String>) -> Result<&'a str> {
    value
        .map(String::as_str)
        .ok_or_else(|| DecorationError::Usage(format!("{} requires a value", option)))
}

fn line_number(option: &str, raw: Option<&String>) -> Result<usize> {
    let raw = value(option, raw)?;
    raw.parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| DecorationError::Usage(format!("{} expects a positive line number, got {}", option, raw)))
}

fn print_usage() {
    println!("sourcedeco {} - decorate source text with highlighting markup", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: sourcedeco [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -r, --ranges DATA        Highlighting ranges (start,end,class;...)");
    println!("      --ranges-file PATH   Read highlighting ranges from a file");
    println!("  -s, --symbols DATA       Symbol references (start,end,id;...)");
    println!("      --occurrences DATA   Symbol occurrences (decl_start,decl_end,occ...;...)");
    println!("      --from N             First line to print (1-indexed)");
    println!("      --to N               Last line to print (inclusive)");
    println!("      --ansi               Render colors for the terminal");
    println!("      --html               Render HTML spans (default)");
    println!("  -n, --line-numbers       Prefix lines with their number");
    println!("      --strict             Reject crossing ranges");
    println!("  -h, --help               Show this help message");
    println!("  -V, --version            Show version information");
    println!();
    println!("Settings are read from ~/.sourcedeco.toml; logging from SOURCEDECO_LOG.");
}

fn print_version() {
    println!("sourcedeco {}", env!("CARGO_PKG_VERSION"));
}
