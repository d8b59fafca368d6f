//! foliotxt - Extract text from documents
//!
//! Prints every string painted by a show-text operator, one per line.
//! Pages whose content cannot be read are reported on stderr and skipped.

use anyhow::{Context, Result};
use clap::Parser;
use folio_core::{DanglingPolicy, ExtractOptions, ParseOptions, TextItem, extract_text};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "foliotxt")]
#[command(about = "Extract the text painted by each page of a document")]
#[command(version)]
struct Args {
    /// One or more paths to input files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Space-separated list of page numbers to extract (1-indexed)
    #[arg(long, num_args = 1..)]
    page_numbers: Option<Vec<usize>>,

    /// Maximum number of pages to extract (0 means no limit)
    #[arg(short = 'm', long, default_value = "0")]
    maxpages: usize,

    /// Resolve references to missing objects as null instead of failing
    #[arg(long)]
    null_dangling: bool,

    /// Maximum nesting depth of the page tree
    #[arg(long, default_value_t = folio_core::document::DEFAULT_MAX_PAGE_DEPTH)]
    max_depth: usize,

    /// Write debug logging to stderr
    #[arg(short = 'd', long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_options(args: &Args) -> ExtractOptions {
    let dangling = if args.null_dangling {
        DanglingPolicy::Null
    } else {
        DanglingPolicy::Error
    };
    ExtractOptions {
        parse: ParseOptions::default()
            .with_dangling(dangling)
            .with_max_page_depth(args.max_depth),
        // Zero can never match a page once shifted, so it is dropped.
        page_numbers: args.page_numbers.as_ref().map(|numbers| {
            numbers
                .iter()
                .filter_map(|n| n.checked_sub(1))
                .collect()
        }),
        maxpages: args.maxpages,
    }
}

fn process_file<W: Write>(path: &Path, out: &mut W, options: &ExtractOptions) -> Result<()> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    // SAFETY: the file is opened read-only and is not modified while mapped.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("cannot map {}", path.display()))?;

    let items = extract_text(&mmap, options)?;
    for item in items {
        match item {
            TextItem::Text { text, .. } => writeln!(out, "{text}")?,
            TextItem::Warning { page, message } => {
                eprintln!("{}: page {}: {message}", path.display(), page + 1);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    let options = build_options(&args);

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("cannot create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    for path in &args.files {
        process_file(path, &mut output, &options)
            .with_context(|| format!("error processing {}", path.display()))?;
    }
    output.flush()?;
    Ok(())
}
