//! psmark - Inject pdfmark hyperlinks into a PostScript document
//!
//! Copies PostScript from the input to the output, adding `/ANN pdfmark`
//! link annotations before each `showpage` listed in a JSON annotation
//! table, so that a distiller produces a PDF with live links.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use psmark_core::options::{DEFAULT_BUFFER_CAPACITY, DEFAULT_OVERLAP, DEFAULT_PRECISION};
use psmark_core::scanner::DEFAULT_PAGE_SIZE;
use psmark_core::{AnnotationInjector, AnnotationTable, InjectOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Inject pdfmark link annotations into a PostScript stream.
#[derive(Parser, Debug)]
#[command(name = "psmark")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Annotation table as a JSON object keyed by page number
    #[arg(required_unless_present = "annotations", conflicts_with = "annotations")]
    annotations_json: Option<String>,

    /// Read the annotation table from a JSON file instead
    #[arg(short = 'a', long)]
    annotations: Option<PathBuf>,

    /// PostScript input file, or "-" for stdin
    #[arg(short = 'i', long, default_value = "-")]
    input: String,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    output: String,

    /// Bytes scanned per buffer refill
    #[arg(long = "buffer-size", default_value_t = DEFAULT_BUFFER_CAPACITY)]
    buffer_size: usize,

    /// Bytes carried over between refills (at least 64)
    #[arg(long, default_value_t = DEFAULT_OVERLAP)]
    overlap: usize,

    /// Annotation table key used for the first showpage
    #[arg(long = "first-page", default_value_t = 0)]
    first_page: u32,

    /// Fractional digits written for rectangle coordinates
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    precision: usize,

    /// Page width assumed until the document declares /PageSize
    #[arg(long = "page-width", default_value_t = DEFAULT_PAGE_SIZE.0)]
    page_width: f64,

    /// Page height assumed until the document declares /PageSize
    #[arg(long = "page-height", default_value_t = DEFAULT_PAGE_SIZE.1)]
    page_height: f64,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

impl Args {
    fn options(&self) -> InjectOptions {
        InjectOptions {
            buffer_capacity: self.buffer_size,
            overlap: self.overlap,
            default_page_size: (self.page_width, self.page_height),
            first_page_number: self.first_page,
            precision: self.precision,
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_table(args: &Args) -> Result<AnnotationTable> {
    if let Some(ref path) = args.annotations {
        let file = File::open(path)
            .with_context(|| format!("failed to open annotations {}", path.display()))?;
        return AnnotationTable::from_reader(io::BufReader::new(file))
            .with_context(|| format!("failed to load annotations {}", path.display()));
    }
    match args.annotations_json.as_deref() {
        Some(json) => AnnotationTable::from_json(json).context("failed to load annotations"),
        None => bail!("no annotation table given"),
    }
}

fn open_input(path: &str) -> Result<Box<dyn Read>> {
    if path == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("failed to open input {path}"))?;
    Ok(Box::new(file))
}

fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(path).with_context(|| format!("failed to create output {path}"))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn run(args: &Args) -> Result<()> {
    // The table and options are checked before any output is produced.
    let table = load_table(args)?;
    let injector = AnnotationInjector::with_options(&table, args.options())?;

    let input = open_input(&args.input)?;
    let output = open_output(&args.output)?;
    let summary = injector
        .inject(input, output)
        .context("error during processing")?;

    info!(
        pages = summary.page_breaks,
        annotated = summary.annotated_pages,
        links = summary.links_emitted,
        bytes_in = summary.bytes_read,
        bytes_out = summary.bytes_written,
        "done"
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
