//! Bounded-memory streaming driver.
//!
//! The document is read into one buffer of `buffer_capacity + overlap`
//! bytes. Tokens are only checked at positions below `buffer_capacity`; the
//! overlap gives the last of those positions their lookahead, and whatever
//! was read past the boundary is moved to the front of the buffer before
//! the next refill, so tokens straddling a refill are still seen whole.

use std::io::{self, ErrorKind, Read, Write};

use tracing::{debug, trace};

use crate::annotations::AnnotationTable;
use crate::emit::{EmitStats, PdfmarkWriter};
use crate::error::Result;
use crate::options::InjectOptions;
use crate::scanner::{ScanState, scan_chunk};

/// Outcome of a completed injection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectSummary {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub page_breaks: u64,
    pub annotated_pages: u64,
    pub links_emitted: u64,
    pub bookmarks_skipped: u64,
    pub skipped_pages: u64,
    /// Page box in effect when the input ended.
    pub final_page_size: (f64, f64),
    /// Number of buffer fills, including carry-only passes.
    pub refills: u64,
}

impl InjectSummary {
    fn new(bytes_read: u64, refills: u64, state: &ScanState, stats: &EmitStats) -> Self {
        Self {
            bytes_read,
            bytes_written: stats.bytes_written,
            page_breaks: stats.page_breaks,
            annotated_pages: stats.annotated_pages,
            links_emitted: stats.links_emitted,
            bookmarks_skipped: stats.bookmarks_skipped,
            skipped_pages: stats.skipped_pages,
            final_page_size: (state.page_width, state.page_height),
            refills,
        }
    }
}

/// Injects pdfmark link annotations from a table into PostScript streams.
#[derive(Debug, Clone)]
pub struct AnnotationInjector<'a> {
    table: &'a AnnotationTable,
    options: InjectOptions,
}

impl<'a> AnnotationInjector<'a> {
    /// Injector with default options.
    pub fn new(table: &'a AnnotationTable) -> Self {
        Self {
            table,
            options: InjectOptions::default(),
        }
    }

    /// Injector with explicit options, validated up front.
    pub fn with_options(table: &'a AnnotationTable, options: InjectOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { table, options })
    }

    /// Copy `input` to `output`, splicing a pdfmark block in front of every
    /// `showpage` whose page is listed in the table.
    ///
    /// Output already written when an error occurs is left in place.
    pub fn inject<R: Read, W: Write>(&self, mut input: R, output: W) -> Result<InjectSummary> {
        let capacity = self.options.buffer_capacity;
        let mut buffer = allocate(capacity + self.options.overlap)?;
        let (width, height) = self.options.default_page_size;
        let mut state = ScanState::new(width, height, self.options.first_page_number);
        let mut sink = PdfmarkWriter::new(output, self.table, self.options.precision);

        let mut carry = 0usize;
        let mut eof = false;
        let mut bytes_read = 0u64;
        let mut refills = 0u64;

        loop {
            buffer.copy_within(capacity..capacity + carry, 0);
            let mut filled = carry;
            if !eof {
                let (read, at_end) = fill(&mut input, &mut buffer[filled..])?;
                filled += read;
                bytes_read += read as u64;
                eof = at_end;
            }
            refills += 1;
            trace!(filled, carry, eof, "scanning chunk");

            state = scan_chunk(&buffer[..filled], capacity, state, &mut sink)?;
            carry = filled.saturating_sub(capacity);

            if eof && carry == 0 {
                break;
            }
        }

        sink.flush()?;
        let summary = InjectSummary::new(bytes_read, refills, &state, sink.stats());
        debug!(?summary, "injection finished");
        Ok(summary)
    }

    /// Run over an in-memory document, returning the annotated bytes.
    pub fn inject_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len());
        self.inject(input, &mut output)?;
        Ok(output)
    }
}

/// Zeroed working buffer, reporting allocation failure as an error.
fn allocate(len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|e| io::Error::new(ErrorKind::OutOfMemory, e))?;
    buffer.resize(len, 0);
    Ok(buffer)
}

/// Read until `buf` is full or the input ends.
///
/// Returns the number of bytes read and whether the end of input was hit.
fn fill<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<(usize, bool)> {
    let mut read = 0;
    while read < buf.len() {
        match input.read(&mut buf[read..]) {
            Ok(0) => return Ok((read, true)),
            Ok(n) => read += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok((read, false))
}

/// Decode `annotations_json` and annotate `input` into `output` with
/// default options.
pub fn inject_annotations<R: Read, W: Write>(
    annotations_json: &str,
    input: R,
    output: W,
) -> Result<InjectSummary> {
    let table = AnnotationTable::from_json(annotations_json)?;
    AnnotationInjector::new(&table).inject(input, output)
}
