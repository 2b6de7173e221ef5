//! pdfmark emission at page breaks.

use std::io::Write;

use tracing::{debug, trace, warn};

use crate::annotations::{AnnotationTable, PageRecord};
use crate::error::{PsMarkError, Result};
use crate::geometry::{Rect, Transform, compute_transform};
use crate::scanner::{PageSink, ScanState};

const BLOCK_OPEN: &[u8] = b"\ngsave\ninitmatrix\n";
const BLOCK_CLOSE: &[u8] = b"grestore";

/// Counters collected while emitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub page_breaks: u64,
    pub annotated_pages: u64,
    pub links_emitted: u64,
    pub bookmarks_skipped: u64,
    /// Pages whose annotations were dropped because of an unusable media box.
    pub skipped_pages: u64,
    /// Bytes written to the output, pass-through and pdfmark text alike.
    pub bytes_written: u64,
}

/// Write one link annotation command.
pub fn write_link<W: Write>(
    out: &mut W,
    display_text: &str,
    rect: &Rect,
    precision: usize,
) -> std::io::Result<()> {
    out.write_all(b"[ ")?;
    out.write_all(display_text.as_bytes())?;
    out.write_all(b" /Rect [")?;
    for bound in rect {
        write!(out, " {bound:.precision$}")?;
    }
    out.write_all(b" ] /Subtype /Link /ANN pdfmark\n")
}

/// Page sink writing pass-through bytes and pdfmark blocks to one stream.
pub struct PdfmarkWriter<'a, W: Write> {
    out: W,
    table: &'a AnnotationTable,
    precision: usize,
    stats: EmitStats,
    block: Vec<u8>,
}

impl<'a, W: Write> PdfmarkWriter<'a, W> {
    pub fn new(out: W, table: &'a AnnotationTable, precision: usize) -> Self {
        Self {
            out,
            table,
            precision,
            stats: EmitStats::default(),
            block: Vec::new(),
        }
    }

    pub fn stats(&self) -> &EmitStats {
        &self.stats
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render the block for `page` into the scratch buffer.
    fn render_block(&mut self, page_number: u64, page: &PageRecord, transform: &Transform) -> Result<()> {
        self.block.clear();
        self.block.extend_from_slice(BLOCK_OPEN);
        for link in &page.links {
            let rect = transform.apply(&link.rect);
            if !rect.iter().all(|v| v.is_finite()) {
                warn!(page = page_number, rect = ?link.rect, "dropping link with non-finite coordinates");
                continue;
            }
            write_link(&mut self.block, &link.display_text, &rect, self.precision)?;
            self.stats.links_emitted += 1;
        }
        for bookmark in &page.bookmarks {
            trace!(page = page_number, uri = %bookmark.target_uri, "bookmark not emitted");
            self.stats.bookmarks_skipped += 1;
        }
        self.block.extend_from_slice(BLOCK_CLOSE);
        Ok(())
    }
}

impl<W: Write> PageSink for PdfmarkWriter<'_, W> {
    fn pass_through(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        self.stats.bytes_written += bytes.len() as u64;
        Ok(())
    }

    fn page_break(&mut self, state: &ScanState) -> Result<()> {
        self.stats.page_breaks += 1;
        let table = self.table;
        let listed = u32::try_from(state.page_number).ok().and_then(|n| table.page(n));
        let Some(page) = listed else {
            trace!(page = state.page_number, "no annotations for page");
            return Ok(());
        };

        let transform = match compute_transform(state.page_width, state.page_height, &page.media_box) {
            Ok(transform) => transform,
            Err(err @ PsMarkError::DegenerateMediaBox { .. }) => {
                warn!(page = state.page_number, "skipping annotations: {err}");
                self.stats.skipped_pages += 1;
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        debug!(
            page = state.page_number,
            media_box = ?page.media_box,
            page_width = state.page_width,
            page_height = state.page_height,
            ?transform,
            "emitting page annotations"
        );

        self.render_block(state.page_number, page, &transform)?;
        self.out.write_all(&self.block)?;
        self.stats.bytes_written += self.block.len() as u64;
        self.stats.annotated_pages += 1;
        Ok(())
    }
}
