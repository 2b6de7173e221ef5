//! Structural token detection over a window of PostScript bytes.
//!
//! Only two tokens matter: `/PageSize` declarations, which update the page
//! box the annotations are fitted to, and `showpage`, which marks a page
//! break. Everything else is passed through untouched.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::{debug, trace};

use crate::error::Result;
use crate::lexer::{LexState, is_blank};

/// Bytes of lookahead needed at every scanned position.
pub const MAX_TOKEN_SIZE: usize = 10;

/// Longest `/PageSize` operand, from the end of the token through `]`.
///
/// Only this many bytes are examined, so the outcome does not depend on
/// where a refill boundary falls.
pub const MAX_PAGE_SIZE_OPERAND: usize = 56;

/// US Letter, in points.
pub const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

pub(crate) const PAGE_SIZE_TOKEN: &[u8] = b"/PageSize";
const SHOWPAGE_TOKEN: &[u8] = b"showpage";

static PAGE_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\s*\[\s*([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)",
        r"\s+([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)\s*\]",
    ))
    .expect("page size pattern is valid")
});

/// Scanner state threaded through every chunk of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanState {
    pub page_width: f64,
    pub page_height: f64,
    pub lex: LexState,
    /// Page number looked up at the next `showpage`.
    pub page_number: u64,
}

impl ScanState {
    pub fn new(page_width: f64, page_height: f64, first_page_number: u32) -> Self {
        Self {
            page_width,
            page_height,
            lex: LexState::default(),
            page_number: u64::from(first_page_number),
        }
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE.0, DEFAULT_PAGE_SIZE.1, 0)
    }
}

/// Receiver of the scanner's output.
///
/// Pass-through spans arrive in input order. A page break is reported only
/// after every byte preceding the `showpage` line break has been passed
/// through, so a sink writing both to one stream splices its output at the
/// right place.
pub trait PageSink {
    /// Bytes to be reproduced verbatim.
    fn pass_through(&mut self, bytes: &[u8]) -> Result<()>;

    /// A `showpage` was found. `state.page_number` is the page it ends.
    fn page_break(&mut self, state: &ScanState) -> Result<()>;
}

/// Parse the `[width height]` pair that follows a `/PageSize` token.
///
/// The pair must follow directly: only whitespace may precede the `[`.
/// Returns `None` when the bytes do not start with a well-formed pair, or
/// when either dimension is not a positive finite number.
pub fn parse_page_size(bytes: &[u8]) -> Option<(f64, f64)> {
    let caps = PAGE_SIZE_RE.captures(bytes)?;
    let parse = |idx: usize| -> Option<f64> {
        let text = std::str::from_utf8(caps.get(idx)?.as_bytes()).ok()?;
        text.parse::<f64>().ok()
    };
    let width = parse(1)?;
    let height = parse(2)?;
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Some((width, height))
    } else {
        None
    }
}

/// Scan `chunk` for page-size declarations and page breaks.
///
/// Token starts are checked at positions below `limit` that still have
/// [`MAX_TOKEN_SIZE`] bytes of valid data ahead of them. Bytes up to
/// `min(limit, chunk.len())` are handed to `sink` before returning; the
/// caller is responsible for presenting the bytes past `limit` again at
/// the front of the next chunk.
pub fn scan_chunk<S: PageSink>(
    chunk: &[u8],
    limit: usize,
    mut state: ScanState,
    sink: &mut S,
) -> Result<ScanState> {
    let search_limit = chunk.len().saturating_sub(MAX_TOKEN_SIZE - 1).min(limit);
    let mut flushed = 0;

    for i in 0..search_limit {
        let window = &chunk[i..i + MAX_TOKEN_SIZE];
        if !state.lex.step(window[0], window[1]) {
            continue;
        }

        if window.starts_with(PAGE_SIZE_TOKEN) {
            let start = i + PAGE_SIZE_TOKEN.len();
            let end = chunk.len().min(start + MAX_PAGE_SIZE_OPERAND);
            match parse_page_size(&chunk[start..end]) {
                Some((width, height)) => {
                    debug!(width, height, offset = i, "page size declared");
                    state.page_width = width;
                    state.page_height = height;
                }
                None => trace!(offset = i, "ignoring unparsable /PageSize"),
            }
        } else if is_blank(window[0])
            && window[1..].starts_with(SHOWPAGE_TOKEN)
            && is_blank(window[SHOWPAGE_TOKEN.len() + 1])
        {
            sink.pass_through(&chunk[flushed..i])?;
            flushed = i;
            sink.page_break(&state)?;
            state.page_number += 1;
        }
    }

    let end = chunk.len().min(limit);
    if flushed < end {
        sink.pass_through(&chunk[flushed..end])?;
    }
    Ok(state)
}
