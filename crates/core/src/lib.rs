//! psmark - inject pdfmark hyperlink annotations into PostScript streams.
//!
//! A PostScript document is copied byte for byte from a reader to a writer.
//! At every `showpage` whose page is listed in an [`AnnotationTable`], a
//! `gsave ... grestore` block of `/ANN pdfmark` link commands is spliced in,
//! with each link rectangle fitted from the page's media box onto the page
//! size declared by the document.
//!
//! # Example
//!
//! ```ignore
//! use psmark_core::{AnnotationInjector, AnnotationTable};
//!
//! let table = AnnotationTable::from_json(&json)?;
//! let summary = AnnotationInjector::new(&table).inject(input, output)?;
//! ```

pub mod annotations;
pub mod emit;
pub mod error;
pub mod geometry;
pub mod lexer;
pub mod options;
pub mod scanner;
pub mod stream;

pub use annotations::{AnnotationRecord, AnnotationTable, PageRecord};
pub use error::{PsMarkError, Result};
pub use options::{InjectOptions, InjectorBuilder};
pub use stream::{AnnotationInjector, InjectSummary, inject_annotations};
