//! Injection options and their builder.
//!
//! # Example
//! ```ignore
//! use psmark_core::options::InjectorBuilder;
//!
//! let injector = InjectorBuilder::new()
//!     .first_page_number(1)
//!     .precision(2)
//!     .build(&table)?;
//! injector.inject(std::io::stdin().lock(), std::io::stdout().lock())?;
//! ```

use crate::annotations::AnnotationTable;
use crate::error::{PsMarkError, Result};
use crate::scanner::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE_OPERAND, PAGE_SIZE_TOKEN};
use crate::stream::AnnotationInjector;

/// Default scan boundary per refill: 4 MiB.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096 * 1024;

/// Smallest overlap that still shows a `/PageSize` operand starting at the
/// last scanned position in full.
pub const MIN_OVERLAP: usize = PAGE_SIZE_TOKEN.len() - 1 + MAX_PAGE_SIZE_OPERAND;

/// Default number of bytes carried over between refills.
pub const DEFAULT_OVERLAP: usize = MIN_OVERLAP;

/// Upper bound for both the buffer capacity and the overlap: 1 GiB.
pub const MAX_BUFFER_SIZE: usize = 1 << 30;

pub const DEFAULT_PRECISION: usize = 4;

const MAX_PRECISION: usize = 12;

/// Options controlling the streaming injector.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectOptions {
    /// Bytes scanned per refill before the tail is carried over.
    pub buffer_capacity: usize,

    /// Tail bytes read past `buffer_capacity` so that tokens and
    /// `/PageSize` operands straddling the boundary are seen whole.
    pub overlap: usize,

    /// Page box assumed until the document declares `/PageSize`.
    pub default_page_size: (f64, f64),

    /// Page number looked up at the first `showpage`.
    pub first_page_number: u32,

    /// Fractional digits written for each rectangle coordinate.
    pub precision: usize,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            overlap: DEFAULT_OVERLAP,
            default_page_size: DEFAULT_PAGE_SIZE,
            first_page_number: 0,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl InjectOptions {
    /// Check that the options describe a usable scanner.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 || self.buffer_capacity > MAX_BUFFER_SIZE {
            return Err(PsMarkError::InvalidOptions(format!(
                "buffer capacity must be between 1 and {MAX_BUFFER_SIZE} bytes, got {}",
                self.buffer_capacity
            )));
        }
        if self.overlap < MIN_OVERLAP || self.overlap > MAX_BUFFER_SIZE {
            return Err(PsMarkError::InvalidOptions(format!(
                "overlap must be between {MIN_OVERLAP} and {MAX_BUFFER_SIZE} bytes, got {}",
                self.overlap
            )));
        }
        if self.buffer_capacity.checked_add(self.overlap).is_none() {
            return Err(PsMarkError::InvalidOptions(
                "buffer capacity plus overlap overflows".to_string(),
            ));
        }
        if self.precision > MAX_PRECISION {
            return Err(PsMarkError::InvalidOptions(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        let (width, height) = self.default_page_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PsMarkError::InvalidOptions(format!(
                "default page size must be positive, got {width}x{height}"
            )));
        }
        Ok(())
    }
}

/// Fluent construction of an [`AnnotationInjector`].
#[derive(Debug, Clone, Default)]
pub struct InjectorBuilder {
    options: InjectOptions,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of bytes scanned per refill.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.options.buffer_capacity = capacity;
        self
    }

    /// Sets the number of bytes carried between refills.
    pub fn overlap(mut self, overlap: usize) -> Self {
        self.options.overlap = overlap;
        self
    }

    /// Sets the page box assumed before any `/PageSize` declaration.
    pub fn default_page_size(mut self, width: f64, height: f64) -> Self {
        self.options.default_page_size = (width, height);
        self
    }

    /// Sets the page number used for the first `showpage`.
    pub fn first_page_number(mut self, number: u32) -> Self {
        self.options.first_page_number = number;
        self
    }

    /// Sets the number of fractional digits in emitted coordinates.
    pub fn precision(mut self, digits: usize) -> Self {
        self.options.precision = digits;
        self
    }

    /// Returns the options collected so far.
    pub fn options(&self) -> &InjectOptions {
        &self.options
    }

    /// Validates the options and binds them to `table`.
    pub fn build(self, table: &AnnotationTable) -> Result<AnnotationInjector<'_>> {
        AnnotationInjector::with_options(table, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::MAX_TOKEN_SIZE;

    #[test]
    fn defaults_are_valid() {
        let options = InjectOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.buffer_capacity, 4 * 1024 * 1024);
        assert_eq!(options.default_page_size, (612.0, 792.0));
        assert!(options.overlap >= MAX_TOKEN_SIZE - 1);
    }

    #[test]
    fn accepts_the_bounds() {
        let options = InjectOptions {
            buffer_capacity: MAX_BUFFER_SIZE,
            overlap: MIN_OVERLAP,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            InjectOptions {
                buffer_capacity: 0,
                ..Default::default()
            },
            InjectOptions {
                overlap: MIN_OVERLAP - 1,
                ..Default::default()
            },
            InjectOptions {
                buffer_capacity: usize::MAX,
                ..Default::default()
            },
            InjectOptions {
                buffer_capacity: MAX_BUFFER_SIZE + 1,
                ..Default::default()
            },
            InjectOptions {
                overlap: usize::MAX,
                ..Default::default()
            },
            InjectOptions {
                precision: 13,
                ..Default::default()
            },
            InjectOptions {
                default_page_size: (612.0, 0.0),
                ..Default::default()
            },
        ];
        for options in bad {
            assert!(matches!(
                options.validate(),
                Err(PsMarkError::InvalidOptions(_))
            ));
        }
    }

    #[test]
    fn builder_collects_options() {
        let builder = InjectorBuilder::new()
            .buffer_capacity(128)
            .overlap(128)
            .default_page_size(595.0, 842.0)
            .first_page_number(1)
            .precision(2);
        assert_eq!(
            builder.options(),
            &InjectOptions {
                buffer_capacity: 128,
                overlap: 128,
                default_page_size: (595.0, 842.0),
                first_page_number: 1,
                precision: 2,
            }
        );
        assert!(builder.build(&AnnotationTable::default()).is_ok());
    }
}
