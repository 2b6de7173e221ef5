//! Per-page annotation records supplied alongside the PostScript stream.
//!
//! The table is decoded from a JSON object keyed by page number:
//!
//! ```json
//! {
//!   "0": {
//!     "mediabox": [0, 0, 612, 792],
//!     "urls": [{"uri": "https://example.com", "data": "/URI (https://example.com)", "rect": [72, 700, 200, 720]}],
//!     "bookmarks": []
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use serde::Deserialize;

use crate::error::{PsMarkError, Result};
use crate::geometry::Rect;

/// One link or bookmark target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnnotationRecord {
    /// Target URI of the annotation.
    #[serde(rename = "uri", default)]
    pub target_uri: String,
    /// PostScript fragment written verbatim after the opening `[` of the pdfmark.
    #[serde(rename = "data", default)]
    pub display_text: String,
    /// Rectangle in the coordinate space of the owning page's media box.
    pub rect: Rect,
}

/// Annotations attached to a single page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageRecord {
    #[serde(rename = "mediabox")]
    pub media_box: Rect,
    #[serde(rename = "urls", default)]
    pub links: Vec<AnnotationRecord>,
    #[serde(default)]
    pub bookmarks: Vec<AnnotationRecord>,
}

/// Read-only mapping from page number to its annotations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTable {
    pages: HashMap<u32, PageRecord>,
}

impl AnnotationTable {
    /// Build a table from already-decoded page records.
    pub fn from_pages(pages: impl IntoIterator<Item = (u32, PageRecord)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }

    /// Decode a table from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, PageRecord> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Decode a table from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: BTreeMap<String, PageRecord> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: BTreeMap<String, PageRecord>) -> Result<Self> {
        let pages = raw
            .into_iter()
            .map(|(key, page)| Ok((parse_page_key(&key)?, page)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { pages })
    }

    /// Annotations for `page_number`, if any.
    pub fn page(&self, page_number: u32) -> Option<&PageRecord> {
        self.pages.get(&page_number)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page numbers present in the table, ascending.
    pub fn page_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.pages.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }
}

/// Page keys are canonical decimals: no sign, padding or leading zeros.
fn parse_page_key(key: &str) -> Result<u32> {
    match key.parse::<u32>() {
        Ok(number) if number.to_string() == key => Ok(number),
        _ => Err(PsMarkError::AnnotationDecode(format!(
            "page key {key:?} is not a page number"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pages_and_defaults() {
        let table = AnnotationTable::from_json(
            r#"{
                "3": {"mediabox": [0, 0, 612, 792]},
                "0": {"mediabox": [0, 0, 100, 200],
                      "urls": [{"uri": "a", "data": "/URI (a)", "rect": [1, 2, 3, 4]}],
                      "bookmarks": [{"rect": [5, 6, 7, 8]}]}
            }"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.page_numbers(), vec![0, 3]);

        let first = table.page(0).unwrap();
        assert_eq!(first.media_box, [0.0, 0.0, 100.0, 200.0]);
        assert_eq!(first.links[0].target_uri, "a");
        assert_eq!(first.links[0].display_text, "/URI (a)");
        assert_eq!(first.bookmarks[0].display_text, "");
        assert!(table.page(3).unwrap().links.is_empty());
        assert!(table.page(1).is_none());
    }

    #[test]
    fn rejects_non_numeric_keys() {
        let err = AnnotationTable::from_json(r#"{"first": {"mediabox": [0, 0, 1, 1]}}"#)
            .unwrap_err();
        assert!(matches!(err, PsMarkError::AnnotationDecode(_)));
    }

    #[test]
    fn rejects_non_canonical_keys() {
        for key in ["+1", "01", " 1", "1 ", "-0", ""] {
            let json = format!(r#"{{"{key}": {{"mediabox": [0, 0, 1, 1]}}}}"#);
            let err = AnnotationTable::from_json(&json).unwrap_err();
            assert!(matches!(err, PsMarkError::AnnotationDecode(_)), "key {key:?}");
        }
        let table = AnnotationTable::from_json(r#"{"4294967295": {"mediabox": [0, 0, 1, 1]}}"#)
            .unwrap();
        assert_eq!(table.page_numbers(), vec![u32::MAX]);
    }

    #[test]
    fn rejects_wrong_rect_arity() {
        let err = AnnotationTable::from_json(
            r#"{"0": {"mediabox": [0, 0, 1, 1], "urls": [{"rect": [1, 2, 3]}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PsMarkError::AnnotationDecode(_)));

        let err = AnnotationTable::from_json(r#"{"0": {"mediabox": [0, 0, 1, 1, 5]}}"#)
            .unwrap_err();
        assert!(matches!(err, PsMarkError::AnnotationDecode(_)));
    }

    #[test]
    fn rejects_missing_media_box() {
        assert!(AnnotationTable::from_json(r#"{"0": {"urls": []}}"#).is_err());
    }
}
