//! Marker-based region extraction and reassembly.
//!
//! A content asset carries two marker pairs: the snippet pair delimits the
//! learner-editable `core`, the preview pair delimits the wider context shown
//! next to the editor. [`locate_marker`] finds one pair, [`compute_regions`]
//! cuts the document into five contiguous regions, and [`SnippetParts`] turns
//! those regions into the splice points used on every edit.
//!
//! # Example
//!
//! ```
//! use tutor_model::TutorOptions;
//! use tutor_regions::{SnippetParts, extract_regions};
//!
//! let document = "<?preview-start?>A<?snippet-start?>B<?snippet-end?>C<?preview-end?>D";
//! let regions = extract_regions(document, &TutorOptions::default()).unwrap();
//! assert_eq!(regions.core, "B");
//!
//! let parts = SnippetParts::from_regions(&regions);
//! assert_eq!(parts.validation.assemble("X"), "AXCD");
//! assert_eq!(parts.preview.assemble("X"), "A\nX\nC");
//! ```

mod assemble;
mod boundary;
mod error;
mod regions;

pub use assemble::{PreviewParts, SnippetParts, ValidationParts};
pub use boundary::{CloseAnchor, MarkerBoundary, locate_marker, locate_pair};
pub use error::{RegionConfigError, Result};
pub use regions::{RegionSet, compute_regions, extract_regions, strip_markers};
