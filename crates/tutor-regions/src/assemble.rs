//! Splice points for the preview and validation documents.

use crate::regions::RegionSet;

/// Text shown around the editor content in the preview pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewParts {
    pub before: String,
    pub after: String,
}

impl PreviewParts {
    pub fn from_regions(regions: &RegionSet) -> Self {
        Self {
            before: format!("{}\n", regions.gap_before.trim()),
            after: format!("\n{}", regions.gap_after.trim()),
        }
    }

    pub fn assemble(&self, fragment: &str) -> String {
        splice(&self.before, fragment, &self.after)
    }
}

/// Text placed around the editor content to rebuild the full document.
///
/// Everything outside the edited fragment stays byte-identical to the source
/// asset (minus marker tokens).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationParts {
    pub before: String,
    pub after: String,
}

impl ValidationParts {
    pub fn from_regions(regions: &RegionSet) -> Self {
        Self {
            before: format!("{}{}", regions.prefix, regions.gap_before),
            after: format!("{}{}", regions.gap_after, regions.suffix),
        }
    }

    pub fn assemble(&self, fragment: &str) -> String {
        splice(&self.before, fragment, &self.after)
    }
}

/// Both splice-point pairs for one step, plus the original snippet content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetParts {
    pub preview: PreviewParts,
    pub validation: ValidationParts,
    pub core: String,
}

impl SnippetParts {
    pub fn from_regions(regions: &RegionSet) -> Self {
        Self {
            preview: PreviewParts::from_regions(regions),
            validation: ValidationParts::from_regions(regions),
            core: regions.core.clone(),
        }
    }

    /// Preview text shown before the learner types anything.
    pub fn initial_preview(&self, prefill: &str) -> String {
        self.preview.assemble(prefill)
    }

    /// The source document rebuilt with its original snippet content.
    pub fn original_document(&self) -> String {
        self.validation.assemble(&self.core)
    }
}

fn splice(before: &str, fragment: &str, after: &str) -> String {
    let mut text = String::with_capacity(before.len() + fragment.len() + after.len());
    text.push_str(before);
    text.push_str(fragment);
    text.push_str(after);
    text
}
