//! Marker lookup.

/// How the closing offsets of a [`MarkerBoundary`] were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAnchor {
    /// The closing marker was found.
    Marker,
    /// Fell back to just after the last root-closing token.
    RootClose,
    /// Neither the closing marker nor the root-closing token exists.
    Unresolved,
}

/// Byte offsets of a marker pair's opening and closing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerBoundary {
    pub open_start: usize,
    pub open_end: usize,
    pub close_start: usize,
    pub close_end: usize,
    pub close_anchor: CloseAnchor,
}

impl MarkerBoundary {
    pub fn new(open_start: usize, open_end: usize, close_start: usize, close_end: usize) -> Self {
        Self {
            open_start,
            open_end,
            close_start,
            close_end,
            close_anchor: CloseAnchor::Marker,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.close_anchor != CloseAnchor::Unresolved
    }
}

/// Locate the first opening and first closing token in `document`.
///
/// A missing opening token yields `open_start = open_end = 0`. A missing
/// closing token yields `close_start = close_end` just after the last
/// occurrence of `root_close_token`; if that is missing too, both sit at the
/// end of the document and the boundary is marked [`CloseAnchor::Unresolved`].
pub fn locate_marker(
    document: &str,
    open_token: &str,
    close_token: &str,
    root_close_token: &str,
) -> MarkerBoundary {
    let (open_start, open_end) = match document.find(open_token) {
        Some(index) => (index, index + open_token.len()),
        None => (0, 0),
    };

    let (close_start, close_end, close_anchor) = match document.find(close_token) {
        Some(index) => (index, index + close_token.len(), CloseAnchor::Marker),
        None => match document.rfind(root_close_token) {
            Some(index) => {
                let after_root = index + root_close_token.len();
                (after_root, after_root, CloseAnchor::RootClose)
            }
            None => (document.len(), document.len(), CloseAnchor::Unresolved),
        },
    };

    MarkerBoundary {
        open_start,
        open_end,
        close_start,
        close_end,
        close_anchor,
    }
}

/// [`locate_marker`] for a configured marker pair.
pub fn locate_pair(
    document: &str,
    pair: &tutor_model::MarkerPair,
    root_close_token: &str,
) -> MarkerBoundary {
    locate_marker(document, &pair.open, &pair.close, root_close_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_both_tokens() {
        let boundary = locate_marker("ab<s>cd</s>ef", "<s>", "</s>", "</root>");
        assert_eq!(boundary, MarkerBoundary::new(2, 5, 7, 11));
    }

    #[test]
    fn missing_open_defaults_to_start() {
        let boundary = locate_marker("abc</s>", "<s>", "</s>", "</root>");
        assert_eq!((boundary.open_start, boundary.open_end), (0, 0));
        assert_eq!((boundary.close_start, boundary.close_end), (3, 7));
    }

    #[test]
    fn missing_close_falls_back_after_last_root_close() {
        let document = "<root><s></root>x</root>tail";
        let boundary = locate_marker(document, "<s>", "</s>", "</root>");
        let expected = document.rfind("</root>").unwrap() + "</root>".len();
        assert_eq!(boundary.close_start, expected);
        assert_eq!(boundary.close_end, expected);
        assert_eq!(boundary.close_anchor, CloseAnchor::RootClose);
    }

    #[test]
    fn missing_everything_is_unresolved() {
        let boundary = locate_marker("plain", "<s>", "</s>", "</root>");
        assert_eq!(boundary.close_anchor, CloseAnchor::Unresolved);
        assert!(!boundary.is_resolved());
        assert_eq!(boundary.close_start, 5);
    }
}
