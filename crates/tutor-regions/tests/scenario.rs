//! End-to-end splice scenario on a minimal document.

use tutor_model::TutorOptions;
use tutor_regions::{SnippetParts, extract_regions};

#[test]
fn minimal_document_scenario() {
    let document = "<?preview-start?>A<?snippet-start?>B<?snippet-end?>C<?preview-end?>D";
    let regions = extract_regions(document, &TutorOptions::default()).unwrap();
    assert_eq!(regions.prefix, "");
    assert_eq!(regions.gap_before, "A");
    assert_eq!(regions.core, "B");
    assert_eq!(regions.gap_after, "C");
    assert_eq!(regions.suffix, "D");

    let parts = SnippetParts::from_regions(&regions);
    assert_eq!(parts.initial_preview(""), "A\n\nC");
    assert_eq!(parts.validation.assemble(""), "ACD");

    assert_eq!(parts.validation.assemble("X"), "AXCD");
    let preview = parts.preview.assemble("X");
    assert_eq!(preview, "A\nX\nC");
    assert_eq!(preview.replace('\n', ""), "AXC");
}

#[test]
fn realistic_document_keeps_context_byte_identical() {
    let document = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<mei xmlns=\"http://www.music-encoding.org/ns/mei\">\n",
        "  <measure>\n",
        "    <?preview-start?>\n",
        "    <staff n=\"1\">\n",
        "      <layer>\n",
        "        <?snippet-start?><note pname=\"c\" oct=\"4\" dur=\"4\"/><?snippet-end?>\n",
        "      </layer>\n",
        "    </staff>\n",
        "    <?preview-end?>\n",
        "  </measure>\n",
        "</mei>\n",
    );
    let regions = extract_regions(document, &TutorOptions::default()).unwrap();
    assert_eq!(regions.core, "<note pname=\"c\" oct=\"4\" dur=\"4\"/>");

    let parts = SnippetParts::from_regions(&regions);
    assert_eq!(
        parts.initial_preview("<rest dur=\"4\"/>"),
        "<staff n=\"1\">\n      <layer>\n<rest dur=\"4\"/>\n</layer>\n    </staff>"
    );

    let rebuilt = parts.validation.assemble("<rest dur=\"4\"/>");
    assert!(rebuilt.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<mei"));
    assert!(rebuilt.contains("<layer>\n        <rest dur=\"4\"/>\n      </layer>"));
    assert!(rebuilt.ends_with("  </measure>\n</mei>\n"));
    assert!(!rebuilt.contains("<?preview"));
}
