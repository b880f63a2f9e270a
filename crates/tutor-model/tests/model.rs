//! Tests for tutorial definition loading.

use std::io::Write;

use tutor_model::{ModelError, TutorOptions, TutorialDefinition, load_tutorial};

const DEFINITION: &str = r#"{
  "steps": [
    {
      "label": "",
      "descFile": "steps/01/desc.html",
      "xmlFile": "steps/01/content.xml",
      "prefillFile": "",
      "editorLines": 3,
      "xpaths": [
        { "rule": "count(//mei:note) = 1", "hint": "Add exactly one note." },
        { "rule": "//mei:note/@pname = 'c'", "hint": "", "renderanyway": false }
      ]
    },
    {
      "label": "Rests",
      "xmlFile": "steps/02/content.xml",
      "prefillFile": "steps/02/prefill.xml",
      "xpaths": []
    }
  ],
  "outro": "<p>Done.</p>"
}"#;

#[test]
fn parses_definition_format() {
    let definition = TutorialDefinition::from_json_str(DEFINITION).expect("parse definition");
    assert_eq!(definition.len(), 2);
    assert_eq!(definition.outro, "<p>Done.</p>");

    let first = &definition.steps[0];
    assert_eq!(first.content_ref, "steps/01/content.xml");
    assert_eq!(first.description_ref.as_deref(), Some("steps/01/desc.html"));
    assert_eq!(first.prefill_ref, None, "empty prefill means no prefill");
    assert_eq!(first.editor_line_hint, Some(3));
    assert_eq!(first.rules.len(), 2);
    assert!(first.rules[0].render_anyway, "omitted renderanyway defaults to true");
    assert!(!first.rules[1].render_anyway);
    assert_eq!(first.rules[1].visible_hint(), None);

    let second = &definition.steps[1];
    assert_eq!(second.prefill_ref.as_deref(), Some("steps/02/prefill.xml"));
    assert_eq!(second.editor_line_hint, None);
    assert_eq!(definition.labels(), vec!["Step 1", "Rests"]);
}

#[test]
fn rejects_empty_tutorial() {
    let err = TutorialDefinition::from_json_str(r#"{"steps": [], "outro": ""}"#).unwrap_err();
    assert!(matches!(err, ModelError::NoSteps));
}

#[test]
fn rejects_empty_predicate() {
    let json = r#"{"steps": [{"xmlFile": "a.xml", "xpaths": [{"rule": "  "}]}]}"#;
    let err = TutorialDefinition::from_json_str(json).unwrap_err();
    assert!(matches!(
        err,
        ModelError::EmptyPredicate { step: 0, rule: 0 }
    ));
}

#[test]
fn rejects_missing_content_field() {
    let err = TutorialDefinition::from_json_str(r#"{"steps": [{"label": "x"}]}"#).unwrap_err();
    assert!(matches!(err, ModelError::Json(_)));
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(DEFINITION.as_bytes()).expect("write definition");
    let definition = load_tutorial(file.path()).expect("load definition");
    assert_eq!(definition.steps[1].label, "Rests");

    let missing = load_tutorial(&file.path().with_extension("missing")).unwrap_err();
    assert!(matches!(missing, ModelError::Io { .. }));
}

#[test]
fn options_deserialize_with_partial_toml() {
    let options: TutorOptions = toml::from_str(
        r#"
root_close_token = "</TEI>"
fetch_timeout_ms = 1500

[messages]
malformed = "Not well-formed."
"#,
    )
    .expect("parse options");
    assert_eq!(options.root_close_token, "</TEI>");
    assert_eq!(options.fetch_timeout_ms, Some(1500));
    assert_eq!(options.messages.malformed, "Not well-formed.");
    assert_eq!(options.messages.finished, "Finished successfully!");
    assert_eq!(options.markers.snippet.open, "<?snippet-start?>");
    assert_eq!(options.default_editor_lines, 5);
}
