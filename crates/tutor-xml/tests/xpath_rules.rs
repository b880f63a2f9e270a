//! Rule predicates as tutorial authors write them, against MEI fragments.

use tutor_xml::{XPathError, XPathEvaluator, XmlParseError, parse_document};

const MEI: &str = "http://www.music-encoding.org/ns/mei";

fn evaluator() -> XPathEvaluator {
    XPathEvaluator::new()
        .with_namespace("mei", MEI)
        .with_namespace("tei", "http://www.tei-c.org/ns/1.0")
}

fn check(document: &str, rule: &str) -> bool {
    let doc = parse_document(document).expect("fixture is well-formed");
    evaluator().evaluate(&doc, rule).expect("rule evaluates")
}

fn measure(notes: &str) -> String {
    format!(
        r#"<mei xmlns="{MEI}"><music><body><mdiv><score><section><measure n="1"><staff n="1"><layer n="1">{notes}</layer></staff></measure></section></score></mdiv></body></music></mei>"#
    )
}

#[test]
fn note_count_rules() {
    let doc = measure(r#"<note pname="c" oct="4" dur="4"/><note pname="d" oct="4" dur="4"/>"#);
    assert!(check(&doc, "count(//mei:note) = 2"));
    assert!(!check(&doc, "count(//mei:note) = 4"));
    assert!(check(&doc, "count(//mei:layer/mei:note) >= 1"));
}

#[test]
fn attribute_rules() {
    let doc = measure(r#"<note pname="c" oct="4" dur="4"/><note pname="d" oct="4" dur="8"/>"#);
    assert!(check(&doc, "//mei:note[1]/@pname = 'c'"));
    assert!(check(&doc, "//mei:note[2][@dur = '8']"));
    assert!(check(&doc, "not(//mei:note[@dur = '2'])"));
    assert!(check(&doc, "//mei:measure/@n = 1"));
}

#[test]
fn structural_rules() {
    let doc = measure(r#"<chord dur="2"><note pname="e" oct="4"/><note pname="g" oct="4"/></chord>"#);
    assert!(check(&doc, "count(//mei:chord/mei:note) = 2"));
    assert!(check(&doc, "//mei:note[@pname = 'g']/parent::mei:chord"));
    assert!(check(&doc, "//mei:note[@pname = 'e']/following-sibling::mei:note[@pname = 'g']"));
    assert!(check(&doc, "local-name(//mei:layer/*[1]) = 'chord'"));
}

#[test]
fn arithmetic_and_aggregate_rules() {
    let doc = measure(
        r#"<note pname="c" oct="4" dur="4"/><note pname="e" oct="4" dur="8"/><note pname="g" oct="5" dur="8"/><rest dur="4"/>"#,
    );
    assert!(check(&doc, "count(//mei:note) * 2 = 6"));
    assert!(check(&doc, "sum(//mei:note/@oct) div count(//mei:note) > 4"));
    assert!(check(&doc, "count(//mei:note[position() mod 2 = 1]) = 2"));
    assert!(check(&doc, "sum(//@dur) = 24"));
    assert!(check(&doc, "round(sum(//mei:note/@oct) div 3) = 4"));
    assert!(check(&doc, "name(/*) = 'mei'"));
    assert!(check(&doc, &format!("namespace-uri(//mei:rest) = '{MEI}'")));
}

#[test]
fn string_building_rules() {
    let doc = measure(r#"<note pname="c" accid="s" oct="4"/><note pname="b" accid="f" oct="3"/>"#);
    assert!(check(&doc, "concat(//mei:note[1]/@pname, //mei:note[1]/@accid, //mei:note[1]/@oct) = 'cs4'"));
    assert!(check(&doc, "translate(//mei:note[2]/@pname, 'abcdefg', 'ABCDEFG') = 'B'"));
    assert!(check(&doc, "substring-before(concat(//mei:note[2]/@pname, '/', //mei:note[2]/@oct), '/') = 'b'"));
    assert!(check(&doc, "substring(concat(//mei:note/@pname, 'major'), 2, 3) = 'maj'"));
    assert!(check(&doc, "//mei:note[@accid = 'f']/preceding::mei:note[1]/@pname = 'c'"));
}

#[test]
fn unprefixed_names_do_not_match_namespaced_elements() {
    let doc = measure(r#"<note pname="c"/>"#);
    assert!(!check(&doc, "//note"));
    assert!(check(&doc, "//*[local-name() = 'note']"));
}

#[test]
fn tei_namespace_is_available() {
    let doc = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body><p>Allegro</p></body></text></TEI>"#;
    assert!(check(doc, "normalize-space(//tei:p) = 'Allegro'"));
}

#[test]
fn rule_errors_are_reported() {
    let doc = parse_document(&measure("")).unwrap();
    assert!(matches!(
        evaluator().evaluate(&doc, "//foo:note"),
        Err(XPathError::UnknownPrefix(prefix)) if prefix == "foo"
    ));
    assert!(matches!(
        evaluator().evaluate(&doc, "count(//mei:note"),
        Err(XPathError::Syntax { .. })
    ));
}

#[test]
fn compiled_rules_are_reusable() {
    let compiled = evaluator().compile("count(//mei:note) > 0").unwrap();
    assert_eq!(compiled.source(), "count(//mei:note) > 0");

    let empty = parse_document(&measure("")).unwrap();
    let filled = parse_document(&measure(r#"<note pname="f"/>"#)).unwrap();
    assert!(!evaluator().evaluate_compiled(&empty, &compiled).unwrap().to_boolean());
    assert!(evaluator().evaluate_compiled(&filled, &compiled).unwrap().to_boolean());
}

#[test]
fn malformed_candidates_are_rejected_before_evaluation() {
    assert!(matches!(
        parse_document(r#"<mei xmlns="urn:x"><note></mei>"#),
        Err(XmlParseError::Syntax { .. } | XmlParseError::MismatchedTag { .. })
    ));
    assert!(matches!(
        parse_document("<a/><b/>"),
        Err(XmlParseError::MultipleRoots { .. })
    ));
}
