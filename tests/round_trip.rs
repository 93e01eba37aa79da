use docx_delta::delta::{Delta, Op, ToDelta, ToDocx};
use docx_delta::ooxml::docx::{Package, ParagraphChild};
use docx_delta::Error;
use proptest::prelude::*;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn delta(value: serde_json::Value) -> Delta {
    serde_json::from_value(value).unwrap()
}

/// Convert to a package, write it out, read it back and convert back.
fn through_archive(delta: &Delta) -> Delta {
    let bytes = delta.to_docx().unwrap().to_bytes().unwrap();
    Package::from_bytes(&bytes).unwrap().to_delta().unwrap()
}

#[test]
fn heading_round_trip() {
    init_tracing();
    let original = delta(json!({
        "ops": [{"insert": "Title"}, {"insert": "\n", "attributes": {"header": 1}}]
    }));

    let package = original.to_docx().unwrap();
    let paragraphs: Vec<_> = package.document().paragraphs().collect();
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].style_id(), Some("Heading1"));
    assert_eq!(paragraphs[0].text(), "Title");

    assert_eq!(through_archive(&original), original);
}

#[test]
fn list_family_growth() {
    let original = delta(json!({"ops": [
        {"insert": "first"}, {"insert": "\n", "attributes": {"list": "ordered"}},
        {"insert": "second"}, {"insert": "\n", "attributes": {"list": "ordered"}},
        {"insert": "\nthird"}, {"insert": "\n", "attributes": {"list": "ordered"}}
    ]}));

    let package = original.to_docx().unwrap();
    let ids: Vec<u32> = package
        .document()
        .paragraphs()
        .map(|p| p.numbering().unwrap().num_id)
        .collect();
    assert_eq!(ids[0], ids[1]);
    assert!(ids[2] > ids[1]);
    assert_eq!(package.numbering().family_count(), 2);
}

#[test]
fn list_round_trip_through_archive() {
    let original = delta(json!({"ops": [
        {"insert": "milk"}, {"insert": "\n", "attributes": {"indent": 0, "list": "bullet"}},
        {"insert": "oat"}, {"insert": "\n", "attributes": {"indent": 1, "list": "bullet"}},
        {"insert": "plain"}
    ]}));
    assert_eq!(through_archive(&original), original);
}

#[test]
fn indent_bounds() {
    for indent in [0, 8] {
        let ok = delta(json!({"ops": [
            {"insert": "item"}, {"insert": "\n", "attributes": {"list": "bullet", "indent": indent}}
        ]}));
        assert!(ok.to_docx().is_ok(), "indent {indent} rejected");
    }
    for indent in [-1, 9] {
        let bad = delta(json!({"ops": [
            {"insert": "item"}, {"insert": "\n", "attributes": {"list": "bullet", "indent": indent}}
        ]}));
        assert!(matches!(
            bad.to_docx(),
            Err(Error::InvalidAttributeValue { attribute: "indent", .. })
        ));
    }
}

#[test]
fn color_casing() {
    let original = delta(json!({"ops": [{"insert": "pink", "attributes": {"color": "#ff00aa"}}]}));
    let package = original.to_docx().unwrap();
    let paragraph = package.document().paragraphs().next().unwrap();
    let ParagraphChild::Run(run) = &paragraph.children()[0] else {
        panic!("expected a run");
    };
    assert_eq!(run.properties().unwrap().color.as_deref(), Some("FF00AA"));
}

#[test]
fn hyperlink_round_trip() {
    let original = delta(json!({"ops": [
        {"insert": "see "},
        {"insert": "the docs", "attributes": {"link": "https://example.com/docs", "italic": true}}
    ]}));
    assert_eq!(through_archive(&original), original);
}

#[test]
fn mixed_document_json() {
    let json = br##"{"ops":[
        {"insert":"Shopping"},{"insert":"\n","attributes":{"header":2}},
        {"insert":"milk","attributes":{"bold":true,"underline":true}},
        {"insert":"\n","attributes":{"list":"ordered","indent":0}},
        {"insert":"done","attributes":{"color":"00AA00"}}
    ]}"##;
    let original = Delta::from_json(json).unwrap();
    let back = through_archive(&original);
    assert_eq!(back, original);
    assert_eq!(
        Delta::from_json(&back.to_json().unwrap()).unwrap(),
        original
    );
}

fn plain_op() -> impl Strategy<Value = Op> {
    (
        "[a-zA-Z0-9 .,!?']{1,24}",
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        proptest::option::of("[0-9A-F]{6}"),
    )
        .prop_map(|(text, bold, italic, underline, color)| {
            let mut op = Op::text(text);
            if bold {
                op = op.with_attr("bold", true);
            }
            if italic {
                op = op.with_attr("italic", true);
            }
            if underline {
                op = op.with_attr("underline", true);
            }
            if let Some(color) = color {
                op = op.with_attr("color", color);
            }
            op
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn plain_round_trip(ops in proptest::collection::vec(plain_op(), 0..12)) {
        let original: Delta = ops.into_iter().collect();
        prop_assert_eq!(through_archive(&original), original);
    }
}
