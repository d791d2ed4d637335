use serde_json::json;

use crate::feed::{MarkupError, XmlBuilder, XmlBuilderOptions};

fn compact() -> XmlBuilder {
    XmlBuilder::new(XmlBuilderOptions::default().with_format(false))
}

#[test]
fn renders_scalar_children_compact() {
    let out = compact()
        .build(&json!({"entry": {"Id": "1", "Title": "A"}}))
        .unwrap();
    assert_eq!(out, "<entry><Id>1</Id><Title>A</Title></entry>");
}

#[test]
fn renders_pretty_by_default() {
    let builder = XmlBuilder::default();
    let out = builder
        .build(&json!({"entry": {"Id": "1", "Title": "A"}}))
        .unwrap();
    assert_eq!(out, "<entry>\n  <Id>1</Id>\n  <Title>A</Title>\n</entry>\n");
}

#[test]
fn renders_nested_objects_with_indentation() {
    let builder = XmlBuilder::default();
    let out = builder
        .build(&json!({"root": {"child": {"x": "1"}}}))
        .unwrap();
    assert_eq!(out, "<root>\n  <child>\n    <x>1</x>\n  </child>\n</root>\n");
}

#[test]
fn prefixed_keys_become_attributes() {
    let out = compact()
        .build(&json!({"item": {"@_id": "7", "name": "x"}}))
        .unwrap();
    assert_eq!(out, r#"<item id="7"><name>x</name></item>"#);
}

#[test]
fn attribute_only_element_self_closes() {
    let out = compact().build(&json!({"item": {"@_id": "7"}})).unwrap();
    assert_eq!(out, r#"<item id="7"/>"#);
}

#[test]
fn ignore_attributes_renders_prefixed_keys_as_children() {
    let builder = XmlBuilder::new(
        XmlBuilderOptions::default()
            .with_format(false)
            .with_ignore_attributes(true),
    );
    let out = builder.build(&json!({"item": {"@_id": "7"}})).unwrap();
    assert_eq!(out, "<item><@_id>7</@_id></item>");
}

#[test]
fn text_node_key_becomes_element_text() {
    let out = compact()
        .build(&json!({"a": {"@_x": "1", "#text": "hello"}}))
        .unwrap();
    assert_eq!(out, r#"<a x="1">hello</a>"#);
}

#[test]
fn cdata_key_is_emitted_unescaped() {
    let out = compact()
        .build(&json!({"a": {"__cdata": "<b>raw & loud</b>"}}))
        .unwrap();
    assert_eq!(out, "<a><![CDATA[<b>raw & loud</b>]]></a>");
}

#[test]
fn arrays_repeat_the_element() {
    let out = compact().build(&json!({"k": ["1", "2"]})).unwrap();
    assert_eq!(out, "<k>1</k><k>2</k>");
}

#[test]
fn text_and_attributes_are_escaped() {
    let out = compact()
        .build(&json!({"a": {"@_q": "x<y", "#text": "a & b"}}))
        .unwrap();
    assert_eq!(out, r#"<a q="x&lt;y">a &amp; b</a>"#);
}

#[test]
fn null_and_empty_objects_self_close() {
    assert_eq!(compact().build(&json!({"a": null})).unwrap(), "<a/>");
    assert_eq!(compact().build(&json!({"a": {}})).unwrap(), "<a/>");
}

#[test]
fn numbers_and_booleans_render_as_text() {
    let out = compact()
        .build(&json!({"a": {"n": 42, "b": true}}))
        .unwrap();
    assert_eq!(out, "<a><n>42</n><b>true</b></a>");
}

#[test]
fn custom_conventions_are_honored() {
    let builder = XmlBuilder::new(
        XmlBuilderOptions::default()
            .with_format(false)
            .with_attribute_prefix("$")
            .with_text_node_name("_")
            .with_cdata_prop_name("raw"),
    );
    let out = builder
        .build(&json!({"a": {"$id": "1", "_": "t", "raw": "<x/>"}}))
        .unwrap();
    assert_eq!(out, r#"<a id="1">t<![CDATA[<x/>]]></a>"#);
}

#[test]
fn non_object_top_level_is_rejected() {
    let err = compact().build(&json!("scalar")).unwrap_err();
    assert!(matches!(err, MarkupError::Unrepresentable(_)));
}

#[test]
fn non_scalar_attribute_is_rejected() {
    let err = compact()
        .build(&json!({"a": {"@_x": {"nested": true}}}))
        .unwrap_err();
    assert!(matches!(err, MarkupError::Unrepresentable(_)));
}
