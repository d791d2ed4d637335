use serde_json::json;

use crate::feed::{DEFAULT_PROLOG, FeedOptions, MarkupError, XmlBuilderOptions, XmlFeed};
use crate::Record;

fn compact_options() -> FeedOptions {
    FeedOptions::new("entry")
        .with_header("<feed>")
        .with_footer("</feed>")
        .with_builder_options(XmlBuilderOptions::default().with_format(false))
}

fn record(id: &str) -> Record {
    let mut r = Record::new();
    r.push("Id", id);
    r
}

#[test]
fn first_push_carries_prolog_and_header() {
    let mut feed = XmlFeed::new(compact_options());

    let first = feed.push(record("1")).unwrap();
    assert_eq!(
        first,
        format!("{DEFAULT_PROLOG}\n<feed><entry><Id>1</Id></entry>")
    );

    let second = feed.push(record("2")).unwrap();
    assert_eq!(second, "<entry><Id>2</Id></entry>");

    let footer = feed.finish().unwrap();
    assert_eq!(footer, "</feed>");
    assert!(feed.is_finished());
}

#[test]
fn empty_feed_still_yields_a_complete_document() {
    let mut feed = XmlFeed::new(compact_options());
    let out = feed.finish().unwrap();
    assert_eq!(out, format!("{DEFAULT_PROLOG}\n<feed></feed>"));
}

#[test]
fn info_is_placed_between_header_and_first_record() {
    let options = compact_options().with_info(json!({"channel": {"title": "T"}}));
    let mut feed = XmlFeed::new(options);

    let first = feed.push(record("1")).unwrap();
    assert_eq!(
        first,
        format!(
            "{DEFAULT_PROLOG}\n<feed><channel><title>T</title></channel><entry><Id>1</Id></entry>"
        )
    );
}

#[test]
fn info_appears_on_empty_feed_too() {
    let options = compact_options().with_info(json!({"channel": {"title": "T"}}));
    let mut feed = XmlFeed::new(options);

    let out = feed.finish().unwrap();
    assert_eq!(
        out,
        format!("{DEFAULT_PROLOG}\n<feed><channel><title>T</title></channel></feed>")
    );
}

#[test]
fn empty_info_object_contributes_nothing() {
    let options = compact_options().with_info(json!({}));
    let mut feed = XmlFeed::new(options);

    let first = feed.push(record("1")).unwrap();
    assert_eq!(
        first,
        format!("{DEFAULT_PROLOG}\n<feed><entry><Id>1</Id></entry>")
    );
}

#[test]
fn empty_record_mid_stream_contributes_nothing() {
    let mut feed = XmlFeed::new(compact_options());
    feed.push(record("1")).unwrap();

    let fragment = feed.push(Record::new()).unwrap();
    assert_eq!(fragment, "");

    let next = feed.push(record("2")).unwrap();
    assert_eq!(next, "<entry><Id>2</Id></entry>");
}

#[test]
fn empty_first_record_still_emits_preamble() {
    let mut feed = XmlFeed::new(compact_options());

    let first = feed.push(Record::new()).unwrap();
    assert_eq!(first, format!("{DEFAULT_PROLOG}\n<feed>"));

    // the state advanced: the next record is a bare fragment
    let next = feed.push(record("1")).unwrap();
    assert_eq!(next, "<entry><Id>1</Id></entry>");
}

#[test]
fn custom_prolog_replaces_default() {
    let options = compact_options().with_prolog("<?xml version=\"1.1\"?>");
    let mut feed = XmlFeed::new(options);

    let first = feed.push(record("1")).unwrap();
    assert!(first.starts_with("<?xml version=\"1.1\"?>\n<feed>"));
}

#[test]
fn custom_markup_fn_replaces_builder_entirely() {
    let options = FeedOptions::new("entry")
        .with_header("<feed>")
        .with_footer("</feed>")
        .with_markup_fn(|value| Ok(format!("[{}]", value["entry"]["Id"].as_str().unwrap_or("?"))));
    let mut feed = XmlFeed::new(options);

    let first = feed.push(record("1")).unwrap();
    assert_eq!(first, format!("{DEFAULT_PROLOG}\n<feed>[1]"));
    assert_eq!(feed.push(record("2")).unwrap(), "[2]");
}

#[test]
fn finished_feed_rejects_further_use() {
    let mut feed = XmlFeed::new(compact_options());
    feed.push(record("1")).unwrap();
    feed.finish().unwrap();

    assert!(matches!(feed.push(record("2")), Err(MarkupError::Closed)));
    assert!(matches!(feed.finish(), Err(MarkupError::Closed)));
}
