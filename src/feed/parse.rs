//! Streaming feed parser.
//!
//! Collects RSS `<item>` elements (no namespace, any depth) and Atom `<entry>`
//! elements in one pass. Sub-fields are read from direct children only; the
//! first occurrence of a field wins.

use super::types::RawItem;
use anyhow::{bail, Result};
use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

pub const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";

/// Items discovered in one feed document.
#[derive(Debug, Default)]
pub struct FeedDocument {
    pub items: Vec<RawItem>,
    pub entries: Vec<RawItem>,
}

impl FeedDocument {
    /// RSS items in document order; Atom entries only when there are none.
    pub fn into_items(self) -> Vec<RawItem> {
        if self.items.is_empty() {
            self.entries
        } else {
            self.items
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Rss,
    Atom,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    Description,
    Content,
    Published,
    Updated,
}

#[derive(Default)]
struct ItemBuilder {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    content: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

impl ItemBuilder {
    fn set(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
            Field::Content => &mut self.content,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn build(self) -> RawItem {
        RawItem {
            title: self.title,
            link: self.link,
            description: self.description.or(self.content),
            pub_date: self.published.or(self.updated),
        }
    }
}

struct OpenItem {
    kind: Kind,
    depth: usize,
    builder: ItemBuilder,
}

impl OpenItem {
    /// Atom links carry the URL in `href`; only `rel="alternate"` (or no rel) counts.
    fn take_atom_link(&mut self, e: &BytesStart, decoder: Decoder) {
        if self.builder.link.is_some() {
            return;
        }
        let mut href = None;
        let mut rel = None;
        for attr in e.attributes().flatten() {
            let raw = decode_lossy(decoder, &attr.value);
            let value = Some(unescape(&raw).map(|v| v.into_owned()).unwrap_or(raw));
            match attr.key.local_name().as_ref() {
                b"href" => href = value,
                b"rel" => rel = value,
                _ => {}
            }
        }
        if rel.as_deref().is_none_or(|r| r == "alternate") {
            self.builder.link = href;
        }
    }
}

struct OpenField {
    field: Field,
    depth: usize,
    text: String,
}

/// Text in the document's declared encoding; bytes that don't decode become U+FFFD.
fn decode_lossy(decoder: Decoder, bytes: &[u8]) -> String {
    match decoder.decode(bytes) {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn is_atom(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(n)) if *n == ATOM_NS)
}

fn item_kind(ns: &ResolveResult, local: &[u8]) -> Option<Kind> {
    match (ns, local) {
        (ResolveResult::Unbound, b"item") => Some(Kind::Rss),
        (ns, b"entry") if is_atom(ns) => Some(Kind::Atom),
        _ => None,
    }
}

fn field_for(kind: Kind, ns: &ResolveResult, local: &[u8]) -> Option<Field> {
    match kind {
        Kind::Rss if matches!(ns, ResolveResult::Unbound) => match local {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" => Some(Field::Description),
            b"pubDate" => Some(Field::Published),
            _ => None,
        },
        Kind::Atom if is_atom(ns) => match local {
            b"title" => Some(Field::Title),
            b"summary" => Some(Field::Description),
            b"content" => Some(Field::Content),
            b"published" => Some(Field::Published),
            b"updated" => Some(Field::Updated),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a feed body. Fails on malformed XML or when there is no root element.
pub fn parse_feed(xml: &[u8]) -> Result<FeedDocument> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();

    let mut doc = FeedDocument::default();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut open: Option<OpenItem> = None;
    let mut field: Option<OpenField> = None;

    loop {
        // Tracks the encoding from the XML declaration once it has been read.
        let decoder = reader.decoder();
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                depth += 1;
                saw_root = true;
                let local = e.local_name();
                match open.as_mut() {
                    None => {
                        if let Some(kind) = item_kind(&ns, local.as_ref()) {
                            open = Some(OpenItem {
                                kind,
                                depth,
                                builder: ItemBuilder::default(),
                            });
                        }
                    }
                    Some(item) if depth == item.depth + 1 && field.is_none() => {
                        if item.kind == Kind::Atom && is_atom(&ns) && local.as_ref() == b"link" {
                            item.take_atom_link(&e, decoder);
                        }
                        if let Some(f) = field_for(item.kind, &ns, local.as_ref()) {
                            field = Some(OpenField {
                                field: f,
                                depth,
                                text: String::new(),
                            });
                        }
                    }
                    Some(_) => {}
                }
            }
            Ok((ns, Event::Empty(e))) => {
                saw_root = true;
                let local = e.local_name();
                match open.as_mut() {
                    None => {
                        if let Some(kind) = item_kind(&ns, local.as_ref()) {
                            let raw = RawItem::default();
                            match kind {
                                Kind::Rss => doc.items.push(raw),
                                Kind::Atom => doc.entries.push(raw),
                            }
                        }
                    }
                    Some(item) if depth == item.depth => {
                        if item.kind == Kind::Atom && is_atom(&ns) && local.as_ref() == b"link" {
                            item.take_atom_link(&e, decoder);
                        }
                    }
                    Some(_) => {}
                }
            }
            Ok((_, Event::Text(e))) => {
                if let Some(f) = field.as_mut().filter(|f| f.depth == depth) {
                    match e.unescape() {
                        Ok(text) => f.text.push_str(&text),
                        Err(_) => f.text.push_str(&decode_lossy(decoder, &e)),
                    }
                }
            }
            Ok((_, Event::CData(e))) => {
                if let Some(f) = field.as_mut().filter(|f| f.depth == depth) {
                    f.text.push_str(&decode_lossy(decoder, &e));
                }
            }
            Ok((_, Event::End(_))) => {
                if let Some(done) = field.take_if(|f| f.depth == depth) {
                    if let Some(item) = open.as_mut() {
                        item.builder.set(done.field, done.text);
                    }
                }
                if let Some(item) = open.take_if(|i| i.depth == depth) {
                    let raw = item.builder.build();
                    match item.kind {
                        Kind::Rss => doc.items.push(raw),
                        Kind::Atom => doc.entries.push(raw),
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => bail!("malformed feed XML: {}", e),
        }
        buf.clear();
    }

    if !saw_root {
        bail!("malformed feed XML: no element found");
    }
    if depth != 0 {
        bail!("malformed feed XML: document ended with {} unclosed element(s)", depth);
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Channel title is not an item</title>
    <item>
      <title>First &amp; foremost</title>
      <link>https://example.com/1</link>
      <description><![CDATA[<p>Body <b>one</b></p>]]></description>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <media:title>namespaced title is ignored</media:title>
    </item>
    <item>
      <title>Second</title>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom feed</title>
  <entry>
    <title>Atom entry</title>
    <link rel="self" href="https://example.com/self"/>
    <link href="https://example.com/entry"/>
    <updated>2024-01-02T00:00:00Z</updated>
    <content type="html">&lt;p&gt;full text&lt;/p&gt;</content>
  </entry>
</feed>"#;

    #[test]
    fn test_rss_items_in_document_order() {
        let items = parse_feed(RSS.as_bytes()).unwrap().into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("First & foremost"));
        assert_eq!(items[0].link.as_deref(), Some("https://example.com/1"));
        assert_eq!(items[0].description.as_deref(), Some("<p>Body <b>one</b></p>"));
        assert_eq!(items[0].pub_date.as_deref(), Some("Mon, 01 Jan 2024 00:00:00 GMT"));
        assert_eq!(items[1].title.as_deref(), Some("Second"));
        assert_eq!(items[1].description, None);
    }

    #[test]
    fn test_atom_fallback() {
        let items = parse_feed(ATOM.as_bytes()).unwrap().into_items();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title.as_deref(), Some("Atom entry"));
        assert_eq!(item.link.as_deref(), Some("https://example.com/entry"));
        assert_eq!(item.description.as_deref(), Some("<p>full text</p>"));
        assert_eq!(item.pub_date.as_deref(), Some("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn test_rss_items_take_priority_over_entries() {
        let xml = r#"<root xmlns:a="http://www.w3.org/2005/Atom">
            <a:entry><a:title>entry</a:title></a:entry>
            <item><title>item</title></item>
        </root>"#;
        let items = parse_feed(xml.as_bytes()).unwrap().into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("item"));
    }

    #[test]
    fn test_entry_outside_atom_namespace_ignored() {
        let xml = "<feed><entry><title>plain</title></entry></feed>";
        assert!(parse_feed(xml.as_bytes()).unwrap().into_items().is_empty());
    }

    #[test]
    fn test_first_field_occurrence_wins() {
        let xml = "<rss><item><title>one</title><title>two</title></item></rss>";
        let items = parse_feed(xml.as_bytes()).unwrap().into_items();
        assert_eq!(items[0].title.as_deref(), Some("one"));
    }

    #[test]
    fn test_nested_elements_do_not_leak_into_fields() {
        let xml = "<rss><item><title>t</title><source><title>nested</title></source>\
                   <description><p>markup</p></description></item></rss>";
        let items = parse_feed(xml.as_bytes()).unwrap().into_items();
        assert_eq!(items[0].title.as_deref(), Some("t"));
        assert_eq!(items[0].description.as_deref(), Some(""));
    }

    #[test]
    fn test_self_closing_item_counts() {
        let xml = "<rss><channel><item/><item><title>x</title></item></channel></rss>";
        let items = parse_feed(xml.as_bytes()).unwrap().into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], RawItem::default());
    }

    #[test]
    fn test_declared_single_byte_encoding() {
        let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
            <rss><channel><item><title>Caf\xE9 breach</title>\
            <description><![CDATA[Se\xF1or \xABpatch\xBB]]></description></item></channel></rss>";
        let items = parse_feed(xml).unwrap().into_items();
        assert_eq!(items[0].title.as_deref(), Some("Café breach"));
        assert_eq!(items[0].description.as_deref(), Some("Señor «patch»"));
    }

    #[test]
    fn test_declared_encoding_applies_to_atom_href() {
        let xml = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?>\
            <feed xmlns=\"http://www.w3.org/2005/Atom\"><entry><title>\x93quoted\x94</title>\
            <link href=\"https://example.com/caf\xE9?a=1&amp;b=2\"/></entry></feed>";
        let items = parse_feed(xml).unwrap().into_items();
        assert_eq!(items[0].title.as_deref(), Some("\u{201c}quoted\u{201d}"));
        assert_eq!(items[0].link.as_deref(), Some("https://example.com/café?a=1&b=2"));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(parse_feed(b"<rss><channel><item></channel></rss>").is_err());
        assert!(parse_feed(b"<rss><channel>").is_err());
        assert!(parse_feed(b"not xml at all").is_err());
        assert!(parse_feed(b"").is_err());
    }
}
