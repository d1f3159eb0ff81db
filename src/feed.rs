//! RSS 2.0 rendering for syndication listings.
//!
//! The feed items are the same formatted entries served by the JSON
//! syndication endpoint: newest additions first, tags as `<category>`.

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use reading_list_core::{Collection, FormattedEntry};

use crate::config::FeedConfig;

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

pub fn render_rss(feed: &FeedConfig, collection: Collection, entries: &[FormattedEntry]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    let link = feed.link.trim_end_matches('/');
    write_text_element(&mut writer, "title", &format!("{}: {}", feed.title, collection))?;
    write_text_element(&mut writer, "link", link)?;
    let description = feed
        .description
        .clone()
        .unwrap_or_else(|| format!("Recent {} entries", collection));
    write_text_element(&mut writer, "description", &description)?;
    if let Some(newest) = entries.iter().filter_map(|e| e.entry_added).max() {
        write_text_element(&mut writer, "lastBuildDate", &newest.to_rfc2822())?;
    }

    for entry in entries {
        write_item(&mut writer, link, collection, entry)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_item<W: Write>(
    writer: &mut Writer<W>,
    site_link: &str,
    collection: Collection,
    entry: &FormattedEntry,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;

    let title = entry
        .title
        .as_deref()
        .or(entry.work.as_deref())
        .unwrap_or("(untitled)");
    write_text_element(writer, "title", title)?;

    let link = match entry.extra_str("link") {
        Some(url) => url.to_string(),
        None => format!("{}/{}/{}", site_link, collection, entry.id),
    };
    write_text_element(writer, "link", &link)?;

    if let Some(summary) = &entry.summary {
        write_text_element(writer, "description", summary)?;
    }
    if let Some(author) = &entry.author {
        write_text_element(writer, "author", author)?;
    }
    for tag in &entry.tags {
        write_text_element(writer, "category", &tag.text)?;
    }

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    writer.write_event(Event::Start(guid))?;
    writer.write_event(Event::Text(BytesText::new(&entry.id)))?;
    writer.write_event(Event::End(BytesEnd::new("guid")))?;

    if let Some(added) = entry.entry_added {
        write_text_element(writer, "pubDate", &added.to_rfc2822())?;
    }

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reading_list_core::format::format_entry;
    use reading_list_core::ContentEntry;
    use serde_json::json;

    fn formatted(id: &str, title: &str, extra: serde_json::Value) -> FormattedEntry {
        let mut body = json!({
            "id": id,
            "title": title,
            "summary": "A <b>bold</b> & brave summary",
            "started": "2024-03-04",
            "entryAdded": "2024-03-05T08:00:00Z",
            "tags": ["AI"]
        });
        if let (Some(obj), Some(add)) = (body.as_object_mut(), extra.as_object()) {
            obj.extend(add.clone());
        }
        let entry: ContentEntry = serde_json::from_value(body).unwrap();
        format_entry(Collection::Shortform, &entry, &Default::default())
    }

    #[test]
    fn test_one_item_per_entry() {
        let entries = vec![
            formatted("a", "First", json!({})),
            formatted("b", "Second", json!({ "link": "https://example.com/second" })),
        ];
        let xml = render_rss(&FeedConfig::default(), Collection::Shortform, &entries).unwrap();
        assert_eq!(xml.matches("<item>").count(), 2);
        assert!(xml.contains("<rss version=\"2.0\">"));
        assert!(xml.contains("<link>http://localhost:7878/shortform/a</link>"));
        assert!(xml.contains("<link>https://example.com/second</link>"));
        assert!(xml.contains("<category>AI</category>"));
        assert!(xml.contains("<guid isPermaLink=\"false\">b</guid>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = render_rss(
            &FeedConfig::default(),
            Collection::Shortform,
            &[formatted("a", "Tom & Jerry", json!({}))],
        )
        .unwrap();
        assert!(xml.contains("Tom &amp; Jerry"));
        assert!(xml.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn test_empty_feed_has_channel() {
        let xml = render_rss(&FeedConfig::default(), Collection::Press, &[]).unwrap();
        assert!(xml.contains("<channel>"));
        assert!(!xml.contains("<item>"));
        assert!(!xml.contains("lastBuildDate"));
    }

    #[test]
    fn test_unstamped_entry_has_no_pub_date() {
        let mut entry = formatted("a", "First", json!({}));
        entry.entry_added = None;
        let xml = render_rss(&FeedConfig::default(), Collection::Shortform, &[entry]).unwrap();
        assert_eq!(xml.matches("<item>").count(), 1);
        assert!(!xml.contains("pubDate"));
        assert!(!xml.contains("lastBuildDate"));
    }
}
