use feed_rs::parser;

/// Self-declared display title of a feed document, when the document parses
/// as RSS/Atom and the title is non-empty.
pub fn display_title(document: &str) -> Option<String> {
    let feed = parser::parse(document.as_bytes()).ok()?;
    feed.title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// URL the feed declares for itself: the `rel="self"` link when present,
/// otherwise the first declared link.
pub fn source_link(document: &str) -> Option<String> {
    let feed = parser::parse(document.as_bytes()).ok()?;
    feed.links
        .iter()
        .find(|link| link.rel.as_deref() == Some("self"))
        .or_else(|| feed.links.first())
        .map(|link| link.href.clone())
}

#[cfg(test)]
mod tests {
    use super::{display_title, source_link};

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Example Blog</title>
    <link>https://blog.example.com</link>
    <atom:link rel="self" href="https://blog.example.com/rss" />
    <description>d</description>
  </channel>
</rss>"#;

    #[test]
    fn rss_title_is_extracted() {
        assert_eq!(display_title(RSS).as_deref(), Some("Example Blog"));
    }

    #[test]
    fn self_link_is_preferred() {
        assert_eq!(
            source_link(RSS).as_deref(),
            Some("https://blog.example.com/rss")
        );
    }

    #[test]
    fn malformed_document_has_no_title() {
        assert_eq!(display_title("definitely not a feed"), None);
        assert_eq!(source_link("definitely not a feed"), None);
    }

    #[test]
    fn empty_title_is_treated_as_missing() {
        let doc = r#"<rss version="2.0"><channel><title>   </title></channel></rss>"#;
        assert_eq!(display_title(doc), None);
    }
}
