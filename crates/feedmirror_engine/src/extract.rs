/// Scan a document for absolute HTTP(S) URLs immediately enclosed by double
/// quotes, in first-seen order with duplicates preserved.
///
/// The document is treated as opaque text, never parsed as XML, so malformed
/// and nonstandard feed dialects still yield their URLs. A candidate that
/// contains whitespace, `<`, or `>` is rejected, and quotes inside a raw
/// markup tag do not open a match: feeds carry their rewriteable references
/// in entity-escaped HTML, where the quotes survive but the brackets do not.
/// Nothing is rejected for being malformed beyond that; a bad URL fails
/// softly at download time.
pub fn extract_urls(document: &str) -> Vec<String> {
    let bytes = document.as_bytes();
    let mut urls = Vec::new();
    let mut in_markup = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                in_markup = true;
                i += 1;
            }
            b'>' => {
                in_markup = false;
                i += 1;
            }
            b'"' if !in_markup => match quoted_url_end(document, i) {
                Some(end) => {
                    urls.push(document[i + 1..end].to_string());
                    i = end + 1;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    urls
}

/// Index of the closing quote when the span opening at `open` is a usable
/// absolute URL, `None` otherwise.
fn quoted_url_end(document: &str, open: usize) -> Option<usize> {
    let rest = &document[open + 1..];
    if !rest.starts_with("http://") && !rest.starts_with("https://") {
        return None;
    }
    let close = rest.find('"')?;
    let candidate = &rest[..close];
    if candidate.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
        return None;
    }
    Some(open + 1 + close)
}
