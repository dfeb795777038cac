use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFeed {
    pub text: String,
    pub encoding_label: String,
}

/// Decode a raw feed payload into UTF-8 using: BOM -> XML declaration
/// charset -> chardetng fallback. Decoding is lossy, so a byte sequence that
/// is invalid for the detected encoding degrades to replacement characters
/// instead of failing the feed job.
pub fn decode_feed(bytes: &[u8]) -> DecodedFeed {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = xml_declared_encoding(bytes) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, encoding);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

/// Charset named by an `<?xml ... encoding="..."?>` declaration in the first
/// kilobyte, if any. The declaration itself is ASCII in every encoding this
/// tool can decode.
fn xml_declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    let start = head.find("<?xml")?;
    let end = head[start..].find("?>")? + start;
    let declaration = &head[start..end];

    let rest = declaration.split_once("encoding")?.1;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let close = value.find(quote)?;
    Some(value[..close].to_string())
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> DecodedFeed {
    let (text, actual, _had_errors) = encoding.decode(bytes);
    DecodedFeed {
        text: text.into_owned(),
        encoding_label: actual.name().to_string(),
    }
}
