use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::title::{display_title, source_link};

/// One mirrored feed as seen by the published index. Rebuilt from scratch
/// every run out of whatever sits under `xml/`; never stored incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "xml")]
    pub storage_path: String,
    #[serde(rename = "backupURL")]
    pub hosting_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Derive one entry per document under `<output_dir>/xml`, in sorted
/// filename order. A document that does not parse as a feed falls back to
/// its filename instead of failing the build; so does an unreadable file.
pub fn build_catalog(
    output_dir: &Path,
    hosting_base_url: Option<&str>,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    let xml_dir = output_dir.join("xml");
    if !xml_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<_> = fs::read_dir(&xml_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("xml"))
        .collect();
    files.sort_by_key(|e| e.file_name());

    let mut catalog = Vec::new();
    for entry in files {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("skipping unreadable document {file_name}: {err}");
                continue;
            }
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        let title = display_title(&text).unwrap_or_else(|| stem.clone());
        let source_url = source_link(&text).unwrap_or_default();

        catalog.push(CatalogEntry {
            title,
            source_url,
            storage_path: format!("xml/{file_name}"),
            hosting_url: hosting_base_url
                .map(|base| format!("{}/xml/{file_name}", base.trim_end_matches('/'))),
        });
    }
    Ok(catalog)
}

/// Pure templating step for the human-readable index.
pub fn render_readme(entries: &[CatalogEntry]) -> String {
    let mut buffer = String::new();
    buffer.push_str("# Mirrored feeds\n\n");
    if entries.is_empty() {
        buffer.push_str("No feeds mirrored yet.\n");
        return buffer;
    }
    buffer.push_str("Generated index of every feed currently mirrored. Rewritten on each run.\n\n");
    for entry in entries {
        let target = entry
            .hosting_url
            .as_deref()
            .unwrap_or(entry.storage_path.as_str());
        buffer.push_str(&format!("- [{}]({target})", entry.title));
        if !entry.source_url.is_empty() {
            buffer.push_str(&format!(" (mirrored from <{}>)", entry.source_url));
        }
        buffer.push('\n');
    }
    buffer
}

/// Fully rewrite `feed_list.json` and `README.md` from the given entries.
pub fn write_catalog_artifacts(
    output_dir: &Path,
    entries: &[CatalogEntry],
) -> Result<(), CatalogError> {
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    let json = serde_json::to_string_pretty(entries)?;
    writer.write("feed_list.json", &json)?;
    writer.write("README.md", &render_readme(entries))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_readme, CatalogEntry};

    fn entry(title: &str) -> CatalogEntry {
        CatalogEntry {
            title: title.to_string(),
            source_url: "https://blog.example.com/rss".to_string(),
            storage_path: format!("xml/{title}.xml"),
            hosting_url: Some(format!("https://mirror.example.net/xml/{title}.xml")),
        }
    }

    #[test]
    fn readme_lists_every_entry() {
        let readme = render_readme(&[entry("A"), entry("B")]);
        assert!(readme.contains("[A](https://mirror.example.net/xml/A.xml)"));
        assert!(readme.contains("[B](https://mirror.example.net/xml/B.xml)"));
        assert!(readme.contains("(mirrored from <https://blog.example.com/rss>)"));
    }

    #[test]
    fn readme_without_hosting_links_to_local_path() {
        let mut e = entry("A");
        e.hosting_url = None;
        assert!(render_readme(&[e]).contains("[A](xml/A.xml)"));
    }

    #[test]
    fn empty_catalog_still_renders() {
        assert!(render_readme(&[]).contains("No feeds mirrored yet."));
    }
}
