//! Document classification and filename resolution.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Document types the crawler keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
    Xlsx,
    Xls,
    Csv,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::Pdf,
        DocumentKind::Docx,
        DocumentKind::Doc,
        DocumentKind::Xlsx,
        DocumentKind::Xls,
        DocumentKind::Csv,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Doc => "doc",
            DocumentKind::Xlsx => "xlsx",
            DocumentKind::Xls => "xls",
            DocumentKind::Csv => "csv",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }

    /// Maps a declared `Content-Type` to a document kind.
    ///
    /// Parameters such as `; charset=utf-8` are ignored and the comparison is
    /// case-insensitive, so the same essence always yields the same kind.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Some(DocumentKind::Pdf),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(DocumentKind::Xlsx)
            }
            "application/vnd.ms-excel" => Some(DocumentKind::Xls),
            "application/msword" => Some(DocumentKind::Doc),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentKind::Docx)
            }
            "text/csv" => Some(DocumentKind::Csv),
            _ => None,
        }
    }

    /// Kind of a filename, judged by its (case-insensitive) suffix.
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| lower.ends_with(&format!(".{}", kind.extension())))
    }
}

const ILLEGAL_FILENAME_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Stem used when neither the query nor the path carries a usable name.
const FALLBACK_STEM: &str = "document";

/// Returns true when the URL path ends in a recognized document extension.
pub fn is_document_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => DocumentKind::from_filename(parsed.path()).is_some(),
        // Not absolute; judge the raw text minus query and fragment.
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            DocumentKind::from_filename(path).is_some()
        }
    }
}

/// Replaces characters that are illegal in filesystem names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Picks the name a downloaded response is saved under.
///
/// Returns `None` when the final name is not a recognized document, in which
/// case the response is not written to disk.
pub fn resolve_filename(url: &Url, content_type: Option<&str>) -> Option<String> {
    let raw = url
        .query_pairs()
        .find(|(key, _)| key == "filename")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| last_path_segment(url));

    let mut filename = sanitize_filename(raw.trim());

    if let Some(kind) = bare_extension(&filename) {
        filename = format!("{}.{}", FALLBACK_STEM, kind.extension());
    }

    if Path::new(&filename).extension().is_none() {
        let kind = content_type.and_then(DocumentKind::from_content_type)?;
        if filename.starts_with('.') || filename.trim_matches('.').is_empty() {
            filename = FALLBACK_STEM.to_string();
        }
        filename = format!("{}.{}", filename.trim_end_matches('.'), kind.extension());
    }

    DocumentKind::from_filename(&filename).map(|_| filename)
}

/// Kind of a name that is only an extension, such as `.pdf`.
fn bare_extension(name: &str) -> Option<DocumentKind> {
    let ext = name.strip_prefix('.')?;
    if ext.contains('.') {
        return None;
    }
    DocumentKind::from_extension(ext)
}

/// Percent-decoded base name of the URL path.
fn last_path_segment(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
