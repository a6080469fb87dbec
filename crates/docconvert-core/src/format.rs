//! Display helpers for selected files

use serde::Serialize;

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// Icon bucket derived from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    Pdf,
    Ebook,
    Text,
    Generic,
}

impl FileKind {
    /// Classify a file by the text after its last dot, case-insensitively
    pub fn from_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => FileKind::Pdf,
            "epub" | "mobi" | "azw" | "azw3" => FileKind::Ebook,
            "doc" | "docx" | "txt" | "rtf" => FileKind::Text,
            _ => FileKind::Generic,
        }
    }

    /// Bootstrap icon class
    pub fn icon(self) -> &'static str {
        match self {
            FileKind::Pdf => "bi-file-earmark-pdf",
            FileKind::Ebook => "bi-book",
            FileKind::Text => "bi-file-earmark-text",
            FileKind::Generic => "bi-file-earmark",
        }
    }
}
