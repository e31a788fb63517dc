//! Uploaded files, detected file types and indexed chunks

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document (text layer, OCR fallback per page)
    Pdf,
    /// Plain text file
    Txt,
    /// Image (OCR) - requires tesseract
    Image,
    /// Anything else
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" => Self::Txt,
            "png" | "jpg" | "jpeg" | "bmp" | "tiff" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a file name, using the text after the last `.`
    pub fn from_filename(filename: &str) -> Self {
        Self::from_extension(&extension_of(filename))
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get required tools for this file type
    pub fn required_tools(&self) -> Option<&str> {
        match self {
            Self::Image => Some("tesseract OCR (apt install tesseract-ocr tesseract-ocr-spa)"),
            Self::Pdf => Some("poppler-utils (pdftoppm) and tesseract for scanned pages"),
            _ => None,
        }
    }
}

/// Lowercased text after the last `.` of a file name (the whole name if there is no dot)
pub fn extension_of(filename: &str) -> String {
    filename.rsplit('.').next().unwrap_or("").to_lowercase()
}

/// Base name of an uploaded file, without any client-supplied directories
pub fn base_name(filename: &str) -> String {
    let unix = filename.rsplit('/').next().unwrap_or(filename);
    let name = unix.rsplit('\\').next().unwrap_or(unix);
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// A file submitted for ingestion
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name
    pub name: String,
    /// Raw file content
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Create a new uploaded file
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// A chunk of document text, stored at the same position as its vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Cleaned chunk text
    pub text: String,
    /// Originating file name
    pub source: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_filename("report.PDF"), FileType::Pdf);
        assert_eq!(FileType::from_filename("notes.txt"), FileType::Txt);
        assert_eq!(FileType::from_filename("scan.final.jpeg"), FileType::Image);
        assert_eq!(FileType::from_filename("page.tiff"), FileType::Image);
        assert_eq!(FileType::from_filename("letter.docx"), FileType::Unknown);
        assert_eq!(FileType::from_filename("README"), FileType::Unknown);
        assert!(!FileType::Unknown.is_supported());
    }

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name("uploads/2024/report.pdf"), "report.pdf");
        assert_eq!(base_name("C:\\Users\\ana\\notas.txt"), "notas.txt");
        assert_eq!(base_name("plain.txt"), "plain.txt");
    }
}
