//! Text extraction from PDFs, plain text and images
//!
//! All methods block (PDF parsing, OCR subprocesses); async callers use
//! `spawn_blocking`.

use encoding_rs::Encoding;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::OcrConfig;
use crate::error::{Error, Result};
use crate::providers::OcrEngine;
use crate::types::document::{extension_of, FileType};

/// Encodings tried, in order, when a text file is not valid UTF-8
const LEGACY_ENCODINGS: [&str; 3] = ["latin1", "iso-8859-1", "cp1252"];

/// Extracts raw text from uploaded files
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Arc<dyn OcrEngine>,
    languages: String,
    min_page_chars: usize,
}

impl TextExtractor {
    /// Create a new extractor
    pub fn new(ocr: Arc<dyn OcrEngine>, config: &OcrConfig) -> Self {
        Self {
            ocr,
            languages: config.languages.clone(),
            min_page_chars: config.min_page_chars,
        }
    }

    /// Extract text from file contents, dispatching on the file name's extension
    pub fn extract(&self, filename: &str, data: &[u8]) -> Result<String> {
        match FileType::from_filename(filename) {
            FileType::Pdf => self.extract_pdf(filename, data),
            FileType::Txt => decode_text(filename, data),
            FileType::Image => Ok(self.extract_image(filename, data)),
            FileType::Unknown => Err(Error::UnsupportedFileType(extension_of(filename))),
        }
    }

    /// Per-page text layer, with OCR for pages that have too little text
    fn extract_pdf(&self, filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        tracing::info!("Extracting {} pages from {}", pages.len(), filename);

        let mut scratch: Option<(tempfile::TempDir, PathBuf)> = None;
        let mut texts = Vec::with_capacity(pages.len());

        for &page_number in pages.keys() {
            let direct = match doc.extract_text(&[page_number]) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    tracing::debug!("No text layer on page {} of {}: {}", page_number, filename, e);
                    String::new()
                }
            };

            let page_text = if direct.chars().count() < self.min_page_chars {
                tracing::info!(
                    "Page {} of {} has {} chars of text, running OCR",
                    page_number,
                    filename,
                    direct.chars().count()
                );
                match self.ocr_pdf_page(&mut scratch, data, page_number) {
                    Ok(text) => text.trim().to_string(),
                    Err(e) => {
                        tracing::warn!("OCR failed on page {} of {}: {}", page_number, filename, e);
                        direct
                    }
                }
            } else {
                direct
            };

            if !page_text.is_empty() {
                texts.push(page_text);
            }
        }

        Ok(texts.join("\n\n").trim().to_string())
    }

    fn ocr_pdf_page(
        &self,
        scratch: &mut Option<(tempfile::TempDir, PathBuf)>,
        data: &[u8],
        page_number: u32,
    ) -> Result<String> {
        if scratch.is_none() {
            let dir = tempfile::tempdir()?;
            let pdf_path = dir.path().join("document.pdf");
            std::fs::write(&pdf_path, data)?;
            *scratch = Some((dir, pdf_path));
        }

        let (dir, pdf_path) = scratch
            .as_ref()
            .ok_or_else(|| Error::internal("PDF scratch directory missing"))?;

        let image = self.ocr.render_pdf_page(pdf_path, page_number, dir.path())?;
        self.ocr.recognize(&image, &self.languages)
    }

    /// OCR an image; failures yield an empty string
    fn extract_image(&self, filename: &str, data: &[u8]) -> String {
        let result = (|| -> Result<String> {
            let dir = tempfile::tempdir()?;
            let path = dir.path().join(format!("image.{}", extension_of(filename)));
            std::fs::write(&path, data)?;
            self.ocr.recognize(&path, &self.languages)
        })();

        match result {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("OCR failed for image {}: {}", filename, e);
                String::new()
            }
        }
    }
}

/// Decode as UTF-8, falling back to legacy single-byte encodings
fn decode_text(filename: &str, data: &[u8]) -> Result<String> {
    if let Ok(text) = std::str::from_utf8(data) {
        return Ok(text.to_string());
    }

    for label in LEGACY_ENCODINGS {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(data) {
            tracing::debug!("Decoded {} as {}", filename, encoding.name());
            return Ok(text.into_owned());
        }
    }

    Err(Error::file_parse(
        filename,
        "Text is not valid UTF-8 or any supported legacy encoding",
    ))
}
