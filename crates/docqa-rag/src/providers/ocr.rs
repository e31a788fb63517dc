//! OCR via the tesseract and pdftoppm command line tools

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::OcrConfig;
use crate::error::{Error, Result};

/// Optical character recognition over image files
///
/// Calls are blocking; async callers run them on the blocking pool.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in an image, using `languages` (tesseract syntax, e.g. `spa+eng`)
    fn recognize(&self, image: &Path, languages: &str) -> Result<String>;

    /// Render one 1-based page of a PDF to an image inside `output_dir`
    fn render_pdf_page(&self, pdf: &Path, page: u32, output_dir: &Path) -> Result<PathBuf>;

    /// Get engine name for logging
    fn name(&self) -> &str;
}

/// OCR backed by `tesseract` (recognition) and `pdftoppm` (page rendering)
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    tesseract_bin: String,
    pdftoppm_bin: String,
    render_dpi: u32,
}

impl TesseractOcr {
    /// Create a new tesseract engine
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            tesseract_bin: config.tesseract_bin.clone(),
            pdftoppm_bin: config.pdftoppm_bin.clone(),
            render_dpi: config.render_dpi,
        }
    }

    /// Check if tesseract is installed
    pub fn has_tesseract(&self) -> bool {
        Command::new(&self.tesseract_bin)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Check if pdftoppm is installed
    pub fn has_pdftoppm(&self) -> bool {
        Command::new(&self.pdftoppm_bin)
            .arg("-v")
            .output()
            .map(|_| true) // pdftoppm -v prints to stderr, existence is enough
            .unwrap_or(false)
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(&OcrConfig::default())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &Path, languages: &str) -> Result<String> {
        let output = Command::new(&self.tesseract_bin)
            .arg(image)
            .arg("stdout")
            .args(["-l", languages])
            .output()
            .map_err(|e| Error::ocr(format!("Failed to run {}: {}", self.tesseract_bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ocr(format!("tesseract error: {}", stderr.trim())));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::debug!("OCR extracted {} characters from {}", text.len(), image.display());
        Ok(text)
    }

    fn render_pdf_page(&self, pdf: &Path, page: u32, output_dir: &Path) -> Result<PathBuf> {
        let prefix = output_dir.join(format!("page-{}", page));
        let page_arg = page.to_string();
        let dpi_arg = self.render_dpi.to_string();

        let output = Command::new(&self.pdftoppm_bin)
            .args(["-png", "-singlefile", "-r", &dpi_arg, "-f", &page_arg, "-l", &page_arg])
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| Error::ocr(format!("Failed to run {}: {}", self.pdftoppm_bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ocr(format!("pdftoppm error on page {}: {}", page, stderr.trim())));
        }

        let image = prefix.with_extension("png");
        if !image.exists() {
            return Err(Error::ocr(format!("pdftoppm produced no image for page {}", page)));
        }

        Ok(image)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
