//! Transcript text extraction
//!
//! Meeting transcripts arrive as Word documents, PDFs or plain text. Each is
//! flattened to a single string for the extraction prompt.

use std::path::Path;

/// Transcript formats, detected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Docx,
    Pdf,
    PlainText,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Unsupported transcript format: {0} (expected .docx, .pdf, .txt or .md)")]
    UnsupportedFormat(String),
    #[error("Failed to read transcript: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to extract transcript text: {0}")]
    ExtractionFailed(String),
}

impl TranscriptFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "docx" => Some(TranscriptFormat::Docx),
            "pdf" => Some(TranscriptFormat::Pdf),
            "txt" | "md" | "text" => Some(TranscriptFormat::PlainText),
            _ => None,
        }
    }
}

/// Read a transcript file as plain text
pub fn extract_text(path: &Path) -> Result<String, TranscriptError> {
    let format = TranscriptFormat::detect(path).ok_or_else(|| {
        TranscriptError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e))
                .unwrap_or_else(|| "no extension".to_string()),
        )
    })?;

    match format {
        TranscriptFormat::Docx => extract_docx(path),
        TranscriptFormat::Pdf => extract_pdf(path),
        TranscriptFormat::PlainText => extract_plaintext(path),
    }
}

fn extract_plaintext(path: &Path) -> Result<String, TranscriptError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn extract_pdf(path: &Path) -> Result<String, TranscriptError> {
    // pdf-extract can panic on malformed files
    let path_buf = path.to_path_buf();
    match std::panic::catch_unwind(move || pdf_extract::extract_text(&path_buf)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(TranscriptError::ExtractionFailed(format!("PDF: {}", e))),
        Err(_) => Err(TranscriptError::ExtractionFailed(
            "PDF extraction panicked (malformed file)".to_string(),
        )),
    }
}

/// Paragraph text of a `.docx`, one paragraph per line
fn extract_docx(path: &Path) -> Result<String, TranscriptError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| TranscriptError::ExtractionFailed(format!("DOCX zip: {}", e)))?;
    let document = archive
        .by_name("word/document.xml")
        .map_err(|e| TranscriptError::ExtractionFailed(format!("DOCX missing document.xml: {}", e)))?;

    docx_paragraphs(std::io::BufReader::new(document))
}

fn docx_paragraphs<R: std::io::BufRead>(source: R) -> Result<String, TranscriptError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => current.push('\t'),
                b"br" => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                if let Ok(s) = e.unescape() {
                    current.push_str(&s);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TranscriptError::ExtractionFailed(format!("DOCX XML: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}
