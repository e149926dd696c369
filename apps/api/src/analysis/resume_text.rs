//! Resume text extraction from uploaded files.

use std::io::{Cursor, Read};

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

use crate::errors::AppError;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Main document part of a WordprocessingML package.
const DOCX_BODY: &str = "word/document.xml";

/// Formats accepted for resume uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    PlainText,
}

#[derive(Debug, Error)]
pub enum ResumeTextError {
    #[error("Only PDF, DOCX and plain-text resumes are supported (got '{0}')")]
    Unsupported(String),

    #[error("File size should not exceed {limit_mb}MB")]
    TooLarge { limit_mb: usize },

    #[error("Could not extract text from resume: {0}")]
    Unreadable(String),

    #[error("Could not extract text from resume. Please ensure the file contains readable text")]
    Empty,
}

impl From<ResumeTextError> for AppError {
    fn from(err: ResumeTextError) -> Self {
        match err {
            ResumeTextError::Unsupported(_) => AppError::UnsupportedMediaType(err.to_string()),
            ResumeTextError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ResumeTextError::Unreadable(_) | ResumeTextError::Empty => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

fn unreadable(err: impl std::fmt::Display) -> ResumeTextError {
    ResumeTextError::Unreadable(err.to_string())
}

/// Decides the format from the declared content type, falling back to the file extension.
///
/// Legacy binary `.doc` files are not accepted.
pub fn detect_format(file_name: &str, content_type: Option<&str>) -> Result<ResumeFormat, ResumeTextError> {
    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .unwrap_or_default();

    match mime.as_str() {
        "application/pdf" => return Ok(ResumeFormat::Pdf),
        DOCX_MIME => return Ok(ResumeFormat::Docx),
        "text/plain" => return Ok(ResumeFormat::PlainText),
        _ => {}
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(ResumeFormat::Pdf),
        "docx" => Ok(ResumeFormat::Docx),
        "txt" => Ok(ResumeFormat::PlainText),
        _ if mime.is_empty() => Err(ResumeTextError::Unsupported(file_name.to_string())),
        _ => Err(ResumeTextError::Unsupported(mime)),
    }
}

/// Extracts the text of an uploaded resume.
///
/// PDF and DOCX parsing is CPU-bound and runs on the blocking pool.
pub async fn extract_resume_text(
    data: Bytes,
    format: ResumeFormat,
    max_bytes: usize,
) -> Result<String, ResumeTextError> {
    if data.len() > max_bytes {
        return Err(ResumeTextError::TooLarge {
            limit_mb: max_bytes / (1024 * 1024),
        });
    }

    let text = match format {
        ResumeFormat::PlainText => String::from_utf8_lossy(&data).into_owned(),
        ResumeFormat::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data).map_err(unreadable)
        })
        .await
        .map_err(unreadable)??,
        ResumeFormat::Docx => tokio::task::spawn_blocking(move || docx_text(&data))
            .await
            .map_err(unreadable)??,
    };

    if text.trim().is_empty() {
        return Err(ResumeTextError::Empty);
    }

    debug!(chars = text.len(), ?format, "resume text extracted");
    Ok(text)
}

/// Reads the main document part out of a DOCX (zip) package.
fn docx_text(data: &[u8]) -> Result<String, ResumeTextError> {
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(unreadable)?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(unreadable)?
        .read_to_string(&mut xml)
        .map_err(unreadable)?;

    document_text(&xml)
}

/// Collects the `w:t` runs of `word/document.xml`, one line per paragraph.
/// Tabs and breaks inside a paragraph are kept.
fn document_text(xml: &str) -> Result<String, ResumeTextError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(unreadable)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_run_text = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_run_text => text.push_str(&e.unescape().map_err(unreadable)?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::DOCX_BODY;

    /// A minimal DOCX package holding `document_xml` as its main part.
    pub fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer
            .start_file(DOCX_BODY, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// `word/document.xml` with one paragraph per line of `lines`.
    pub fn document_xml(lines: &[&str]) -> String {
        let paragraphs: String = lines
            .iter()
            .map(|line| format!("<w:p><w:r><w:t>{line}</w:t></w:r></w:p>"))
            .collect();
        format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{paragraphs}</w:body></w:document>"#
        )
    }
}
