//! Word documents (docx).
//!
//! A docx file is a zip archive; the body text lives in `word/document.xml`.
//! Only paragraphs that sit directly under `w:body` are read. Tables, text
//! boxes, headers and footers are skipped.

use intake_core::{CoreError, Document, FileKind, Page, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxDocument {
    paragraphs: Vec<String>,
}

impl DocxDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| CoreError::Extraction(format!("not a docx archive: {}", e)))?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| CoreError::Extraction(format!("{} missing: {}", DOCUMENT_PART, e)))?
            .read_to_string(&mut xml)?;

        let paragraphs = parse_paragraphs(&xml)?;
        log::debug!("[Docx] {} body paragraphs", paragraphs.len());

        Ok(Self { paragraphs })
    }
}

impl Document for DocxDocument {
    fn kind(&self) -> FileKind {
        FileKind::Docx
    }

    fn get_pages(&self) -> Result<Vec<Page>> {
        Ok(vec![Page::new(1, self.paragraphs.join("\n"))])
    }

    fn get_supported_features(&self) -> Vec<String> {
        vec!["text_extract".to_string()]
    }
}

/// Collects the text of every `w:body/w:p`.
///
/// Inside a paragraph, run content maps to text as follows: `w:t` is copied,
/// `w:tab` becomes a tab, `w:br` and `w:cr` become newlines. Anything inside
/// a text box is ignored.
fn parse_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    // depth of the open body paragraph and its text so far
    let mut current: Option<(usize, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CoreError::Extraction(format!("malformed {}: {}", DOCUMENT_PART, e)))?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" && current.is_none() && parent_is(&stack, b"body") {
                    current = Some((stack.len(), String::new()));
                }
                if let Some((_, text)) = current.as_mut() {
                    push_run_control(&stack, &name, text);
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" && current.is_none() && parent_is(&stack, b"body") {
                    // <w:p/> is an empty paragraph
                    paragraphs.push(String::new());
                } else if let Some((_, text)) = current.as_mut() {
                    push_run_control(&stack, &name, text);
                }
            }
            Event::Text(e) => {
                if let Some((_, text)) = current.as_mut() {
                    if parent_is(&stack, b"t") && !in_text_box(&stack) {
                        let unescaped = e.unescape().map_err(|err| {
                            CoreError::Extraction(format!("bad text in {}: {}", DOCUMENT_PART, err))
                        })?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Event::CData(e) => {
                if let Some((_, text)) = current.as_mut() {
                    if parent_is(&stack, b"t") && !in_text_box(&stack) {
                        text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
            }
            Event::End(_) => {
                stack.pop();
                if matches!(&current, Some((depth, _)) if *depth == stack.len()) {
                    if let Some((_, text)) = current.take() {
                        paragraphs.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().is_some_and(|top| top.as_slice() == name)
}

fn in_text_box(stack: &[Vec<u8>]) -> bool {
    stack.iter().any(|n| n.as_slice() == b"txbxContent")
}

/// Tabs and breaks count only as direct children of a run; `w:tab` also
/// appears in paragraph properties as a tab stop.
fn push_run_control(stack: &[Vec<u8>], name: &[u8], text: &mut String) {
    if !parent_is(stack, b"r") || in_text_box(stack) {
        return;
    }
    match name {
        b"tab" => text.push('\t'),
        b"br" | b"cr" => text.push('\n'),
        _ => {}
    }
}
