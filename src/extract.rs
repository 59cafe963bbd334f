//! Extraction of import items from statement text.
//!
//! A document is matched against the registered layouts, cut into sections
//! and then into per-transaction blocks. Each block goes through its
//! section's recipe, and the resulting drafts through the builder. Problems
//! are collected per block, so one bad line never costs the whole document.

pub mod builder;
pub mod catalog;
pub mod config;
pub mod doctype;
pub mod error;
pub mod fields;
pub mod searcher;
pub mod validate;

use crate::model::Item;

use self::{
    builder::Checked,
    catalog::SecurityLookup,
    config::ExtractConfig,
    doctype::{select_document_type, Block, Extractor, Line, Section},
    error::ExtractError,
};

#[derive(Debug, Default, PartialEq)]
pub struct ExtractResult {
    /// The matched layout, if any.
    pub document_type: Option<String>,
    pub items: Vec<Item>,
    pub errors: Vec<ExtractError>,
}

impl ExtractResult {
    pub fn transaction_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_transaction()).count()
    }
}

fn numbered_lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .map(|(i, l)| Line {
            number: i + 1,
            text: l.trim(),
        })
        .collect()
}

/// Finds the bodies of every occurrence of the section. A body runs from the
/// line after the section start to the end pattern, the next occurrence of
/// the start (eg. a header repeated on the next page), or the document end.
fn section_bodies<'l, 'a>(section: &Section, lines: &'l [Line<'a>]) -> Vec<&'l [Line<'a>]> {
    let mut bodies = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if !section.start.is_match(lines[i].text) {
            i += 1;
            continue;
        }
        let begin = i + 1;
        let mut end = begin;
        while end < lines.len() {
            let t = lines[end].text;
            if section.start.is_match(t) {
                break;
            }
            if let Some(end_re) = &section.end {
                if end_re.is_match(t) {
                    break;
                }
            }
            end += 1;
        }
        bodies.push(&lines[begin..end]);
        i = end;
    }
    bodies
}

/// Splits a section body into blocks. Lines before the first block start
/// (column headers and the like) belong to no block.
fn blocks<'a>(section: &'a Section, body: &[Line<'a>]) -> Vec<Block<'a>> {
    let mut blocks: Vec<Block<'a>> = Vec::new();
    for line in body {
        if section.block_start.is_match(line.text) {
            blocks.push(Block {
                section: section.name,
                lines: vec![*line],
            });
        } else if let Some(block) = blocks.last_mut() {
            if !line.text.is_empty() {
                block.lines.push(*line);
            }
        }
    }
    blocks
}

fn process_block(
    section: &Section,
    block: &Block,
    catalog: &mut dyn SecurityLookup,
    config: &ExtractConfig,
    items: &mut Vec<Item>,
) -> Result<(), ExtractError> {
    let drafts = (section.recipe)(block, config)?.ok_or_else(|| {
        ExtractError::UnrecognizedBlock {
            section: section.name.to_string(),
            line: block.start_line(),
            snippet: block.first().text.to_string(),
        }
    })?;
    // Check everything first, so a failing block creates no securities.
    let checked = drafts
        .into_iter()
        .map(|d| d.check(config))
        .collect::<Result<Vec<Checked>, ExtractError>>()?;
    for c in checked {
        c.emit(catalog, items);
    }
    Ok(())
}

/// Extracts all items from one document's text.
///
/// Items are ordered by section (in layout declaration order), then by
/// position in the document. New securities precede the first transaction
/// referring to them.
pub fn extract_document(
    text: &str,
    extractors: &[&dyn Extractor],
    catalog: &mut dyn SecurityLookup,
    config: &ExtractConfig,
) -> ExtractResult {
    let mut result = ExtractResult::default();

    let Some(doc_type) = select_document_type(text, extractors) else {
        let first_line = text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string();
        tracing::debug!("extract_document: no layout matches \"{first_line}\"");
        result.errors.push(ExtractError::UnrecognizedLayout { first_line });
        return result;
    };
    tracing::debug!("extract_document: using layout {}", doc_type.name);
    result.document_type = Some(doc_type.name.to_string());

    let lines = numbered_lines(text);
    for section in &doc_type.sections {
        for body in section_bodies(section, &lines) {
            for block in blocks(section, body) {
                tracing::trace!(
                    "extract_document: {} block at line {}:\n{}",
                    section.name,
                    block.start_line(),
                    block.text()
                );
                if let Err(e) =
                    process_block(section, &block, catalog, config, &mut result.items)
                {
                    tracing::debug!("extract_document: {e}");
                    result.errors.push(e);
                }
            }
        }
    }
    result
}
