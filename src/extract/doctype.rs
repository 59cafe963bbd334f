use regex::Regex;

use super::{builder::Draft, config::ExtractConfig, error::ExtractError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Line<'a> {
    /// 1-based
    pub number: usize,
    /// Trimmed of surrounding whitespace
    pub text: &'a str,
}

/// The lines of one transaction, starting at a line matching the section's
/// block start pattern.
#[derive(Debug)]
pub struct Block<'a> {
    pub section: &'a str,
    pub lines: Vec<Line<'a>>,
}

impl<'a> Block<'a> {
    pub fn first(&self) -> Line<'a> {
        // Blocks are only ever created from a matching start line.
        self.lines[0]
    }

    pub fn start_line(&self) -> usize {
        self.first().number
    }

    /// The lines after the start line.
    pub fn rest(&self) -> &[Line<'a>] {
        &self.lines[1..]
    }

    /// All lines, newline separated.
    pub fn text(&self) -> String {
        self.lines.iter().map(|l| l.text).collect::<Vec<_>>().join("\n")
    }

    pub fn missing(&self, field: &str) -> ExtractError {
        ExtractError::MissingField {
            section: self.section.to_string(),
            field: field.to_string(),
            line: self.start_line(),
        }
    }
}

/// Turns one block into drafts.
///
/// Ok(None) means the block is not something this recipe understands, and
/// is reported as unrecognized.
pub type Recipe =
    fn(&Block, &ExtractConfig) -> Result<Option<Vec<Draft>>, ExtractError>;

pub struct Section {
    pub name: &'static str,
    pub start: Regex,
    /// Runs to the end of the document when absent.
    pub end: Option<Regex>,
    /// Should also accept lines whose fields are malformed (eg. a bad date),
    /// so the recipe reports them rather than the previous block absorbing
    /// them.
    pub block_start: Regex,
    pub recipe: Recipe,
}

/// One statement layout. A document is of this type when every signature
/// matches somewhere in its text.
pub struct DocumentType {
    pub name: &'static str,
    pub signatures: Vec<Regex>,
    pub sections: Vec<Section>,
}

impl DocumentType {
    pub fn matches(&self, text: &str) -> bool {
        self.signatures.iter().all(|s| s.is_match(text))
    }
}

/// A broker's set of layouts, in declaration order.
pub trait Extractor: Sync {
    fn label(&self) -> &'static str;
    fn document_types(&self) -> &[DocumentType];
}

/// Picks the layout for a document.
///
/// Among all matching types, the one with the most signatures wins.
/// Ties go to the earliest registered extractor, then the earliest declared
/// type within it.
pub fn select_document_type<'e>(
    text: &str,
    extractors: &[&'e dyn Extractor],
) -> Option<&'e DocumentType> {
    let mut best: Option<&'e DocumentType> = None;
    for extractor in extractors {
        for doc_type in extractor.document_types() {
            if !doc_type.matches(text) {
                continue;
            }
            tracing::trace!(
                "select_document_type: {} {} is a candidate",
                extractor.label(),
                doc_type.name
            );
            // Strictly greater, so earlier candidates win ties.
            let better = match best {
                Some(b) => doc_type.signatures.len() > b.signatures.len(),
                None => true,
            };
            if better {
                best = Some(doc_type);
            }
        }
    }
    best
}

/// Compiles a static layout pattern. Panics on an invalid pattern, so only
/// use from lazy_static initializers.
pub fn static_re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}
