use thiserror::Error;

/// A field whose text did not match its expected format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot parse {field} from \"{snippet}\" on line {line} (expected {expected})")]
pub struct FieldParseError {
    pub field: String,
    pub snippet: String,
    /// 1-based. Zero when parsed outside of a document.
    pub line: usize,
    pub expected: String,
}

impl FieldParseError {
    pub fn new(field: &str, snippet: &str, expected: &str) -> Self {
        FieldParseError {
            field: field.to_string(),
            snippet: snippet.to_string(),
            line: 0,
            expected: expected.to_string(),
        }
    }

    /// Attaches document context to a parser error.
    pub fn at(mut self, field: &str, line: usize) -> Self {
        self.field = field.to_string();
        self.line = line;
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No document type matched. The whole document is skipped.
    #[error("Unrecognized document layout (first line: \"{first_line}\")")]
    UnrecognizedLayout { first_line: String },

    /// A transaction-looking block which no recipe understands.
    #[error("Unrecognized line in {section} on line {line}: \"{snippet}\"")]
    UnrecognizedBlock {
        section: String,
        line: usize,
        snippet: String,
    },

    #[error(transparent)]
    FieldParse(#[from] FieldParseError),

    #[error("Missing {field} in {section} block starting on line {line}")]
    MissingField {
        section: String,
        field: String,
        line: usize,
    },

    /// The fields were all readable, but do not add up.
    #[error("Inconsistent transaction on line {line}: {reason}")]
    Inconsistent { line: usize, reason: String },
}

impl ExtractError {
    pub fn line(&self) -> Option<usize> {
        match self {
            ExtractError::UnrecognizedLayout { .. } => None,
            ExtractError::UnrecognizedBlock { line, .. } => Some(*line),
            ExtractError::FieldParse(e) => Some(e.line),
            ExtractError::MissingField { line, .. } => Some(*line),
            ExtractError::Inconsistent { line, .. } => Some(*line),
        }
    }

    pub fn inconsistent(line: usize, reason: impl Into<String>) -> Self {
        ExtractError::Inconsistent { line, reason: reason.into() }
    }
}
