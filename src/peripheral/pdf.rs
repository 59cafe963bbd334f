use std::path::Path;

use crate::util::basic::SError;

pub fn get_text_from_path(path: &Path) -> Result<String, SError> {
    let start = std::time::Instant::now();
    let text = pdf_extract::extract_text(path)
        .map_err(|e| format!("Failed to read text from {}: {}", path.display(), e))?;
    tracing::debug!("get_text_from_path {} took {:?}", path.display(), start.elapsed());
    Ok(text)
}

pub fn get_text_from_bytes(bytes: &[u8]) -> Result<String, SError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| format!("Failed to read text from PDF: {e}"))
}

/// Trims every line, and collapses runs of blank lines into one.
/// pdf-extract output tends to carry a lot of both.
pub fn tidy_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = false;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !blank_run && !out.is_empty() {
                out.push('\n');
            }
            blank_run = true;
            continue;
        }
        blank_run = false;
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{get_text_from_bytes, get_text_from_path, tidy_text};

    #[test]
    fn test_tidy_text() {
        assert_eq!(tidy_text(""), "");
        assert_eq!(tidy_text("\n\n  a  \n\n\n b\n  \n"), "a\n\nb\n\n");
        assert_eq!(tidy_text("x\ny"), "x\ny\n");
    }

    #[test]
    fn test_not_a_pdf() {
        let err = get_text_from_bytes(b"not a pdf").unwrap_err();
        assert!(err.starts_with("Failed to read text from PDF: "), "{err}");

        let err = get_text_from_path(std::path::Path::new("/nonexistent/x.pdf"))
            .unwrap_err();
        assert!(err.starts_with("Failed to read text from /nonexistent/x.pdf: "), "{err}");
    }
}
