use std::path::{Path, PathBuf};

use clap::Parser;
use itertools::Itertools;

use crate::{
    app::{
        outfmt::{csv::CsvWriter, json::write_json, model::ItemWriter, text::TextWriter},
        STMTX_APP_VERSION,
    },
    extract::{
        catalog::{SecurityCatalog, SecurityLookup, SharedCatalog},
        config::ExtractConfig,
        extract_document,
        validate::{ImportValidator, ValidationIssue},
    },
    model::{
        render::{render_items_table, RenderTable, ITEM_TABLE_HEADER},
        Currency, Item,
    },
    peripheral::broker::default_extractors,
    util::{basic::SError, rw::WriteHandle, sys::env_var_non_empty},
    verboseln, write_errln,
};

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Pretty,
    Json,
}

fn parse_currency(s: &str) -> Result<Currency, SError> {
    let s = s.trim();
    if s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(Currency::new(s))
    } else {
        Err(format!("\"{s}\" is not a currency code"))
    }
}

/// Extracts securities and transactions from broker statements.
///
/// Supported are tastytrade summary and depot statements, and E*TRADE trade
/// confirmations (from before and after the Morgan Stanley migration).
#[derive(Parser, Debug)]
#[command(author, version = STMTX_APP_VERSION, about, long_about = None)]
pub struct Args {
    /// Statement PDFs, or text files already extracted from them (.txt)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Check the extracted items before printing them. Issues are reported
    /// like extraction errors.
    #[arg(long)]
    pub validate: bool,

    /// Extract the documents concurrently. Securities are still only created
    /// once across all documents. Also enabled by setting STMTX_PARALLEL.
    #[arg(short = 'p', long)]
    pub parallel: bool,

    /// Currency of the account receiving the items
    #[arg(long, default_value = "USD", value_parser = parse_currency)]
    pub currency: Currency,

    /// Enable debug tracing of the extractor (to stderr)
    #[arg(long)]
    pub debug: bool,

    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// The outcome for one input file.
#[derive(Debug, serde::Serialize)]
pub struct DocumentReport {
    pub file: String,
    pub document_type: Option<String>,
    pub items: Vec<Item>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

pub fn read_document_text(path: &Path) -> Result<String, SError> {
    let is_txt = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if is_txt {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e));
    }
    read_pdf_text(path)
}

#[cfg(feature = "pdf_parse")]
fn read_pdf_text(path: &Path) -> Result<String, SError> {
    super::pdf::get_text_from_path(path)
}

#[cfg(not(feature = "pdf_parse"))]
fn read_pdf_text(path: &Path) -> Result<String, SError> {
    Err(format!(
        "Cannot read {}: built without PDF support (use extracted .txt files)",
        path.display()
    ))
}

fn extract_file(
    path: &Path,
    catalog: &mut dyn SecurityLookup,
    config: &ExtractConfig,
) -> DocumentReport {
    let file = path.display().to_string();
    let text = match read_document_text(path) {
        Ok(t) => t,
        Err(e) => {
            return DocumentReport {
                file,
                document_type: None,
                items: Vec::new(),
                errors: vec![e],
                issues: Vec::new(),
            };
        }
    };

    let res = extract_document(&text, &default_extractors(), catalog, config);
    verboseln!(
        "{}: {} ({} transactions, {} errors)",
        file,
        res.document_type.as_deref().unwrap_or("unrecognized"),
        res.transaction_count(),
        res.errors.len()
    );
    DocumentReport {
        file,
        document_type: res.document_type,
        items: res.items,
        errors: res.errors.iter().map(|e| e.to_string()).collect(),
        issues: Vec::new(),
    }
}

fn extract_files_sequential(files: &[PathBuf], config: &ExtractConfig) -> Vec<DocumentReport> {
    let mut catalog = SecurityCatalog::new();
    files
        .iter()
        .map(|f| extract_file(f, &mut catalog, config))
        .collect()
}

/// Extracts each file in its own task. Reports are returned in file order.
async fn extract_files_parallel(
    files: &[PathBuf],
    config: &ExtractConfig,
) -> Vec<DocumentReport> {
    let start = std::time::Instant::now();
    let catalog = SharedCatalog::default();

    let mut handles = Vec::with_capacity(files.len());
    for file in files {
        let file = file.clone();
        let mut catalog = catalog.clone();
        let config = config.clone();
        let handle = async_std::task::spawn(async move {
            extract_file(&file, &mut catalog, &config)
        });
        handles.push(handle);
    }

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await);
    }

    tracing::debug!(
        "extract_files_parallel: {} files, {} securities, took {:?}",
        files.len(),
        catalog.len(),
        start.elapsed()
    );
    reports
}

fn render_reports_table(reports: &[DocumentReport]) -> RenderTable {
    let mut rt = RenderTable::default();
    rt.header.push("file".to_string());
    rt.header.extend(ITEM_TABLE_HEADER.iter().map(|h| h.to_string()));
    for report in reports {
        let doc_rt = render_items_table(&report.items);
        for row in doc_rt.rows {
            let mut full_row = Vec::with_capacity(row.len() + 1);
            full_row.push(report.file.clone());
            full_row.extend(row);
            rt.rows.push(full_row);
        }
        for note in doc_rt.notes {
            rt.notes.push(format!("{}: {}", report.file, note));
        }
    }
    rt
}

fn validate_reports(reports: &mut [DocumentReport], config: &ExtractConfig) {
    let validator = ImportValidator::new(config.clone());
    for report in reports {
        let issues: Vec<ValidationIssue> = validator.check(&report.items, &config.currency);
        report.issues = issues.iter().map(|i| i.to_string()).collect();
    }
}

fn write_output(
    reports: &[DocumentReport],
    format: OutputFormat,
    out_w: WriteHandle,
) -> Result<(), SError> {
    match format {
        OutputFormat::Json => write_json(out_w, reports),
        OutputFormat::Csv => {
            CsvWriter::new_to_writer(out_w).print_render_table("Items", &render_reports_table(reports))
        }
        OutputFormat::Pretty => {
            TextWriter::new(out_w).print_render_table("Items", &render_reports_table(reports))
        }
    }
}

pub fn run_with_args(args: Args, out_w: WriteHandle, mut err_w: WriteHandle) -> Result<(), ()> {
    if args.debug {
        crate::tracing::enable_trace_env("stmtx=debug");
    }
    crate::tracing::setup_tracing();
    crate::log::set_verbose(args.verbose);

    let config = ExtractConfig::default().with_currency(args.currency.clone());

    let files: Vec<PathBuf> = args.files.iter().cloned().sorted().dedup().collect();

    let mut reports = if args.parallel || env_var_non_empty("STMTX_PARALLEL") {
        async_std::task::block_on(extract_files_parallel(&files, &config))
    } else {
        extract_files_sequential(&files, &config)
    };

    if args.validate {
        validate_reports(&mut reports, &config);
    }

    let mut failed = false;
    for report in &reports {
        for e in report.errors.iter().chain(report.issues.iter()) {
            write_errln!(err_w, "{}: {}", report.file, e);
            failed = true;
        }
    }

    if let Err(e) = write_output(&reports, args.format, out_w) {
        write_errln!(err_w, "Error writing output: {e}");
        return Err(());
    }

    if failed {
        Err(())
    } else {
        Ok(())
    }
}

pub fn run() -> Result<(), ()> {
    let args = Args::parse();
    run_with_args(
        args,
        WriteHandle::stdout_write_handle(),
        WriteHandle::stderr_write_handle(),
    )
}
