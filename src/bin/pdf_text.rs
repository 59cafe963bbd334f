use std::{io::Write, path::PathBuf};

use clap::Parser;

use stmtx::peripheral::pdf;

/// Prints the text of a PDF the way stmtx sees it.
///
/// Use this to create test files for new statement layouts. Sanitize account
/// numbers and other personal information before committing the output.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// Input file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Trim lines and collapse runs of blank lines
    #[arg(short = 't', long)]
    pub trim: bool,
}

fn main() {
    let args = Args::parse();
    stmtx::tracing::setup_tracing();

    let text = match pdf::get_text_from_path(&args.input) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let text = if args.trim { pdf::tidy_text(&text) } else { text };

    let mut out = std::io::stdout();
    if write!(out, "{text}").and_then(|_| out.flush()).is_err() {
        std::process::exit(1);
    }
}
