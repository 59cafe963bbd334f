#![allow(dead_code)]

use std::path::PathBuf;

use stmtx::{
    extract::{
        catalog::SecurityCatalog, config::ExtractConfig, extract_document, ExtractResult,
    },
    peripheral::{
        broker::default_extractors,
        stmtx_impl::{run_with_args, Args},
    },
    util::rw::WriteHandle,
};

pub fn data_path(rel_path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(rel_path)
}

pub fn read_data_file(rel_path: &str) -> String {
    let path = data_path(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Could not read {}: {}", path.display(), e))
}

/// Extracts a data file with the default brokers and a fresh catalog.
pub fn extract_data_file(rel_path: &str) -> ExtractResult {
    stmtx::tracing::setup_tracing();
    extract_document(
        &read_data_file(rel_path),
        &default_extractors(),
        &mut SecurityCatalog::new(),
        &ExtractConfig::default(),
    )
}

pub fn run_test<T>(name: &str, test: T)
where
    T: FnOnce() + std::panic::UnwindSafe,
{
    println!("Running test: {}", name);
    let result = std::panic::catch_unwind(test);
    match result {
        Ok(_) => println!("{name} passed"),
        Err(e) => {
            panic!("{name} failed: {e:#?}");
        }
    }
}

pub fn run_and_get_output(args: Args) -> (Result<(), ()>, String, String) {
    let (out_w, out_b) = WriteHandle::string_buff_write_handle();
    let (err_w, err_b) = WriteHandle::string_buff_write_handle();
    let res = run_with_args(args, out_w, err_w);
    let out = out_b.borrow_mut().export_string();
    let err = err_b.borrow_mut().export_string();
    (res, out, err)
}

pub fn run_cli(args: &[&str]) -> (Result<(), ()>, String, String) {
    use clap::Parser;
    let args = Args::try_parse_from(std::iter::once("stmtx").chain(args.iter().copied()))
        .unwrap_or_else(|e| panic!("Bad args {args:?}: {e}"));
    run_and_get_output(args)
}

pub fn data_arg(rel_path: &str) -> String {
    data_path(rel_path).display().to_string()
}
