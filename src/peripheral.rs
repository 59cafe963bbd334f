pub mod broker;

#[cfg(feature = "pdf_parse")]
pub mod pdf;

#[cfg(feature = "cliapp")]
pub mod stmtx_impl;
