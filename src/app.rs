pub mod outfmt;

// Version is of the format 0.YY.MM, tracking when the statement layouts were
// last checked against real documents.
pub const STMTX_APP_VERSION: &str = "0.26.10";
