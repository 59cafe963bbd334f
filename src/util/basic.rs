// A simple String error type, for plumbing where a structured error
// would not tell the user anything more.
pub type SError = String;
