pub mod app;
pub mod extract;
pub mod log;
pub mod model;
pub mod peripheral;
pub mod tracing;
pub mod util;

extern crate lazy_static;

#[cfg(any(test, feature = "testlib"))]
pub mod testlib;
