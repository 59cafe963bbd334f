pub mod csv;
pub mod json;
pub mod model;
pub mod text;
