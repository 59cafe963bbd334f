use std::io::Write;

use crate::util::rw::WriteHandle;

use super::model::Error;

/// Writes any serializable report as pretty JSON, followed by a newline.
pub fn write_json<T: serde::Serialize + ?Sized>(
    mut w: WriteHandle,
    value: &T,
) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut w, value).map_err(|e| e.to_string())?;
    writeln!(w).map_err(|e| e.to_string())
}
