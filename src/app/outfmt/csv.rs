use crate::{model::render::RenderTable, util::rw::WriteHandle};

use super::model::ItemWriter;

/// Writes tables as CSV. The table name is not part of the output.
pub struct CsvWriter {
    w: WriteHandle,
}

impl CsvWriter {
    pub fn new_to_writer(w: WriteHandle) -> CsvWriter {
        CsvWriter { w }
    }
}

impl ItemWriter for CsvWriter {
    fn print_render_table(
        &mut self,
        _name: &str,
        table_model: &RenderTable,
    ) -> Result<(), super::model::Error> {
        let mut csv_w =
            csv::WriterBuilder::new().has_headers(true).from_writer(self.w.clone());

        csv_w
            .write_record(&table_model.header)
            .map_err(|e| e.to_string())?;
        for row in &table_model.rows {
            csv_w.write_record(row).map_err(|e| e.to_string())?;
        }

        let n_cols = table_model.header.len();
        for note in &table_model.notes {
            let mut note_record = vec![String::new(); n_cols.max(1)];
            note_record[0] = note.clone();
            csv_w.write_record(note_record).map_err(|e| e.to_string())?;
        }

        csv_w.flush().map_err(|e| e.to_string())?;
        Ok(())
    }
}
