use std::io::Write;

use tabled::settings::{
    object::{Columns, Rows},
    Alignment, Border, Modify, Width,
};

use crate::{model::render::RenderTable, util::rw::WriteHandle};

use super::model::ItemWriter;

/// Notes are wrapped rather than the table, so only overlong names and
/// notes get clipped.
const MAX_CELL_WIDTH: usize = 40;

pub struct TextWriter {
    w: WriteHandle,
}

impl TextWriter {
    pub fn new(w: WriteHandle) -> TextWriter {
        TextWriter { w }
    }
}

impl ItemWriter for TextWriter {
    fn print_render_table(
        &mut self,
        name: &str,
        table_model: &RenderTable,
    ) -> Result<(), super::model::Error> {
        let map_write_err = |e| format!("{e}");

        writeln!(self.w, "{}", name).map_err(map_write_err)?;

        let mut table_bldr = tabled::builder::Builder::default();
        table_bldr.push_record(
            table_model
                .header
                .iter()
                .map(|h| h.to_uppercase())
                .collect::<Vec<String>>(),
        );
        for row in &table_model.rows {
            table_bldr.push_record(row);
        }

        let mut table = table_bldr.build();
        table.with(tabled::settings::Style::ascii());
        table.with(Modify::new(Rows::new(1..)).with(Width::truncate(MAX_CELL_WIDTH).suffix("...")));
        // Center the header
        table.modify(Rows::first(), Alignment::center());
        // No outer side borders, like a plain listing.
        table.modify(Columns::first(), Border::new().set_left(' '));
        table.modify(Columns::last(), Border::new().set_right(' '));

        writeln!(self.w, "{table}").map_err(map_write_err)?;

        for note in &table_model.notes {
            writeln!(self.w, "{note}").map_err(map_write_err)?;
        }

        writeln!(self.w).map_err(map_write_err)?;
        Ok(())
    }
}
