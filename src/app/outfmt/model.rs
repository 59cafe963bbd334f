use crate::model::render::RenderTable;

pub type Error = String;

pub trait ItemWriter {
    fn print_render_table(
        &mut self,
        name: &str,
        table_model: &RenderTable,
    ) -> Result<(), Error>;
}
