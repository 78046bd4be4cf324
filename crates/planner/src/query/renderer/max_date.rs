use crate::query::{
    ast::max_date::MaxDate,
    renderer::{Render, Renderer},
};

impl Render for MaxDate {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&format!(
            "SELECT FORMAT_TIMESTAMP('%d-%b-%Y', TIMESTAMP(MAX({}))) FROM ",
            self.column
        ));
        r.render_table_ref(&self.table);
    }
}
