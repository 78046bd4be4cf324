use crate::query::{
    ast::create_table::CreateTable,
    renderer::{Render, Renderer},
};
use model::schema::FieldMode;

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("CREATE TABLE ");
        if self.if_not_exists {
            r.sql.push_str("IF NOT EXISTS ");
        }
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");

        let columns = self
            .columns
            .iter()
            .map(|col| {
                let name = r.dialect.quote_identifier(&col.name);
                match col.mode {
                    FieldMode::Nullable => format!("{name} {}", col.field_type),
                    FieldMode::Required => format!("{name} {} NOT NULL", col.field_type),
                    FieldMode::Repeated => format!("{name} ARRAY<{}>", col.field_type),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        r.sql.push_str(&columns);
        r.sql.push(')');
    }
}
