use crate::query::{
    ast::select::{DateOp, Select},
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // Source identifiers are emitted as given so the database applies its
        // own case folding.
        r.sql.push_str("SELECT * FROM ");
        r.sql.push_str(&self.table);

        for (idx, filter) in self.filters.iter().enumerate() {
            r.sql.push_str(if idx == 0 { " WHERE " } else { " AND " });
            let op = match filter.op {
                DateOp::GtEq => ">=",
                DateOp::Lt => "<",
            };
            let lhs = r.dialect.day_of(&filter.column);
            let rhs = r.dialect.date_literal(&filter.bound);
            r.sql.push_str(&format!("{lhs} {op} {rhs}"));
        }
    }
}
