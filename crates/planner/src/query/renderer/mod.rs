//! Defines the core rendering trait and context for converting AST to SQL.

use crate::query::dialect::Dialect;
use model::table::TableRef;

pub mod create_table;
pub mod drop_table;
pub mod max_date;
pub mod select;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Accumulates the SQL text and gives access to the dialect for
/// syntax-specific details. Values are inlined, so there are no parameters.
pub struct Renderer<'a> {
    pub sql: String,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            dialect,
        }
    }

    pub fn finish(self) -> String {
        self.sql
    }

    /// Renders a warehouse path as one quoted identifier.
    pub fn render_table_ref(&mut self, table: &TableRef) {
        let quoted = self.dialect.quote_identifier(&table.to_string());
        self.sql.push_str(&quoted);
    }
}

/// Renders a node with a fresh renderer.
pub fn to_sql(node: &impl Render, dialect: &dyn Dialect) -> String {
    let mut renderer = Renderer::new(dialect);
    node.render(&mut renderer);
    renderer.finish()
}
