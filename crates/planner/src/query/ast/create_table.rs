//! Defines the AST for a CREATE TABLE statement.

use model::{schema::FieldDef, table::TableRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub table: TableRef,
    pub columns: Vec<FieldDef>,
    pub if_not_exists: bool,
}
