//! Builds the bounded `SELECT` issued against the source on every attempt.

use crate::{
    error::QueryBuildError,
    query::{
        ast::select::{DateFilter, DateOp, Select},
        dialect::Dialect,
        renderer::to_sql,
        validate_identifier,
    },
};
use model::watermark::Watermark;
use tracing::info;

/// Inputs of one extraction query.
///
/// Without an ordering column the bounds are ignored and the whole table is
/// scanned. The epoch watermark adds no lower clause, since every row is at or
/// after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractQuery {
    table: String,
    column: Option<String>,
    lower: Option<Watermark>,
    upper: Option<Watermark>,
}

impl ExtractQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: None,
            lower: None,
            upper: None,
        }
    }

    pub fn ordered_by(mut self, column: Option<&str>) -> Self {
        self.column = column.map(str::to_string);
        self
    }

    pub fn lower(mut self, bound: Option<Watermark>) -> Self {
        self.lower = bound;
        self
    }

    pub fn upper(mut self, bound: Option<Watermark>) -> Self {
        self.upper = bound;
        self
    }

    pub fn to_ast(&self) -> Result<Select, QueryBuildError> {
        validate_identifier(&self.table, "table")?;

        let mut filters = Vec::new();
        if let Some(column) = &self.column {
            validate_identifier(column, "column")?;

            if let Some(lower) = self.lower.filter(|w| !w.is_epoch()) {
                filters.push(DateFilter {
                    column: column.clone(),
                    op: DateOp::GtEq,
                    bound: lower,
                });
            }
            if let Some(upper) = self.upper {
                filters.push(DateFilter {
                    column: column.clone(),
                    op: DateOp::Lt,
                    bound: upper,
                });
            }
        }

        Ok(Select {
            table: self.table.clone(),
            filters,
        })
    }

    pub fn build(&self, dialect: &dyn Dialect) -> Result<String, QueryBuildError> {
        let sql = to_sql(&self.to_ast()?, dialect);
        info!(dialect = %dialect.name(), "Extraction query: {sql}");
        Ok(sql)
    }
}
