//! Defines the AST for the bounded extraction `SELECT`.

use model::watermark::Watermark;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOp {
    /// Inclusive lower bound.
    GtEq,
    /// Exclusive upper bound.
    Lt,
}

/// Compares the calendar day of `column` against a date bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    pub column: String,
    pub op: DateOp,
    pub bound: Watermark,
}

/// `SELECT * FROM <table>` with any number of conjunctive date filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Select {
    pub table: String,
    pub filters: Vec<DateFilter>,
}
