//! Defines the `Dialect` trait for database-specific SQL syntax.

use model::watermark::Watermark;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL uses double quotes: `"my_column"`
    /// - MySQL and BigQuery use backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Truncates a column to its calendar day.
    fn day_of(&self, column: &str) -> String;

    /// Renders a watermark as a date expression, parsed from its
    /// `DD-Mon-YYYY` text on the server side.
    fn date_literal(&self, date: &Watermark) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn day_of(&self, column: &str) -> String {
        format!("CAST({column} AS DATE)")
    }

    fn date_literal(&self, date: &Watermark) -> String {
        format!("TO_DATE('{date}', 'DD-Mon-YYYY')")
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{ident}`")
    }

    fn day_of(&self, column: &str) -> String {
        format!("DATE({column})")
    }

    fn date_literal(&self, date: &Watermark) -> String {
        format!("STR_TO_DATE('{date}', '%d-%b-%Y')")
    }

    fn name(&self) -> String {
        "MySQL".into()
    }
}

/// Standard SQL as accepted by BigQuery.
#[derive(Debug, Clone)]
pub struct BigQuery;

impl Dialect for BigQuery {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{ident}`")
    }

    fn day_of(&self, column: &str) -> String {
        format!("DATE({column})")
    }

    fn date_literal(&self, date: &Watermark) -> String {
        format!("PARSE_DATE('%d-%b-%Y', '{date}')")
    }

    fn name(&self) -> String {
        "BigQuery".into()
    }
}
