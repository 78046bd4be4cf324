use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryBuildError {
    #[error("Invalid {context} identifier '{ident}'")]
    InvalidIdentifier { context: &'static str, ident: String },

    #[error("Transform query is empty")]
    EmptyQuery,

    #[error("Field schema is empty; cannot create table {0}")]
    EmptySchema(String),
}
