use model::table::TableRef;

/// Latest calendar day of `column` in `table`, formatted as a watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxDate {
    pub table: TableRef,
    pub column: String,
}
