//! Statements run against the warehouse: checkpoint lookup, landing table
//! provisioning and the transform query.

use crate::{
    error::QueryBuildError,
    query::{
        ast::{create_table::CreateTable, drop_table::DropTable, max_date::MaxDate},
        dialect::BigQuery,
        renderer::to_sql,
        validate_column_name, validate_identifier, validate_path_segment,
    },
};
use model::{schema::FieldSchema, table::TableRef};

fn validate_table(table: &TableRef) -> Result<(), QueryBuildError> {
    validate_path_segment(&table.project, "project")?;
    validate_path_segment(&table.dataset, "dataset")?;
    validate_path_segment(&table.table, "table")
}

/// `MAX` of the ordering column, as `DD-Mon-YYYY` text (NULL on an empty table).
pub fn checkpoint_query(table: &TableRef, column: &str) -> Result<String, QueryBuildError> {
    validate_table(table)?;
    validate_identifier(column, "column")?;
    let ast = MaxDate {
        table: table.clone(),
        column: column.to_string(),
    };
    Ok(to_sql(&ast, &BigQuery))
}

pub fn create_table(table: &TableRef, schema: &FieldSchema) -> Result<String, QueryBuildError> {
    validate_table(table)?;
    if schema.is_empty() {
        return Err(QueryBuildError::EmptySchema(table.to_string()));
    }
    for field in &schema.fields {
        validate_column_name(&field.name)?;
    }
    let ast = CreateTable {
        table: table.clone(),
        columns: schema.fields.clone(),
        if_not_exists: true,
    };
    Ok(to_sql(&ast, &BigQuery))
}

pub fn drop_table(table: &TableRef) -> Result<String, QueryBuildError> {
    validate_table(table)?;
    Ok(to_sql(
        &DropTable {
            table: table.clone(),
            if_exists: true,
        },
        &BigQuery,
    ))
}

/// Normalizes a transform query whose result is appended to `table`.
/// The statement itself is left to the warehouse; only the terminator goes.
pub fn transform_query(table: &TableRef, query: &str) -> Result<String, QueryBuildError> {
    validate_table(table)?;
    let query = query.trim().trim_end_matches(';').trim_end();
    if query.is_empty() {
        return Err(QueryBuildError::EmptyQuery);
    }
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landing() -> TableRef {
        TableRef::new("my-project", "staging", "ORDERS_LANDING")
    }

    #[test]
    fn checkpoint_formats_max_as_watermark() {
        assert_eq!(
            checkpoint_query(&landing(), "ORDER_DATE").unwrap(),
            "SELECT FORMAT_TIMESTAMP('%d-%b-%Y', TIMESTAMP(MAX(ORDER_DATE))) \
             FROM `my-project.staging.ORDERS_LANDING`"
        );
    }

    #[test]
    fn transform_query_strips_trailing_terminator() {
        let sql = transform_query(
            &landing().sibling("ORDERS"),
            "SELECT * FROM `my-project.staging.ORDERS_LANDING`;\n",
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM `my-project.staging.ORDERS_LANDING`");
    }

    #[test]
    fn transform_query_rejects_blank_query() {
        assert_eq!(
            transform_query(&landing(), " ;\n"),
            Err(QueryBuildError::EmptyQuery)
        );
    }

    #[test]
    fn create_rejects_hyphenated_column() {
        let schema = FieldSchema::untyped(&["ORDER-ID".to_string()]);
        assert!(matches!(
            create_table(&landing(), &schema),
            Err(QueryBuildError::InvalidIdentifier { context: "column", .. })
        ));
    }

    #[test]
    fn create_requires_fields() {
        assert!(matches!(
            create_table(&landing(), &FieldSchema::default()),
            Err(QueryBuildError::EmptySchema(_))
        ));
    }

    #[test]
    fn rejects_quoted_table_segments() {
        let table = TableRef::new("p", "d", "t` ; DROP");
        assert!(drop_table(&table).is_err());
        assert_eq!(
            drop_table(&landing()).unwrap(),
            "DROP TABLE IF EXISTS `my-project.staging.ORDERS_LANDING`"
        );
    }
}
