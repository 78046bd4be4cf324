use crate::error::QueryBuildError;

pub mod ast;
pub mod dialect;
pub mod extract;
pub mod renderer;
pub mod warehouse;

const MAX_COLUMN_NAME_LEN: usize = 300;

/// Source identifiers are interpolated into SQL text unquoted, so only plain
/// names and dotted paths are accepted.
pub fn validate_identifier(ident: &str, context: &'static str) -> Result<(), QueryBuildError> {
    validate_with(ident, context, |c| matches!(c, '_' | '$' | '.'))
}

/// Warehouse path segments additionally allow `-`, which project ids use.
pub fn validate_path_segment(ident: &str, context: &'static str) -> Result<(), QueryBuildError> {
    validate_with(ident, context, |c| matches!(c, '_' | '-'))
}

/// Warehouse column names: a letter or underscore, then letters, digits or
/// underscores, at most 300 characters.
pub fn validate_column_name(name: &str) -> Result<(), QueryBuildError> {
    let mut chars = name.chars();
    let well_formed = name.len() <= MAX_COLUMN_NAME_LEN
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(QueryBuildError::InvalidIdentifier {
            context: "column",
            ident: name.to_string(),
        })
    }
}

fn validate_with(
    ident: &str,
    context: &'static str,
    extra: impl Fn(char) -> bool,
) -> Result<(), QueryBuildError> {
    let well_formed = !ident.is_empty()
        && !ident.starts_with('.')
        && !ident.ends_with('.')
        && !ident.contains("..")
        && ident.chars().all(|c| c.is_ascii_alphanumeric() || extra(c));

    if well_formed {
        Ok(())
    } else {
        Err(QueryBuildError::InvalidIdentifier {
            context,
            ident: ident.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_dotted_names() {
        assert!(validate_identifier("ORDERS", "table").is_ok());
        assert!(validate_identifier("SALES.ORDERS", "table").is_ok());
        assert!(validate_identifier("SYS$LOG", "table").is_ok());
    }

    #[test]
    fn rejects_injection_and_malformed_paths() {
        assert!(validate_identifier("", "table").is_err());
        assert!(validate_identifier("ORDERS; DROP TABLE x", "table").is_err());
        assert!(validate_identifier("a..b", "table").is_err());
        assert!(validate_identifier(".a", "table").is_err());
        assert!(validate_identifier("o'neil", "column").is_err());
    }

    #[test]
    fn path_segments_allow_hyphens_only() {
        assert!(validate_path_segment("my-project-123", "project").is_ok());
        assert!(validate_path_segment("staging_ds", "dataset").is_ok());
        assert!(validate_path_segment("a.b", "dataset").is_err());
        assert!(validate_path_segment("x`y", "table").is_err());
    }

    #[test]
    fn column_names_follow_warehouse_rules() {
        assert!(validate_column_name("ORDER_ID").is_ok());
        assert!(validate_column_name("_loaded_at").is_ok());
        assert!(validate_column_name("order-id").is_err());
        assert!(validate_column_name("1st").is_err());
        assert!(validate_column_name("").is_err());
        assert!(validate_column_name(&"a".repeat(301)).is_err());
    }
}
