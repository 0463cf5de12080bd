//! Type and constraint resolution
//!
//! Maps a declared column type token to its schema type and infers primary
//! keys. Foreign keys, comments and the required flag are merged in by the
//! parser.

use crate::error::{Error, Result};
use crate::schema::types::{ColumnOptions, Resolution, SourceType, TargetType};

/// A column is primary when it is `serial` or named `id`
pub fn is_primary(column_name: &str, source_type: SourceType) -> bool {
    source_type == SourceType::Serial || column_name == "id"
}

/// Resolve a `(column name, type token)` pair.
///
/// Unknown tokens fail with [`Error::UnknownSourceType`].
pub fn resolve(column_name: &str, source_type: &str) -> Result<Resolution> {
    let source = SourceType::from_token(source_type).ok_or_else(|| Error::UnknownSourceType {
        token: source_type.to_string(),
        column: column_name.to_string(),
    })?;

    Ok(resolve_source(column_name, source))
}

/// Resolve an already recognised source type
pub fn resolve_source(column_name: &str, source: SourceType) -> Resolution {
    let mut options = ColumnOptions::default();

    let mut target_type = match source {
        SourceType::Int => TargetType::Integer,
        SourceType::Text => {
            options.text = true;
            TargetType::String
        }
        SourceType::Bigint | SourceType::Serial => {
            options.bigint = true;
            TargetType::Integer
        }
        SourceType::Float => TargetType::Float,
        SourceType::Date => TargetType::Date,
        SourceType::Boolean => TargetType::Boolean,
    };

    if is_primary(column_name, source) {
        if options.text {
            options.primary_key = true;
        } else {
            options.bigint = true;
            target_type = TargetType::PrimaryKey;
        }
    }

    Resolution {
        source_type: source,
        target_type,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("int", TargetType::Integer, false, false)]
    #[case("text", TargetType::String, true, false)]
    #[case("bigint", TargetType::Integer, false, true)]
    #[case("float", TargetType::Float, false, false)]
    #[case("date", TargetType::Date, false, false)]
    #[case("boolean", TargetType::Boolean, false, false)]
    fn test_base_mapping(
        #[case] token: &str,
        #[case] target: TargetType,
        #[case] text: bool,
        #[case] bigint: bool,
    ) {
        let resolution = resolve("amount", token).expect("known type");
        assert_eq!(resolution.target_type, target);
        assert_eq!(resolution.options.text, text);
        assert_eq!(resolution.options.bigint, bigint);
        assert!(!resolution.options.primary_key);
    }

    #[rstest]
    #[case("varchar")]
    #[case("Int")]
    #[case("")]
    #[case("timestamp")]
    fn test_unknown_type_is_fatal(#[case] token: &str) {
        let err = resolve("value", token).unwrap_err();
        match err {
            Error::UnknownSourceType { token: found, column } => {
                assert_eq!(found, token);
                assert_eq!(column, "value");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_every_source_type_resolves() {
        for ty in SourceType::ALL {
            assert!(resolve("col", ty.as_str()).is_ok(), "{ty} should resolve");
        }
    }

    #[rstest]
    #[case("int")]
    #[case("bigint")]
    #[case("float")]
    #[case("date")]
    #[case("boolean")]
    fn test_id_column_is_always_primary(#[case] token: &str) {
        let resolution = resolve("id", token).expect("known type");
        assert_eq!(resolution.target_type, TargetType::PrimaryKey);
        assert!(resolution.options.bigint);
    }

    #[test]
    fn test_serial_is_primary_under_any_name() {
        let resolution = resolve("patient_number", "serial").expect("known type");
        assert_eq!(resolution.target_type, TargetType::PrimaryKey);
        assert!(resolution.options.bigint);
        assert!(!resolution.options.primary_key);
    }

    #[test]
    fn test_text_id_becomes_text_primary_key() {
        let resolution = resolve("id", "text").expect("known type");
        assert_eq!(resolution.target_type, TargetType::String);
        assert!(resolution.options.text);
        assert!(resolution.options.primary_key);
        assert!(!resolution.options.bigint);
    }
}
