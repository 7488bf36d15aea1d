use crate::utils::error::{MapperError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MapperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MapperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MapperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_allowed_values(field_name: &str, values: &[String], allowed: &[&str]) -> Result<()> {
    for value in values {
        if !allowed.iter().any(|a| a.eq_ignore_ascii_case(value.trim())) {
            return Err(MapperError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.clone(),
                reason: format!("Unsupported value. Valid values: {}", allowed.join(", ")),
            });
        }
    }
    Ok(())
}

/// 同一組對照內的目標欄位不可重複
pub fn validate_unique<'a>(field_name: &str, values: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(MapperError::ConfigValidationError {
                field: field_name.to_string(),
                message: format!("Duplicate target field '{}'", value),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input", "transactions.json").is_ok());
        assert!(validate_path("input", "").is_err());
        assert!(validate_path("input", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_allowed_values() {
        let formats = vec!["json".to_string(), "CSV".to_string()];
        assert!(validate_allowed_values("load.output_formats", &formats, &["json", "csv"]).is_ok());

        let formats = vec!["xml".to_string()];
        assert!(validate_allowed_values("load.output_formats", &formats, &["json", "csv"]).is_err());
    }

    #[test]
    fn test_validate_unique() {
        assert!(validate_unique("groups.order", ["Reference ID", "Email"]).is_ok());
        let err = validate_unique("groups.order", ["Email", "Email"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration validation failed for 'groups.order': Duplicate target field 'Email'"
        );
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("mapping.name", "orders").is_ok());
        assert!(validate_non_empty_string("mapping.name", "   ").is_err());
    }
}
