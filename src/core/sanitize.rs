use crate::core::value::{is_falsy, number_from_f64, number_to_text};
use crate::domain::mapping::SanitizeOp;
use serde_json::Value;

/// 自訂值優先；falsy 的值原樣回傳，0 元的訂單金額不會經過任何步驟
pub fn sanitize(value: Option<&Value>, operations: &[SanitizeOp], literal_override: &str) -> Option<Value> {
    if !literal_override.trim().is_empty() {
        return Some(Value::String(literal_override.to_string()));
    }
    if is_falsy(value) {
        return value.cloned();
    }

    let value = value.cloned()?;
    Some(
        operations
            .iter()
            .fold(value, |current, op| apply_operation(current, *op)),
    )
}

/// 套用單一步驟；型別不符時原樣回傳
pub fn apply_operation(value: Value, op: SanitizeOp) -> Value {
    match (op, value) {
        (SanitizeOp::Trim, Value::String(s)) => Value::String(s.trim().to_string()),
        (SanitizeOp::ToUpperCase, Value::String(s)) => Value::String(s.to_uppercase()),
        (SanitizeOp::ToLowerCase, Value::String(s)) => Value::String(s.to_lowercase()),
        (SanitizeOp::StringToNumber, Value::String(s)) => string_to_number(&s),
        (SanitizeOp::NumberToString, Value::Number(n)) => Value::String(number_to_text(&n)),
        (_, other) => other,
    }
}

/// 無法解析時為 0
fn string_to_number(s: &str) -> Value {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Value::from(0);
    }
    match trimmed.parse::<f64>() {
        Ok(f) => number_from_f64(f),
        Err(_) => Value::from(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trim_then_uppercase() {
        let value = json!("  Abc  ");
        assert_eq!(
            sanitize(Some(&value), &[SanitizeOp::Trim, SanitizeOp::ToUpperCase], ""),
            Some(json!("ABC"))
        );
    }

    #[test]
    fn test_operations_apply_in_order() {
        let value = json!(" 12.50 ");
        assert_eq!(
            sanitize(
                Some(&value),
                &[SanitizeOp::StringToNumber, SanitizeOp::NumberToString],
                ""
            ),
            Some(json!("12.5"))
        );
        assert_eq!(
            sanitize(Some(&value), &[SanitizeOp::NumberToString, SanitizeOp::StringToNumber], ""),
            Some(json!(12.5))
        );
    }

    #[test]
    fn test_zero_total_bypasses_pipeline() {
        let zero = json!(0);
        assert_eq!(
            sanitize(Some(&zero), &[SanitizeOp::StringToNumber], ""),
            Some(json!(0))
        );
        assert_eq!(
            sanitize(Some(&zero), &[SanitizeOp::NumberToString], ""),
            Some(json!(0))
        );
    }

    #[test]
    fn test_falsy_values_unchanged() {
        assert_eq!(sanitize(None, &[SanitizeOp::Trim], ""), None);
        assert_eq!(
            sanitize(Some(&json!(null)), &[SanitizeOp::Trim], ""),
            Some(json!(null))
        );
        assert_eq!(
            sanitize(Some(&json!("")), &[SanitizeOp::StringToNumber], ""),
            Some(json!(""))
        );
    }

    #[test]
    fn test_literal_override_wins() {
        let value = json!(19.5);
        assert_eq!(
            sanitize(Some(&value), &[SanitizeOp::NumberToString], "100"),
            Some(json!("100"))
        );
        assert_eq!(sanitize(None, &[], "fixed"), Some(json!("fixed")));
        // 只有空白的自訂值不算
        assert_eq!(sanitize(Some(&value), &[], "   "), Some(json!(19.5)));
    }

    #[test]
    fn test_type_preconditions() {
        assert_eq!(apply_operation(json!(5), SanitizeOp::Trim), json!(5));
        assert_eq!(apply_operation(json!(5), SanitizeOp::ToUpperCase), json!(5));
        assert_eq!(apply_operation(json!(5), SanitizeOp::StringToNumber), json!(5));
        assert_eq!(apply_operation(json!("5"), SanitizeOp::NumberToString), json!("5"));
        assert_eq!(apply_operation(json!(true), SanitizeOp::ToLowerCase), json!(true));
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(apply_operation(json!("42"), SanitizeOp::StringToNumber), json!(42));
        assert_eq!(apply_operation(json!("4.75"), SanitizeOp::StringToNumber), json!(4.75));
        assert_eq!(apply_operation(json!("abc"), SanitizeOp::StringToNumber), json!(0));
        assert_eq!(apply_operation(json!("   "), SanitizeOp::StringToNumber), json!(0));
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(apply_operation(json!(19.5), SanitizeOp::NumberToString), json!("19.5"));
        assert_eq!(apply_operation(json!(7), SanitizeOp::NumberToString), json!("7"));
        assert_eq!(apply_operation(json!(1e21), SanitizeOp::NumberToString), json!("1e+21"));
        assert_eq!(apply_operation(json!(1e-7), SanitizeOp::NumberToString), json!("1e-7"));
    }
}
