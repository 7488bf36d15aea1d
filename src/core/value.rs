use serde_json::{Number, Value};

/// JavaScript 的 falsy 判斷：不存在、null、false、0、空字串
pub fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

/// 與 JavaScript `String(n)` 相同的數字字串，整數值的浮點數不帶小數點
pub fn number_to_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f != 0.0 && (f.abs() >= 1e21 || f.abs() < 1e-6) => exponential_text(f),
        // -0 與 0 都寫成 "0"
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// `1e+21`、`1.5e-7` 這種指數寫法，正指數帶 `+`
fn exponential_text(f: f64) -> String {
    let text = format!("{:e}", f);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// 由浮點數建立 JSON 數字，安全範圍內的整數存成整數
pub fn number_from_f64(f: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if !f.is_finite() {
        return Value::from(0);
    }
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::from(0))
}

/// 值的文字形式；null 視為沒有值
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(None));
        assert!(is_falsy(Some(&json!(null))));
        assert!(is_falsy(Some(&json!(0))));
        assert!(is_falsy(Some(&json!(0.0))));
        assert!(is_falsy(Some(&json!(""))));
        assert!(is_falsy(Some(&json!(false))));

        assert!(!is_falsy(Some(&json!(" "))));
        assert!(!is_falsy(Some(&json!(0.01))));
        assert!(!is_falsy(Some(&json!([]))));
        assert!(!is_falsy(Some(&json!({}))));
    }

    #[test]
    fn test_number_to_text() {
        assert_eq!(number_to_text(&Number::from(42)), "42");
        assert_eq!(number_to_text(&Number::from_f64(19.5).unwrap()), "19.5");
        assert_eq!(number_to_text(&Number::from_f64(5.0).unwrap()), "5");
        assert_eq!(number_to_text(&Number::from_f64(-3.0).unwrap()), "-3");
    }

    #[test]
    fn test_number_to_text_exponent_range() {
        let text = |f: f64| number_to_text(&Number::from_f64(f).unwrap());
        assert_eq!(text(1e21), "1e+21");
        assert_eq!(text(2.5e22), "2.5e+22");
        assert_eq!(text(-1e21), "-1e+21");
        assert_eq!(text(1e-7), "1e-7");
        assert_eq!(text(1.5e-7), "1.5e-7");
        assert_eq!(text(0.000001), "0.000001");
        assert_eq!(text(123456789012345680000.0), "123456789012345680000");
        assert_eq!(text(-0.0), "0");
    }

    #[test]
    fn test_number_from_f64() {
        assert_eq!(number_from_f64(12.0), json!(12));
        assert_eq!(number_from_f64(12.25), json!(12.25));
        assert_eq!(number_from_f64(f64::NAN), json!(0));
    }
}
