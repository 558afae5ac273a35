//! Defensive accessors over loosely-typed documents.
//!
//! Store documents are heterogeneous: a field may be missing, null, or of an
//! unexpected JSON type. Everything in here maps those cases to `None` instead
//! of failing, so one odd record never takes down a whole table.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Walks a dotted path (`modelConfig.costConfig.defaultCost`) through nested objects.
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = doc;
    for key in path.split('.') {
        cur = cur.as_object()?.get(key)?;
    }
    if cur.is_null() {
        None
    } else {
        Some(cur)
    }
}

/// Scalar → string. Objects are only accepted in the `{"$oid": …}` shape.
pub fn as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(m) => m.get("$oid").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    }
}

/// Numeric coercion: JSON numbers and numeric strings; everything else is `None`.
pub fn to_numeric(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(m) => m
            .get("$numberDouble")
            .or_else(|| m.get("$numberInt"))
            .or_else(|| m.get("$numberLong"))
            .or_else(|| m.get("$numberDecimal"))
            .and_then(to_numeric),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Python-style truthiness: null, false, 0, "" and empty containers are falsy.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

/// Renders a value the way it would show up as a table cell.
pub fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `deserialize_with` helper: any JSON value, kept only if it reads as a string.
pub fn string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(as_string))
}

/// `deserialize_with` helper for nested blocks: a block of the wrong shape is dropped.
pub fn nested<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.and_then(|v| serde_json::from_value(v).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_path_nested_and_missing() {
        let doc = json!({"a": {"b": {"c": 3}, "n": null}, "s": "x"});
        assert_eq!(get_path(&doc, "a.b.c"), Some(&json!(3)));
        assert_eq!(get_path(&doc, "a.n"), None);
        assert_eq!(get_path(&doc, "a.missing"), None);
        assert_eq!(get_path(&doc, "s.deeper"), None);
    }

    #[test]
    fn test_to_numeric_coerces() {
        assert_eq!(to_numeric(&json!(2.5)), Some(2.5));
        assert_eq!(to_numeric(&json!("0.75")), Some(0.75));
        assert_eq!(to_numeric(&json!({"$numberLong": "12"})), Some(12.0));
        assert_eq!(to_numeric(&json!("n/a")), None);
        assert_eq!(to_numeric(&json!(true)), None);
        assert_eq!(to_numeric(&json!([1])), None);
        assert_eq!(to_numeric(&json!("NaN")), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&Value::Null));
        assert!(is_truthy(&json!("eleven_v3")));
        assert!(is_truthy(&json!({"k": 1})));
    }

    #[test]
    fn test_as_string_accepts_object_id() {
        assert_eq!(
            as_string(&json!({"$oid": "65f0c0ffee"})),
            Some("65f0c0ffee".to_string())
        );
        assert_eq!(as_string(&json!(7)), Some("7".to_string()));
        assert_eq!(as_string(&json!([1, 2])), None);
    }
}
