//! Nested field lookup in JSON values.

use serde_json::Value;

/// Something that can be turned into path segments.
pub trait PathSegments {
    fn segments(&self) -> Vec<&str>;
}

impl PathSegments for str {
    /// Splits on `.` and on bracket boundaries: `a.b[0].c` -> `a`, `b`, `0`, `c`.
    fn segments(&self) -> Vec<&str> {
        self.split(['.', '[', ']'])
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

impl PathSegments for String {
    fn segments(&self) -> Vec<&str> {
        self.as_str().segments()
    }
}

impl PathSegments for [&str] {
    fn segments(&self) -> Vec<&str> {
        self.to_vec()
    }
}

impl<const N: usize> PathSegments for [&str; N] {
    fn segments(&self) -> Vec<&str> {
        self.to_vec()
    }
}

impl PathSegments for Vec<&str> {
    fn segments(&self) -> Vec<&str> {
        self.clone()
    }
}

impl PathSegments for [String] {
    fn segments(&self) -> Vec<&str> {
        self.iter().map(String::as_str).collect()
    }
}

impl PathSegments for Vec<String> {
    fn segments(&self) -> Vec<&str> {
        self.as_slice().segments()
    }
}

/// Reads the value at `path`, or `None` as soon as an intermediate is missing
/// or is not an object/array. An explicit `null` at the end of the path is
/// returned as `Some(Value::Null)`.
pub fn get<'v, P>(object: &'v Value, path: &P) -> Option<&'v Value>
where
    P: PathSegments + ?Sized,
{
    path.segments()
        .into_iter()
        .try_fold(object, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Like [`get`], falling back to `default` when the path does not resolve.
pub fn get_or<'v, P>(object: &'v Value, path: &P, default: &'v Value) -> &'v Value
where
    P: PathSegments + ?Sized,
{
    get(object, path).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dotted_lookup() {
        let data = json!({ "address": { "city": "Paris", "zip": 75001 } });
        assert_eq!(get(&data, "address.city"), Some(&json!("Paris")));
        assert_eq!(get(&data, "address.zip"), Some(&json!(75001)));
        assert_eq!(get(&data, "address"), Some(&json!({ "city": "Paris", "zip": 75001 })));
    }

    #[test]
    fn test_bracket_indices() {
        let data = json!({ "products": [{ "sku": "a" }, { "sku": "b" }] });
        assert_eq!(get(&data, "products[1].sku"), Some(&json!("b")));
        assert_eq!(get(&data, "products.0.sku"), Some(&json!("a")));
        assert_eq!(get(&data, "products[2].sku"), None);
        assert_eq!(get(&data, "products[x]"), None);
    }

    #[test]
    fn test_pre_split_segments() {
        let data = json!({ "a.b": { "c": true } });
        assert_eq!(get(&data, &["a.b", "c"]), Some(&json!(true)));
        let owned = vec!["a.b".to_string(), "c".to_string()];
        assert_eq!(get(&data, &owned), Some(&json!(true)));
    }

    #[test]
    fn test_missing_and_null_intermediates() {
        let data = json!({ "a": null, "b": "text" });
        assert_eq!(get(&data, "a"), Some(&Value::Null));
        assert_eq!(get(&data, "a.b"), None);
        assert_eq!(get(&data, "b.length"), None);
        assert_eq!(get(&data, "missing.deeper.still"), None);
        assert_eq!(get(&Value::Null, "a"), None);
    }

    #[test]
    fn test_default() {
        let data = json!({ "a": { "b": null } });
        let fallback = json!("fallback");
        assert_eq!(get_or(&data, "a.c", &fallback), &fallback);
        assert_eq!(get_or(&data, "a.b", &fallback), &Value::Null);
    }

    #[test]
    fn test_empty_path_returns_object() {
        let data = json!({ "a": 1 });
        assert_eq!(get(&data, ""), Some(&data));
    }
}
