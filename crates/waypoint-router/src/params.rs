/// Route parameter values and query-string helpers
///
/// Parameter values are JSON values so that the same map can carry
/// path segments (strings), bare query flags (`true`), values supplied
/// by callers when building links (numbers, booleans) and missing
/// optional segments (`null`).
use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::Value;

/// Parameters extracted from, or used to build, a route path
///
/// Keys keep insertion order, so leftover keys appear in the query string
/// in the order the caller supplied them.
pub type RouteParams = IndexMap<String, Value>;

/// Text form of a parameter value, `None` for `null`
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use waypoint_router::params::param_text;
///
/// assert_eq!(param_text(&json!("abc")).as_deref(), Some("abc"));
/// assert_eq!(param_text(&json!(12)).as_deref(), Some("12"));
/// assert_eq!(param_text(&json!(null)), None);
/// ```
pub fn param_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Bool(flag) => Some(Cow::Borrowed(if *flag { "true" } else { "false" })),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Whether a value counts as "present" when substituting optional placeholders
///
/// `null`, `false`, `0` and the empty string are absent. Required
/// placeholders take any non-null value.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        _ => true,
    }
}

/// URI-decodes a path or query component
///
/// Malformed escape sequences leave the component as it was received.
pub fn decode_component(component: &str) -> String {
    match urlencoding::decode(component) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            tracing::debug!(component, error = %err, "keeping undecodable route component");
            component.to_string()
        }
    }
}

/// URI-encodes a path or query component
pub fn encode_component(component: &str) -> String {
    urlencoding::encode(component).into_owned()
}

/// Parses a raw query string (without the leading `?`)
///
/// Pairs are separated by `&` or `;`. `key=value` pairs are decoded,
/// a bare `key` yields `true`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use waypoint_router::params::parse_query;
///
/// let query = parse_query("page=2&draft;q=a%20b");
/// assert_eq!(query.get("page"), Some(&json!("2")));
/// assert_eq!(query.get("draft"), Some(&json!(true)));
/// assert_eq!(query.get("q"), Some(&json!("a b")));
/// ```
pub fn parse_query(query: &str) -> RouteParams {
    query
        .split(['&', ';'])
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Some((
                decode_component(key),
                Value::String(decode_component(value)),
            )),
            Some(_) => None,
            None => Some((decode_component(pair), Value::Bool(true))),
        })
        .collect()
}

/// Encodes `key=value` pairs into a query string (without the leading `?`)
///
/// `null` values are skipped.
pub fn encode_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| {
            param_text(value).map(|text| {
                format!("{}={}", encode_component(key), encode_component(&text))
            })
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_present() {
        assert!(is_present(&json!("a")));
        assert!(is_present(&json!(1)));
        assert!(is_present(&json!(true)));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!(false)));
        assert!(!is_present(&Value::Null));
    }

    #[test]
    fn test_parse_query_ignores_empty_pairs_and_keys() {
        let query = parse_query("&a=1&&=x&b");
        assert_eq!(query.len(), 2);
        assert_eq!(query.get("a"), Some(&json!("1")));
        assert_eq!(query.get("b"), Some(&json!(true)));
    }

    #[test]
    fn test_parse_query_keeps_equals_in_value() {
        let query = parse_query("token=a=b");
        assert_eq!(query.get("token"), Some(&json!("a=b")));
    }

    #[test]
    fn test_decode_component_keeps_malformed_input() {
        assert_eq!(decode_component("a%20b"), "a b");
        assert_eq!(decode_component("%E0%A4%A"), "%E0%A4%A");
    }

    #[test]
    fn test_encode_query_skips_null() {
        let values = [("a", json!("x y")), ("b", Value::Null), ("c", json!(3))];
        let encoded = encode_query(values.iter().map(|(k, v)| (*k, v)));
        assert_eq!(encoded, "a=x%20y&c=3");
    }
}
