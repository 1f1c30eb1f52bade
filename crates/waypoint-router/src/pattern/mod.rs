/// Path expression compiler and matcher
///
/// A path expression is literal text with `:name` (required) and
/// `:?name` (optional) placeholders. Compiling produces:
/// - the token list with one capture group per placeholder
/// - an anchored matcher over the trimmed path plus an optional query string
///
/// Matching and extraction never depend on capture-group side effects:
/// each placeholder reads the capture index recorded at compile time.
use std::borrow::Cow;

use regex::Regex;
use serde_json::Value;

use crate::error::RouteError;
use crate::params::{decode_component, encode_component, encode_query, is_present, param_text, parse_query, RouteParams};
use crate::path::{canonical_path, split_query, trim_loose_slashes};

pub mod token;

pub use token::{tokenize, ParamToken, PatternToken};

/// Any run of characters that are neither `/` nor `?`
const SEGMENT_CAPTURE: &str = "([^/?]+)";

/// Optional query string: `?` followed by `key` or `key=value` pairs separated by `&`/`;`
const QUERY_SUFFIX: &str = r"(?:\?[^&;=#]*(?:=[^&;#]*)?(?:[&;][^&;=#]*(?:=[^&;#]*)?)*)?$";

/// A compiled path expression
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use waypoint_router::RoutePattern;
///
/// let pattern = RoutePattern::compile("/home/:userId/something/:somethingId").unwrap();
/// assert!(pattern.matches("/home/1/something/2"));
///
/// let params = pattern.extract_parameters("/home/1/something/2?tab=info");
/// assert_eq!(params.get("userId"), Some(&json!("1")));
/// assert_eq!(params.get("tab"), Some(&json!("info")));
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
    expression: String,
    trimmed: String,
    tokens: Vec<PatternToken>,
    param_names: Vec<String>,
    matcher: Regex,
}

impl RoutePattern {
    /// Compiles a path expression
    pub fn compile(expression: &str) -> Result<Self, RouteError> {
        let trimmed = trim_loose_slashes(expression).to_string();
        let tokens = tokenize(&trimmed);
        let param_names = tokens
            .iter()
            .filter_map(PatternToken::as_param)
            .map(|param| param.name.clone())
            .collect();

        let source = matcher_source(&tokens);
        let matcher = Regex::new(&source).map_err(|source| RouteError::InvalidPattern {
            expression: expression.to_string(),
            source,
        })?;

        Ok(Self {
            expression: expression.to_string(),
            trimmed,
            tokens,
            param_names,
            matcher,
        })
    }

    /// The expression as it was written
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The expression without its loose leading and trailing slash
    pub fn trimmed_expression(&self) -> &str {
        &self.trimmed
    }

    /// Placeholder names in declaration order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Source of the compiled matcher
    pub fn matcher_source(&self) -> &str {
        self.matcher.as_str()
    }

    /// Whether `path` (with or without loose slashes and a query string) matches
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(&matching_candidate(path))
    }

    /// Extracts placeholder values from the path and layers query values on top
    ///
    /// Placeholders without a captured segment (or all of them, when the
    /// path does not match) map to `null`. Query values win over path
    /// values with the same key.
    pub fn extract_parameters(&self, path: &str) -> RouteParams {
        let candidate = matching_candidate(path);
        let captures = self.matcher.captures(&candidate);

        let mut params: RouteParams = self
            .tokens
            .iter()
            .filter_map(PatternToken::as_param)
            .map(|param| {
                let value = captures
                    .as_ref()
                    .and_then(|caps| caps.get(param.capture))
                    .map(|segment| Value::String(decode_component(segment.as_str())))
                    .unwrap_or(Value::Null);
                (param.name.clone(), value)
            })
            .collect();

        if let (_, Some(query)) = split_query(path) {
            params.extend(parse_query(query));
        }

        params
    }

    /// Builds a concrete path from parameter values
    ///
    /// Placeholders named in `params` are substituted (URI-encoded).
    /// Required placeholders take any non-null value, `0` and `false`
    /// included. Optional placeholders without a present value collapse
    /// together with their leading separator. Keys that name no
    /// placeholder are appended as a query string in insertion order.
    ///
    /// An empty `params` map returns the expression untouched, placeholders
    /// included.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use waypoint_router::{RouteParams, RoutePattern};
    ///
    /// let pattern = RoutePattern::compile("/home/:userId/something/:somethingId").unwrap();
    /// let params = RouteParams::from([
    ///     ("userId".to_string(), json!(1)),
    ///     ("somethingId".to_string(), json!(2)),
    /// ]);
    /// assert_eq!(pattern.to_path(&params), "/home/1/something/2");
    /// assert_eq!(pattern.to_path(&RouteParams::new()), "/home/:userId/something/:somethingId");
    /// ```
    pub fn to_path(&self, params: &RouteParams) -> String {
        if params.is_empty() {
            return self.expression.clone();
        }

        let mut path = String::with_capacity(self.trimmed.len());
        for (index, token) in self.tokens.iter().enumerate() {
            match token {
                PatternToken::Literal(text) => path.push_str(text),
                PatternToken::Param(param) => {
                    let value = params.get(&param.name);
                    let substitution = value
                        .filter(|value| !param.optional || is_present(value))
                        .and_then(param_text)
                        .map(|text| encode_component(&text));

                    match (param.optional, substitution) {
                        (_, Some(encoded)) => path.push_str(&encoded),
                        (true, None) => {
                            let separated = index > 0 && self.tokens[index - 1].ends_with_separator();
                            if separated && path.ends_with('/') {
                                path.pop();
                            }
                        }
                        (false, None) if value.is_some() => {}
                        (false, None) => {
                            path.push(':');
                            path.push_str(&param.name);
                        }
                    }
                }
            }
        }

        let query = encode_query(
            params
                .iter()
                .filter(|(key, _)| !self.param_names.iter().any(|name| name == *key))
                .map(|(key, value)| (key.as_str(), value)),
        );

        let path = canonical_path(&path);
        if query.is_empty() {
            path.into_owned()
        } else {
            format!("{}?{}", path, query)
        }
    }
}

/// Builds the anchored matcher source for a token list (pure function)
fn matcher_source(tokens: &[PatternToken]) -> String {
    let mut source = String::from("^");

    for (index, token) in tokens.iter().enumerate() {
        match token {
            PatternToken::Literal(text) => {
                let next_is_optional =
                    matches!(tokens.get(index + 1), Some(PatternToken::Param(p)) if p.optional);
                let text = if next_is_optional {
                    text.strip_suffix('/').unwrap_or(text)
                } else {
                    text
                };
                source.push_str(&regex::escape(text));
            }
            PatternToken::Param(param) if param.optional => {
                let separated = index > 0 && tokens[index - 1].ends_with_separator();
                if separated {
                    source.push_str("(?:/");
                    source.push_str(SEGMENT_CAPTURE);
                    source.push_str(")?");
                } else {
                    source.push_str(SEGMENT_CAPTURE);
                    source.push('?');
                }
            }
            PatternToken::Param(_) => source.push_str(SEGMENT_CAPTURE),
        }
    }

    source.push_str(QUERY_SUFFIX);
    source
}

/// Path with loose slashes removed around the path part, query kept
fn matching_candidate(path: &str) -> Cow<'_, str> {
    match split_query(path) {
        (path_part, None) => Cow::Borrowed(trim_loose_slashes(path_part)),
        (path_part, Some(query)) => {
            Cow::Owned(format!("{}?{}", trim_loose_slashes(path_part), query))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_source_for_required_and_optional() {
        let pattern = RoutePattern::compile("/home/:userId/:?tab").unwrap();
        assert!(pattern
            .matcher_source()
            .starts_with("^home/([^/?]+)(?:/([^/?]+))?"));
    }

    #[test]
    fn test_leading_optional_has_no_separator() {
        let pattern = RoutePattern::compile("/:?lang").unwrap();
        assert!(pattern.matcher_source().starts_with("^([^/?]+)?(?:"));
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/cs"));
    }

    #[test]
    fn test_literal_regex_characters_are_escaped() {
        let pattern = RoutePattern::compile("/files/a.b+c").unwrap();
        assert!(pattern.matches("/files/a.b+c"));
        assert!(!pattern.matches("/files/aXb+c"));
    }

    #[test]
    fn test_required_param_left_in_place_when_not_supplied() {
        let pattern = RoutePattern::compile("/users/:id/:section").unwrap();
        let params = RouteParams::from([("id".to_string(), Value::from(5))]);
        assert_eq!(pattern.to_path(&params), "/users/5/:section");
    }
}
