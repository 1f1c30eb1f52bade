//! Integration tests for waypoint-router
//!
//! Tests are organized by feature area and cover:
//! - Matching (loose slashes, query strings, optional placeholders)
//! - Parameter extraction (decoding, missing segments, query precedence)
//! - Path building (substitution, optional collapse, query suffix)
//! - Route table (ordering, duplicates, removal)

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use waypoint_router::*;

fn params(pairs: &[(&str, Value)]) -> RouteParams {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

// ============================================================================
// Matching
// ============================================================================

#[rstest]
#[case("/something/param1", true)]
#[case("/something/param1/", true)]
#[case("something/param1", true)]
#[case("/something/param1?query=1", true)]
#[case("/something/param1?a=1&b;c=3", true)]
#[case("/something/param1/?query=1", true)]
#[case("/something/", false)]
#[case("/something/param1/param2", false)]
#[case("/something/param1/param2/param3/", false)]
#[case("/other/param1", false)]
fn test_required_param_matching(#[case] path: &str, #[case] expected: bool) {
    let pattern = RoutePattern::compile("/something/:param1").unwrap();
    assert_eq!(pattern.matches(path), expected, "path {path}");
}

#[rstest]
#[case("/user/12", true)]
#[case("/user/12/info", true)]
#[case("/user/12/info/", true)]
#[case("/user", false)]
#[case("/user/12/info/more", false)]
fn test_optional_param_matching(#[case] path: &str, #[case] expected: bool) {
    let pattern = RoutePattern::compile("/user/:userId/:?tab").unwrap();
    assert_eq!(pattern.matches(path), expected, "path {path}");
}

#[test]
fn test_root_expression_matches_root_and_query_only() {
    let pattern = RoutePattern::compile("/").unwrap();
    assert!(pattern.matches("/"));
    assert!(pattern.matches(""));
    assert!(pattern.matches("/?utm=1"));
    assert!(!pattern.matches("/home"));
}

#[test]
fn test_sub_segment_placeholders() {
    let pattern = RoutePattern::compile("/files/:name.:ext").unwrap();
    assert!(pattern.matches("/files/report.pdf"));

    let extracted = pattern.extract_parameters("/files/report.pdf");
    assert_eq!(extracted.get("name"), Some(&json!("report")));
    assert_eq!(extracted.get("ext"), Some(&json!("pdf")));
}

// ============================================================================
// Parameter extraction
// ============================================================================

#[test]
fn test_extract_required_params() {
    let pattern = RoutePattern::compile("/home/:userId/something/:somethingId").unwrap();
    assert_eq!(
        pattern.extract_parameters("/home/1/something/2"),
        params(&[("userId", json!("1")), ("somethingId", json!("2"))])
    );
}

#[test]
fn test_extract_from_unmatched_path_yields_null_params() {
    let pattern = RoutePattern::compile("/home/:userId/something/:somethingId").unwrap();
    assert_eq!(
        pattern.extract_parameters("/home/1/something"),
        params(&[("userId", Value::Null), ("somethingId", Value::Null)])
    );
}

#[test]
fn test_extract_missing_optional_is_null() {
    let pattern = RoutePattern::compile("/user/:userId/:?tab/:?sub").unwrap();
    assert_eq!(
        pattern.extract_parameters("/user/5/posts"),
        params(&[
            ("userId", json!("5")),
            ("tab", json!("posts")),
            ("sub", Value::Null),
        ])
    );
}

#[test]
fn test_extract_decodes_segments() {
    let pattern = RoutePattern::compile("/search/:term").unwrap();
    let extracted = pattern.extract_parameters("/search/rust%20lang%2Fcore");
    assert_eq!(extracted.get("term"), Some(&json!("rust lang/core")));
}

#[test]
fn test_query_values_override_path_values() {
    let pattern = RoutePattern::compile("/item/:id").unwrap();
    let extracted = pattern.extract_parameters("/item/1?id=2&preview&name=a%26b");
    assert_eq!(
        extracted,
        params(&[
            ("id", json!("2")),
            ("preview", json!(true)),
            ("name", json!("a&b")),
        ])
    );
}

#[test]
fn test_param_names_keep_declaration_order() {
    let pattern = RoutePattern::compile("/:b/:?a/:c").unwrap();
    assert_eq!(pattern.param_names(), ["b", "a", "c"]);
}

// ============================================================================
// Path building
// ============================================================================

#[test]
fn test_to_path_substitutes_required_params() {
    let pattern = RoutePattern::compile("/home/:userId/something/:somethingId").unwrap();
    assert_eq!(
        pattern.to_path(&params(&[("userId", json!(1)), ("somethingId", json!(2))])),
        "/home/1/something/2"
    );
}

#[rstest]
#[case(json!(0), "0")]
#[case(json!(false), "false")]
fn test_to_path_substitutes_falsy_required_values(#[case] value: Value, #[case] text: &str) {
    let pattern = RoutePattern::compile("/home/:userId/something/:somethingId").unwrap();
    let path = pattern.to_path(&params(&[("userId", value), ("somethingId", json!(2))]));
    assert_eq!(path, format!("/home/{text}/something/2"));

    let restored = pattern.extract_parameters(&path);
    assert_eq!(restored.get("userId"), Some(&json!(text)));
    assert_eq!(restored.get("somethingId"), Some(&json!("2")));
}

#[test]
fn test_to_path_without_params_returns_expression() {
    let pattern = RoutePattern::compile("/user/:userId/:?tab").unwrap();
    assert_eq!(pattern.to_path(&RouteParams::new()), "/user/:userId/:?tab");
}

#[test]
fn test_to_path_collapses_absent_optional_params() {
    let pattern = RoutePattern::compile("/user/:userId/:?tab/edit").unwrap();
    assert_eq!(
        pattern.to_path(&params(&[("userId", json!("a")), ("tab", Value::Null)])),
        "/user/a/edit"
    );
    assert_eq!(
        pattern.to_path(&params(&[("userId", json!("a")), ("tab", json!(""))])),
        "/user/a/edit"
    );
    assert_eq!(
        pattern.to_path(&params(&[("userId", json!("a")), ("tab", json!(0))])),
        "/user/a/edit"
    );
    assert_eq!(
        pattern.to_path(&params(&[("userId", json!("a"))])),
        "/user/a/edit"
    );
    assert_eq!(
        pattern.to_path(&params(&[("userId", json!("a")), ("tab", json!("posts"))])),
        "/user/a/posts/edit"
    );
}

#[test]
fn test_to_path_appends_unknown_keys_as_query() {
    let pattern = RoutePattern::compile("/search/:term").unwrap();
    assert_eq!(
        pattern.to_path(&params(&[
            ("term", json!("a b")),
            ("page", json!(2)),
            ("sort", json!("new&hot")),
        ])),
        "/search/a%20b?page=2&sort=new%26hot"
    );
}

#[test]
fn test_to_path_query_keeps_insertion_order() {
    let pattern = RoutePattern::compile("/search/:term").unwrap();
    assert_eq!(
        pattern.to_path(&params(&[
            ("term", json!("rust")),
            ("sort", json!("new")),
            ("page", json!(2)),
            ("filter", json!(true)),
        ])),
        "/search/rust?sort=new&page=2&filter=true"
    );
}

#[test]
fn test_to_path_round_trip() {
    let expressions = [
        "/home/:userId/something/:somethingId",
        "/:lang/articles/:slug",
        "/files/:name.:ext",
    ];
    let values = ["1", "hello world", "a/b", "žluťoučký", "x%y"];

    for expression in expressions {
        let pattern = RoutePattern::compile(expression).unwrap();
        for value in values {
            let supplied: RouteParams = pattern
                .param_names()
                .iter()
                .map(|name| (name.clone(), json!(value)))
                .collect();
            let path = pattern.to_path(&supplied);
            let restored = pattern.extract_parameters(&path);

            for name in pattern.param_names() {
                assert_eq!(restored.get(name), supplied.get(name), "{expression} via {path}");
            }
        }
    }
}

// ============================================================================
// Route table
// ============================================================================

#[test]
fn test_duplicate_route_name_is_rejected_and_table_unchanged() {
    let mut table = RouteTable::new();
    table.add(Route::new("home", "/", "first").unwrap()).unwrap();

    let err = table
        .add(Route::new("home", "/other", "second").unwrap())
        .unwrap_err();
    assert!(matches!(err, RouteError::DuplicateRoute { ref name } if name == "home"));

    assert_eq!(table.len(), 1);
    assert_eq!(table.get("home").map(|r| *r.target()), Some("first"));
    assert_eq!(table.get("home").map(Route::path_expression), Some("/"));
}

#[test]
fn test_earlier_routes_shadow_later_ones() {
    let mut table = RouteTable::new();
    table.add(Route::new("any", "/:page", 1).unwrap()).unwrap();
    table.add(Route::new("about", "/about", 2).unwrap()).unwrap();

    assert_eq!(table.resolve("/about").map(Route::name), Some("any"));
}

#[test]
fn test_route_delegates_to_pattern() {
    let route = Route::new("post", "/post/:id", ()).unwrap();
    assert!(route.matches("/post/3/"));
    assert_eq!(route.extract_parameters("/post/3").get("id"), Some(&json!("3")));
    assert_eq!(
        route.to_path(&params(&[("id", json!(9)), ("ref", json!("home"))])),
        "/post/9?ref=home"
    );
}
