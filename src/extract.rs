//! Identifier extraction from schema-free upstream records.
//!
//! Upstream JSON carries user and post identifiers in either string form
//! (`userIdStr`, `postIdStr`, preferred) or numeric form (`userId`,
//! `postId`, rendered without a fractional part). Profiles enumerate
//! posts through a `posts` list when present, with a recursive key scan
//! as fallback.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Authoritative user id of a post record, if present.
#[must_use]
pub fn user_id(record: &Map<String, Value>) -> Option<String> {
    id_from_fields(record, "userIdStr", "userId")
}

/// Authoritative post id of a post record, if present.
#[must_use]
pub fn real_post_id(record: &Map<String, Value>) -> Option<String> {
    id_from_fields(record, "postIdStr", "postId")
}

fn id_from_fields(record: &Map<String, Value>, str_key: &str, num_key: &str) -> Option<String> {
    if let Some(Value::String(s)) = record.get(str_key) {
        if !s.is_empty() {
            return Some(s.clone());
        }
    }
    record.get(num_key).and_then(integer_id)
}

/// Render a numeric JSON value as an integer id.
fn integer_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| format!("{f:.0}"))
            }
        }
        _ => None,
    }
}

/// Enumerate post ids referenced by a profile, in discovery order.
///
/// The top-level `posts` list is preferred: string elements are taken
/// verbatim, numbers rendered as integers, and map elements contribute
/// their `postIdStr`/`postId` field. Only when that yields nothing is
/// the whole tree scanned recursively for `postId`/`postIdStr` keys
/// (case-insensitive). Blank ids are dropped and duplicates collapse to
/// their first occurrence.
#[must_use]
pub fn collect_post_ids(profile: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    if let Some(Value::Array(items)) = profile.get("posts") {
        for item in items {
            match item {
                Value::String(s) => push_id(&mut seen, &mut ids, s),
                Value::Number(_) => {
                    if let Some(id) = integer_id(item) {
                        push_id(&mut seen, &mut ids, &id);
                    }
                }
                Value::Object(map) => {
                    if let Some(id) = id_from_fields(map, "postIdStr", "postId") {
                        push_id(&mut seen, &mut ids, &id);
                    }
                }
                _ => {}
            }
        }
    }

    if ids.is_empty() {
        scan_for_post_ids(profile, &mut seen, &mut ids);
    }

    ids
}

fn scan_for_post_ids(value: &Value, seen: &mut HashSet<String>, ids: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = key.to_ascii_lowercase();
                if key == "postid" || key == "postidstr" {
                    match child {
                        Value::String(s) => push_id(seen, ids, s),
                        Value::Number(_) => {
                            if let Some(id) = integer_id(child) {
                                push_id(seen, ids, &id);
                            }
                        }
                        _ => {}
                    }
                }
                scan_for_post_ids(child, seen, ids);
            }
        }
        Value::Array(items) => {
            for child in items {
                scan_for_post_ids(child, seen, ids);
            }
        }
        _ => {}
    }
}

fn push_id(seen: &mut HashSet<String>, ids: &mut Vec<String>, id: &str) {
    let id = id.trim();
    if id.is_empty() {
        return;
    }
    if seen.insert(id.to_string()) {
        ids.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_string_id_preferred_over_numeric() {
        let record = as_map(json!({"userIdStr": "u1", "userId": 999}));
        assert_eq!(user_id(&record), Some("u1".to_string()));
    }

    #[test]
    fn test_numeric_ids_render_without_fraction() {
        let record = as_map(json!({"postId": 42, "userId": 7}));
        assert_eq!(real_post_id(&record), Some("42".to_string()));
        assert_eq!(user_id(&record), Some("7".to_string()));

        // IDs decoded as floats still come out as plain integers.
        let record = as_map(json!({"postId": 42.0}));
        assert_eq!(real_post_id(&record), Some("42".to_string()));
    }

    #[test]
    fn test_empty_string_id_falls_back_to_numeric() {
        let record = as_map(json!({"postIdStr": "", "postId": 5}));
        assert_eq!(real_post_id(&record), Some("5".to_string()));
    }

    #[test]
    fn test_missing_ids_yield_none() {
        let record = as_map(json!({"description": "no ids here"}));
        assert_eq!(user_id(&record), None);
        assert_eq!(real_post_id(&record), None);
    }

    #[test]
    fn test_posts_list_mixes_strings_numbers_and_maps() {
        let profile = json!({
            "posts": ["77", 88, {"postIdStr": "99"}, {"postId": 100}, null, true]
        });
        assert_eq!(collect_post_ids(&profile), vec!["77", "88", "99", "100"]);
    }

    #[test]
    fn test_posts_list_suppresses_fallback_scan() {
        let profile = json!({
            "posts": ["77"],
            "feed": {"items": [{"postIdStr": "hidden"}]}
        });
        assert_eq!(collect_post_ids(&profile), vec!["77"]);
    }

    #[test]
    fn test_fallback_scans_whole_tree() {
        let profile = json!({
            "feed": {"items": [{"postIdStr": "x1"}, {"postId": 2}]}
        });
        assert_eq!(collect_post_ids(&profile), vec!["x1", "2"]);
    }

    #[test]
    fn test_fallback_matches_keys_case_insensitively() {
        let profile = json!({"wrapped": {"PostID": 11, "POSTIDSTR": "s12"}});
        let ids = collect_post_ids(&profile);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"11".to_string()));
        assert!(ids.contains(&"s12".to_string()));
    }

    #[test]
    fn test_blank_and_duplicate_ids_dropped() {
        let profile = json!({"posts": ["  ", "77", "77", ""]});
        assert_eq!(collect_post_ids(&profile), vec!["77"]);
    }

    #[test]
    fn test_non_array_posts_field_uses_fallback() {
        let profile = json!({
            "posts": "not a list",
            "items": [{"postId": 3}]
        });
        assert_eq!(collect_post_ids(&profile), vec!["3"]);
    }
}
