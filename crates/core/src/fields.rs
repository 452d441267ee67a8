//! Ordered field probing over generic JSON responses.
//!
//! The job service names the same datum differently across endpoints and
//! versions. Each datum is therefore described as an ordered list of
//! [`Probe`]s; the first probe that resolves to a non-null value wins.

use serde_json::Value;

/// A path of object keys, e.g. `&["tweet_snapshot", "url"]`.
pub type FieldPath = &'static [&'static str];

/// Which record a probe reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Summary,
    Detail,
}

/// One step of a fallback chain.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub source: Source,
    pub path: FieldPath,
}

/// Probe the job detail.
pub const fn detail(path: FieldPath) -> Probe {
    Probe {
        source: Source::Detail,
        path,
    }
}

/// Probe the listing entry.
pub const fn summary(path: FieldPath) -> Probe {
    Probe {
        source: Source::Summary,
        path,
    }
}

/// Follow `path` through nested objects. Null counts as absent.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    (!current.is_null()).then_some(current)
}

/// Return the first value any probe resolves to, in probe order.
pub fn first_present<'a>(
    summary: &'a Value,
    detail: &'a Value,
    probes: &[Probe],
) -> Option<&'a Value> {
    probes.iter().find_map(|probe| {
        let record = match probe.source {
            Source::Summary => summary,
            Source::Detail => detail,
        };
        lookup(record, probe.path)
    })
}

/// Loose truthiness: null, `false`, zero and the empty string are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// True if any of the top-level `fields` of `body` is truthy.
pub fn any_truthy(body: &Value, fields: &[&str]) -> bool {
    fields
        .iter()
        .filter_map(|field| lookup(body, &[*field]))
        .any(is_truthy)
}

/// Render a scalar for display. Strings are taken verbatim, other values
/// use their JSON text.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_follows_nested_path() {
        let v = json!({"tweet_snapshot": {"url": "https://x/1"}});
        assert_eq!(lookup(&v, &["tweet_snapshot", "url"]), Some(&json!("https://x/1")));
    }

    #[test]
    fn lookup_treats_null_and_missing_as_absent() {
        let v = json!({"a": null, "b": 3});
        assert_eq!(lookup(&v, &["a"]), None);
        assert_eq!(lookup(&v, &["missing"]), None);
        assert_eq!(lookup(&v, &["b", "c"]), None);
    }

    #[test]
    fn first_present_honours_probe_order_across_sources() {
        let s = json!({"work_url": "summary-url", "tweet_url": "tweet-url"});
        let d = json!({"work_url": "detail-url"});
        let probes = [detail(&["work_url"]), summary(&["tweet_url"])];
        assert_eq!(first_present(&s, &d, &probes), Some(&json!("detail-url")));

        let probes = [summary(&["tweet_url"]), detail(&["work_url"])];
        assert_eq!(first_present(&s, &d, &probes), Some(&json!("tweet-url")));
    }

    #[test]
    fn first_present_skips_probes_on_non_objects() {
        let s = json!([1, 2]);
        let d = json!("scalar");
        assert_eq!(first_present(&s, &d, &[summary(&["x"]), detail(&["y"])]), None);
    }

    #[test]
    fn truthiness_table() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn any_truthy_checks_every_field() {
        let body = json!({"ok": false, "verified": true});
        assert!(any_truthy(&body, &["ok", "verified"]));
        assert!(!any_truthy(&body, &["ok", "success"]));
        assert!(!any_truthy(&json!({}), &["ok"]));
    }

    #[test]
    fn display_text_unquotes_strings() {
        assert_eq!(display_text(&json!("alice")), "alice");
        assert_eq!(display_text(&json!(42)), "42");
    }
}
