//! Structural equality with explicit nil/empty semantics
//!
//! Kubernetes objects round-trip through the API server and through other
//! controllers, which freely turn an absent list into `[]` or an absent map
//! into `{}`. Whether that counts as a difference depends on the field, so
//! every comparison names its [`NilPolicy`] instead of relying on `PartialEq`.
//!
//! Values are compared on their serialized JSON form. That keeps the rules
//! identical for our own CRD types and for the `k8s-openapi` types they embed.

use serde::Serialize;
use serde_json::Value;

/// How absent values compare against empty collections
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NilPolicy {
    /// `null`, a missing key, `[]` and `{}` are all the same value,
    /// at every depth of the structure
    #[default]
    EqualsEmpty,
    /// Absent and empty are different opinions
    Strict,
    /// Like [`NilPolicy::EqualsEmpty`] below the top level, but an absent
    /// value never equals a present one, even an empty one. For optional
    /// structs, where `Some(default)` is a choice and not a missing list.
    PresenceStrict,
}

/// Compare two values under the given nil policy.
///
/// A value that fails to serialize never compares equal, so the caller
/// falls back to writing the desired value.
pub fn deep_equal<T: Serialize + ?Sized>(a: &T, b: &T, nils: NilPolicy) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => values_equal(&a, &b, nils),
        _ => false,
    }
}

/// Compare two JSON values under the given nil policy
pub fn values_equal(a: &Value, b: &Value, nils: NilPolicy) -> bool {
    match nils {
        NilPolicy::Strict => a == b,
        NilPolicy::EqualsEmpty => lenient_equal(a, b),
        NilPolicy::PresenceStrict => a.is_null() == b.is_null() && lenient_equal(a, b),
    }
}

/// Returns true for JSON values that carry no opinion: `null`, `""`, `0`,
/// `false`, `[]` and `{}`.
pub fn is_zero_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Serialize a value and report whether it is a zero value.
///
/// Serialization failures count as non-zero so they are never skipped.
pub fn is_zero<T: Serialize + ?Sized>(value: &T) -> bool {
    serde_json::to_value(value)
        .map(|v| is_zero_value(&v))
        .unwrap_or(false)
}

/// Returns true when a value serializes to `null` (an unset `Option`).
///
/// Unlike [`is_zero`], a present-but-empty value is not absent.
pub fn is_absent<T: Serialize + ?Sized>(value: &T) -> bool {
    matches!(serde_json::to_value(value), Ok(Value::Null))
}

fn is_nil_like(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn lenient_equal(a: &Value, b: &Value) -> bool {
    if is_nil_like(a) && is_nil_like(b) {
        return true;
    }
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| lenient_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            // A key missing on one side is the same as an explicit null there
            x.iter()
                .all(|(k, v)| lenient_equal(v, y.get(k).unwrap_or(&Value::Null)))
                && y.iter()
                    .filter(|(k, _)| !x.contains_key(*k))
                    .all(|(_, v)| is_nil_like(v))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::{Affinity, EnvVar, PodSecurityContext, Toleration};
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn none_and_empty_vec_are_equal_when_lenient() {
        let a: Option<Vec<EnvVar>> = None;
        let b: Option<Vec<EnvVar>> = Some(vec![]);
        assert!(deep_equal(&a, &b, NilPolicy::EqualsEmpty));
        assert!(!deep_equal(&a, &b, NilPolicy::Strict));
    }

    #[test]
    fn empty_map_and_none_are_equal_when_lenient() {
        let a: Option<BTreeMap<String, String>> = Some(BTreeMap::new());
        let b: Option<BTreeMap<String, String>> = None;
        assert!(deep_equal(&a, &b, NilPolicy::EqualsEmpty));
    }

    #[test]
    fn nested_empty_collections_are_tolerated() {
        let a = Toleration {
            key: Some("dedicated".to_string()),
            ..Default::default()
        };
        let left = vec![a.clone()];
        let right = vec![a];
        assert!(deep_equal(&left, &right, NilPolicy::Strict));

        let with_empty = json!({"labels": {}, "env": [], "name": "zk"});
        let without = json!({"name": "zk"});
        assert!(values_equal(&with_empty, &without, NilPolicy::EqualsEmpty));
        assert!(!values_equal(&with_empty, &without, NilPolicy::Strict));
    }

    #[test]
    fn present_empty_struct_differs_from_absent_under_strict() {
        let absent: Option<Affinity> = None;
        let empty: Option<Affinity> = Some(Affinity::default());
        assert!(!deep_equal(&absent, &empty, NilPolicy::Strict));
    }

    /// Story: an explicit empty security context is a setting; dropping it
    /// is drift even though its fields are all unset
    #[test]
    fn story_presence_strict_separates_absent_from_empty_struct() {
        let absent: Option<PodSecurityContext> = None;
        let empty = Some(PodSecurityContext::default());
        assert!(deep_equal(&absent, &empty, NilPolicy::EqualsEmpty));
        assert!(!deep_equal(&absent, &empty, NilPolicy::PresenceStrict));
        assert!(deep_equal(&absent, &absent, NilPolicy::PresenceStrict));
    }

    #[test]
    fn presence_strict_is_lenient_below_the_top_level() {
        let with_empty = json!({"runAsUser": 1000, "supplementalGroups": []});
        let without = json!({"runAsUser": 1000});
        assert!(values_equal(&with_empty, &without, NilPolicy::PresenceStrict));
        assert!(!values_equal(&with_empty, &without, NilPolicy::Strict));
    }

    #[test]
    fn real_differences_are_detected() {
        let a = vec![EnvVar {
            name: "A".to_string(),
            value: Some("1".to_string()),
            ..Default::default()
        }];
        let b = vec![EnvVar {
            name: "A".to_string(),
            value: Some("2".to_string()),
            ..Default::default()
        }];
        assert!(!deep_equal(&a, &b, NilPolicy::EqualsEmpty));
        assert!(!deep_equal(&1, &2, NilPolicy::EqualsEmpty));
        assert!(!deep_equal("a", "b", NilPolicy::EqualsEmpty));
    }

    #[test]
    fn list_order_matters() {
        let a = json!(["x", "y"]);
        let b = json!(["y", "x"]);
        assert!(!values_equal(&a, &b, NilPolicy::EqualsEmpty));
    }

    #[test]
    fn empty_string_is_not_nil() {
        assert!(!values_equal(&json!(""), &Value::Null, NilPolicy::EqualsEmpty));
    }

    #[rstest]
    #[case::null(json!(null), true)]
    #[case::empty_string(json!(""), true)]
    #[case::zero(json!(0), true)]
    #[case::empty_list(json!([]), true)]
    #[case::empty_object(json!({}), true)]
    #[case::tag(json!("3.8"), false)]
    #[case::count(json!(3), false)]
    #[case::object(json!({"a": 1}), false)]
    fn zero_values(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_zero_value(&value), expected);
    }

    #[test]
    fn is_zero_serializes_first() {
        assert!(is_zero(&String::new()));
        assert!(is_zero(&Option::<Affinity>::None));
        assert!(is_zero(&Some(Affinity::default())));
        assert!(!is_zero("cluster.local"));
    }

    #[test]
    fn absence_is_only_null() {
        assert!(is_absent(&Option::<Affinity>::None));
        assert!(!is_absent(&Some(Affinity::default())));
        assert!(!is_absent(&Vec::<EnvVar>::new()));
    }
}
