//! Parsing of YAML manifests into typed resources
//!
//! The raw document is checked against the resource's `apiVersion` and `kind`
//! before it is decoded, so a manifest of the wrong type fails with the field
//! that is off rather than a decode error deep in the spec.

use kube::Resource;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

const UNNAMED: &str = "<unnamed>";

/// Parse a manifest and check it describes a `K`, keeping the raw document.
///
/// Fields the typed model does not know about survive in the returned value.
pub fn parse_manifest_value<K>(content: &str) -> Result<Value>
where
    K: Resource<DynamicType = ()>,
{
    let kind = K::kind(&());
    let value: Value = serde_yaml::from_str(content)
        .map_err(|e| Error::serialization_for_kind(kind.as_ref(), e))?;
    let name = value
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or(UNNAMED)
        .to_string();

    expect_str(&value, "kind", &kind, &name)?;
    expect_str(&value, "apiVersion", &K::api_version(&()), &name)?;
    Ok(value)
}

/// Parse a manifest into a typed `K`
pub fn parse_manifest<K>(content: &str) -> Result<K>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    let value = parse_manifest_value::<K>(content)?;
    serde_json::from_value(value)
        .map_err(|e| Error::serialization_for_kind(K::kind(&()).as_ref(), e))
}

fn expect_str(value: &Value, field: &str, expected: &str, name: &str) -> Result<()> {
    match value.get(field).and_then(Value::as_str) {
        Some(found) if found == expected => Ok(()),
        Some(found) => Err(Error::validation_for_field(
            name,
            field,
            format!("expected {expected}, found {found}"),
        )),
        None => Err(Error::validation_for_field(
            name,
            field,
            format!("missing, expected {expected}"),
        )),
    }
}
