//! Request URL building
//!
//! Renders validated path parameters into the endpoint's URI template
//! and appends an allow-listed, form-encoded query string. Undeclared
//! caller keys are silently dropped so nothing can be injected into the
//! upstream query.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use lms_domain::{Endpoint, Params};

use crate::error::{ClientError, ClientResult};

/// Paging keys are always allowed in the query string, declared or not.
const PAGING_PARAMS: [&str; 2] = ["page", "per_page"];

/// Builds the request path and query for `endpoint` from `params`.
///
/// # Errors
///
/// Returns [`ClientError::Domain`] when a template placeholder has no
/// supplied value, and [`ClientError::Encoding`] if the query cannot be
/// form-encoded.
pub fn build_url(endpoint: &Endpoint, params: &Params) -> ClientResult<String> {
    let mut args = BTreeMap::new();
    for spec in endpoint.path_parameters() {
        if let Some(value) = params.get(&spec.name) {
            args.insert(spec.name.clone(), scalar_string(value));
        }
    }
    let path = endpoint.template.render(&args)?;

    let mut allowed: BTreeSet<&str> = endpoint.query_parameters().map(|p| p.name.as_str()).collect();
    allowed.extend(PAGING_PARAMS);

    let mut pairs: Vec<(String, String)> = Vec::new();
    for (name, value) in params.iter() {
        if allowed.contains(name.as_str()) {
            append_pairs(&mut pairs, name, value);
        }
    }
    if pairs.is_empty() {
        return Ok(path);
    }

    let query =
        serde_urlencoded::to_string(&pairs).map_err(|e| ClientError::Encoding(e.to_string()))?;
    Ok(format!("{path}?{query}"))
}

/// Expands one parameter into form pairs: arrays as repeated `name[]`
/// keys and one level of object nesting as `name[sub]`, the shape the
/// upstream API expects from Rails-style queries.
fn append_pairs(pairs: &mut Vec<(String, String)>, name: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                pairs.push((format!("{name}[]"), scalar_string(item)));
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                pairs.push((format!("{name}[{key}]"), scalar_string(item)));
            }
        }
        other => pairs.push((name.to_string(), scalar_string(other))),
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
