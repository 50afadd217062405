//! Required-parameter validation
//!
//! Runs before any URL is built or any request leaves the process. The
//! payload consulted here is always structured; the dispatcher parses
//! raw payloads first.

use lms_domain::params::split_nested;
use lms_domain::{Endpoint, Params, Payload};

/// Computes the required parameters of `endpoint` that are absent or
/// blank in both `params` and `payload`.
///
/// A nested name `parent[child]` is satisfied by a non-blank value at
/// `params[parent][child]` or `payload[parent][child]`. A flat name is
/// satisfied in `params`, or in `payload` when the payload is
/// structured. An empty result means the call is valid.
#[must_use]
pub fn missing_required(
    endpoint: &Endpoint,
    params: &Params,
    payload: Option<&Payload>,
) -> Vec<String> {
    let mut missing = Vec::new();
    for spec in endpoint.required_parameters() {
        let satisfied = match split_nested(&spec.name) {
            (parent, Some(child)) => {
                params.is_nested_present(parent, child)
                    || payload.is_some_and(|p| p.is_nested_present(parent, child))
            }
            (name, None) => {
                params.is_present(name) || payload.is_some_and(|p| p.is_present(name))
            }
        };
        if !satisfied {
            missing.push(spec.name.clone());
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_domain::{HttpMethod, ParamSpec};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn create_assignment() -> Endpoint {
        Endpoint::new(
            "CREATE_ASSIGNMENT",
            HttpMethod::Post,
            "courses/{course_id}/assignments",
        )
        .with_param(ParamSpec::path("course_id").required())
        .with_param(ParamSpec::form("assignment[name]").required())
        .with_param(ParamSpec::query("include"))
    }

    #[test]
    fn test_all_required_missing() {
        let missing = missing_required(&create_assignment(), &Params::new(), None);
        assert_eq!(missing, vec!["course_id", "assignment[name]"]);
    }

    #[test]
    fn test_satisfied_from_params() {
        let params = Params::new()
            .with("course_id", 42)
            .with("assignment", json!({ "name": "Essay" }));
        let missing = missing_required(&create_assignment(), &params, None);
        assert_eq!(missing, Vec::<String>::new());
    }

    #[test]
    fn test_nested_satisfied_from_payload_only() {
        let params = Params::new().with("course_id", 42);
        let payload = Payload::from_value(json!({ "assignment": { "name": "Essay" } }));
        let missing = missing_required(&create_assignment(), &params, Some(&payload));
        assert_eq!(missing, Vec::<String>::new());
    }

    #[test]
    fn test_blank_values_do_not_satisfy() {
        let params = Params::new()
            .with("course_id", "")
            .with("assignment", json!({ "name": null }));
        let missing = missing_required(&create_assignment(), &params, None);
        assert_eq!(missing, vec!["course_id", "assignment[name]"]);
    }

    #[test]
    fn test_flat_satisfied_from_structured_payload() {
        let endpoint = Endpoint::new("CREATE_COURSE", HttpMethod::Post, "accounts/{account_id}/courses")
            .with_param(ParamSpec::path("account_id").required())
            .with_param(ParamSpec::form("offer").required());
        let params = Params::new().with("account_id", 1);
        let payload = Payload::from_value(json!({ "offer": true }));
        let missing = missing_required(&endpoint, &params, Some(&payload));
        assert_eq!(missing, Vec::<String>::new());
    }

    #[test]
    fn test_optional_parameters_ignored() {
        let params = Params::new()
            .with("course_id", 42)
            .with("assignment", json!({ "name": "Essay" }));
        let missing = missing_required(&create_assignment(), &params, None);
        assert!(missing.is_empty());
    }
}
