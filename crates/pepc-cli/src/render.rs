//! Rendering requests and responses for the terminal.
//!
//! Two views: a structured line-per-field dump mirroring the object
//! graph, and a short human summary that interprets the well-known
//! AuthZ Interop obligations.

use std::fmt::Write as _;

use pepc_core::xacml::{ids, Attribute, Obligation, Request, Response};

/// Obligation id some deployments use to signal that the application
/// itself must perform the POSIX account mapping.
const X_POSIX_ACCOUNT_MAP: &str = "x-posix-account-map";

/// The effective request context, one line per field.
pub fn request_context(request: &Request) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "request: {} subjects", request.subjects.len());
    for (i, subject) in request.subjects.iter().enumerate() {
        if let Some(category) = &subject.category {
            let _ = writeln!(out, "request.subject[{i}].category= {category}");
        }
        let _ = writeln!(
            out,
            "request.subject[{i}]: {} attributes",
            subject.attributes.len()
        );
        dump_attributes(&mut out, &format!("request.subject[{i}]"), &subject.attributes);
    }
    let _ = writeln!(out, "request: {} resources", request.resources.len());
    for (i, resource) in request.resources.iter().enumerate() {
        if let Some(content) = &resource.content {
            let _ = writeln!(out, "request.resource[{i}].content= {content}");
        }
        let _ = writeln!(
            out,
            "request.resource[{i}]: {} attributes",
            resource.attributes.len()
        );
        dump_attributes(&mut out, &format!("request.resource[{i}]"), &resource.attributes);
    }
    if let Some(action) = &request.action {
        let _ = writeln!(out, "request.action: {} attributes", action.attributes.len());
        dump_attributes(&mut out, "request.action", &action.attributes);
    }
    if let Some(environment) = &request.environment {
        let _ = writeln!(
            out,
            "request.environment: {} attributes",
            environment.attributes.len()
        );
        dump_attributes(&mut out, "request.environment", &environment.attributes);
    }
    out
}

fn dump_attributes(out: &mut String, prefix: &str, attributes: &[Attribute]) {
    for (j, attribute) in attributes.iter().enumerate() {
        let _ = writeln!(out, "{prefix}.attribute[{j}].id= {}", attribute.id);
        if let Some(data_type) = &attribute.data_type {
            let _ = writeln!(out, "{prefix}.attribute[{j}].datatype= {data_type}");
        }
        if let Some(issuer) = &attribute.issuer {
            let _ = writeln!(out, "{prefix}.attribute[{j}].issuer= {issuer}");
        }
        for (k, value) in attribute.values.iter().enumerate() {
            let _ = writeln!(out, "{prefix}.attribute[{j}].value[{k}]= {value}");
        }
    }
}

/// The full response, one line per field.
pub fn response_dump(response: &Response) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "response: {} results", response.results.len());
    for (i, result) in response.results.iter().enumerate() {
        let _ = writeln!(out, "response.result[{i}].decision= {}", result.decision);
        if let Some(resource_id) = &result.resource_id {
            let _ = writeln!(out, "response.result[{i}].resourceid= {resource_id}");
        }
        if let Some(status) = &result.status {
            let _ = writeln!(out, "response.result[{i}].status.message= {}", status.message);
            if let Some(code) = &status.code {
                let _ = writeln!(out, "response.result[{i}].status.code.value= {}", code.code);
                if let Some(subcode) = &code.subcode {
                    let _ = writeln!(
                        out,
                        "response.result[{i}].status.code.subcode.value= {}",
                        subcode.code
                    );
                }
            }
        }
        let _ = writeln!(
            out,
            "response.result[{i}]: {} obligations",
            result.obligations.len()
        );
        for (j, obligation) in result.obligations.iter().enumerate() {
            let _ = writeln!(out, "response.result[{i}].obligation[{j}].id= {}", obligation.id);
            let _ = writeln!(
                out,
                "response.result[{i}].obligation[{j}].fulfillOn= {}",
                obligation.fulfill_on
            );
            let _ = writeln!(
                out,
                "response.result[{i}].obligation[{j}]: {} attribute assignments",
                obligation.assignments.len()
            );
            for (k, assignment) in obligation.assignments.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "response.result[{i}].obligation[{j}].attributeassignment[{k}].id= {}",
                    assignment.id
                );
                for (l, value) in assignment.values.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "response.result[{i}].obligation[{j}].attributeassignment[{k}].value[{l}]= {value}"
                    );
                }
            }
        }
    }
    out
}

/// A short human summary: decision, non-OK status, and the obligations
/// whose `fulfillOn` matches the decision, with the well-known POSIX
/// mapping obligations spelled out.
pub fn human_summary(response: &Response) -> String {
    let mut out = String::new();
    for result in &response.results {
        if let Some(resource_id) = &result.resource_id {
            let _ = writeln!(out, "Resource: {resource_id}");
        }
        let _ = writeln!(out, "Decision: {}", result.decision);
        if let Some(status) = &result.status {
            // Status details only matter when the evaluation was not OK.
            let not_ok = status
                .code
                .as_ref()
                .is_some_and(|code| code.code != ids::XACML_STATUSCODE_OK);
            if not_ok {
                if let Some(code) = &status.code {
                    let _ = writeln!(out, "Status: {}", code.code);
                }
                let _ = writeln!(out, "Status message: {}", status.message);
            }
        }
        if result.obligations.is_empty() {
            let _ = writeln!(out, "No Obligation received");
            continue;
        }
        for obligation in &result.obligations {
            if obligation.fulfill_on.code() != result.decision.code() {
                continue;
            }
            render_obligation(&mut out, obligation);
        }
    }
    out
}

fn render_obligation(out: &mut String, obligation: &Obligation) {
    match obligation.id.as_str() {
        ids::AUTHZINTEROP_OBLIGATION_UIDGID => {
            for assignment in &obligation.assignments {
                for value in &assignment.values {
                    match assignment.id.as_str() {
                        ids::AUTHZINTEROP_ATTR_POSIX_UID => {
                            let _ = writeln!(out, "UID={value}");
                        },
                        ids::AUTHZINTEROP_ATTR_POSIX_GID => {
                            let _ = writeln!(out, "GID={value}");
                        },
                        _ => {},
                    }
                }
            }
        },
        ids::AUTHZINTEROP_OBLIGATION_SECONDARY_GIDS => {
            let gids: Vec<&str> = obligation
                .assignments
                .iter()
                .filter(|a| a.id == ids::AUTHZINTEROP_ATTR_POSIX_GID)
                .flat_map(|a| a.values.iter().map(String::as_str))
                .collect();
            let _ = writeln!(out, "Secondary GIDs={}", gids.join(" "));
        },
        ids::AUTHZINTEROP_OBLIGATION_USERNAME => {
            for assignment in &obligation.assignments {
                if assignment.id == ids::AUTHZINTEROP_ATTR_USERNAME {
                    for value in &assignment.values {
                        let _ = writeln!(out, "Username={value}");
                    }
                }
            }
        },
        X_POSIX_ACCOUNT_MAP => {
            let _ = writeln!(
                out,
                "Obligation({X_POSIX_ACCOUNT_MAP}): Application should do the POSIX account mapping"
            );
        },
        other => {
            for assignment in &obligation.assignments {
                for value in &assignment.values {
                    let _ = writeln!(out, "Obligation({other}): {}={value}", assignment.id);
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use pepc_core::xacml::{
        AttributeAssignment, Decision, DecisionResult, FulfillOn, Status, StatusCode,
    };

    use super::*;

    fn uidgid_response() -> Response {
        let mut status = Status::new("ok");
        status.code = Some(StatusCode::new(ids::XACML_STATUSCODE_OK));
        let mut obligation = Obligation::new(ids::AUTHZINTEROP_OBLIGATION_UIDGID);
        obligation.fulfill_on = FulfillOn::Permit;
        obligation
            .assignments
            .push(AttributeAssignment::new(ids::AUTHZINTEROP_ATTR_POSIX_UID, "1001"));
        obligation
            .assignments
            .push(AttributeAssignment::new(ids::AUTHZINTEROP_ATTR_POSIX_GID, "2001"));
        let mut result = DecisionResult::new(Decision::Permit);
        result.status = Some(status);
        result.obligations.push(obligation);
        Response {
            request: None,
            results: vec![result],
        }
    }

    #[test]
    fn permit_with_uidgid_renders_uid_and_gid() {
        let summary = human_summary(&uidgid_response());
        assert_eq!(summary, "Decision: Permit\nUID=1001\nGID=2001\n");
    }

    #[test]
    fn ok_status_is_not_shown() {
        let summary = human_summary(&uidgid_response());
        assert!(!summary.contains("Status:"));
    }

    #[test]
    fn failing_status_is_shown_with_message() {
        let mut status = Status::new("policy repository unavailable");
        status.code = Some(StatusCode::new(ids::XACML_STATUSCODE_PROCESSING_ERROR));
        let mut result = DecisionResult::new(Decision::Indeterminate);
        result.status = Some(status);
        let response = Response {
            request: None,
            results: vec![result],
        };
        let summary = human_summary(&response);
        assert!(summary.contains("Decision: Indeterminate"));
        assert!(summary.contains(&format!("Status: {}", ids::XACML_STATUSCODE_PROCESSING_ERROR)));
        assert!(summary.contains("Status message: policy repository unavailable"));
        assert!(summary.contains("No Obligation received"));
    }

    #[test]
    fn secondary_gids_render_space_joined() {
        let mut obligation = Obligation::new(ids::AUTHZINTEROP_OBLIGATION_SECONDARY_GIDS);
        obligation.fulfill_on = FulfillOn::Permit;
        for gid in ["3001", "3002", "3003"] {
            obligation
                .assignments
                .push(AttributeAssignment::new(ids::AUTHZINTEROP_ATTR_POSIX_GID, gid));
        }
        let mut result = DecisionResult::new(Decision::Permit);
        result.obligations.push(obligation);
        let response = Response {
            request: None,
            results: vec![result],
        };
        assert!(human_summary(&response).contains("Secondary GIDs=3001 3002 3003"));
    }

    #[test]
    fn obligations_for_other_decision_are_skipped() {
        let mut obligation = Obligation::new("urn:example:obligation:cleanup");
        obligation.fulfill_on = FulfillOn::Deny;
        obligation
            .assignments
            .push(AttributeAssignment::new("urn:example:reason", "quota"));
        let mut result = DecisionResult::new(Decision::Permit);
        result.obligations.push(obligation);
        let response = Response {
            request: None,
            results: vec![result],
        };
        assert!(!human_summary(&response).contains("cleanup"));
    }

    #[test]
    fn resource_id_line_precedes_decision() {
        let mut result = DecisionResult::new(Decision::Deny);
        result.resource_id = Some("urn:example:cluster".to_owned());
        let response = Response {
            request: None,
            results: vec![result],
        };
        let summary = human_summary(&response);
        assert!(summary.starts_with("Resource: urn:example:cluster\nDecision: Deny\n"));
    }

    #[test]
    fn request_context_lists_attributes_in_order() {
        let request = crate::request::build_request(
            Some("CN=Alice,O=Example,C=CH"),
            None,
            &["/dteam".to_owned()],
            Some("urn:example:cluster"),
            Some("submit"),
        );
        let context = request_context(&request);
        assert!(context.contains("request: 1 subjects"));
        assert!(context.contains(&format!(
            "request.subject[0].attribute[0].id= {}",
            ids::XACML_SUBJECT_ID
        )));
        assert!(context.contains("request.subject[0].attribute[0].value[0]= CN=Alice,O=Example,C=CH"));
        assert!(context.contains("request.action: 1 attributes"));
        assert!(context.contains("request.action.attribute[0].value[0]= submit"));
    }
}
