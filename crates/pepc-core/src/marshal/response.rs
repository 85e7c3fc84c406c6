//! Response-side mapping: Response, Result, Status, StatusCode,
//! Obligation, AttributeAssignment.

use crate::hessian::{List, Map, Value};
use crate::xacml::{
    AttributeAssignment, Decision, DecisionResult, FulfillOn, Obligation, Response, Status,
    StatusCode,
};

use super::error::UnmarshalError;
use super::request::{request_from_value, request_to_value};
use super::{
    entry_key, expect_i32, expect_list, expect_map, opt_string_field, opt_string_value,
    skip_unknown_key, string_items, string_list_value, CLASS_ATTRIBUTE_ASSIGNMENT,
    CLASS_OBLIGATION, CLASS_RESPONSE, CLASS_RESULT, CLASS_STATUS, CLASS_STATUS_CODE,
    KEY_ASSIGNMENTS, KEY_CODE, KEY_DECISION, KEY_FULFILL_ON, KEY_ID, KEY_MESSAGE,
    KEY_OBLIGATIONS, KEY_REQUEST, KEY_RESOURCE_ID, KEY_RESULTS, KEY_STATUS, KEY_SUBCODE,
    KEY_VALUES, MAX_STATUS_CODE_DEPTH,
};

pub(crate) fn response_to_value(response: &Response) -> Value {
    let mut map = Map::typed(CLASS_RESPONSE);
    map.push(
        Value::string(KEY_REQUEST),
        response
            .request
            .as_ref()
            .map_or(Value::Null, request_to_value),
    );
    let mut results = List::new();
    for result in &response.results {
        results.push(result_to_value(result));
    }
    map.push(Value::string(KEY_RESULTS), Value::List(results));
    Value::Map(map)
}

pub(crate) fn response_from_value(value: &Value) -> Result<Response, UnmarshalError> {
    let map = expect_map(value, CLASS_RESPONSE, "Response")?;
    let mut response = Response::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "Response")? {
            KEY_REQUEST => {
                if !entry.is_null() {
                    response.request = Some(request_from_value(entry)?);
                }
            },
            KEY_RESULTS => {
                for item in expect_list(entry, "Response", KEY_RESULTS)? {
                    response.results.push(result_from_value(item)?);
                }
            },
            key => skip_unknown_key("Response", key),
        }
    }
    Ok(response)
}

fn result_to_value(result: &DecisionResult) -> Value {
    let mut map = Map::typed(CLASS_RESULT);
    map.push(
        Value::string(KEY_DECISION),
        Value::Int32(result.decision.code()),
    );
    map.push(
        Value::string(KEY_RESOURCE_ID),
        opt_string_value(result.resource_id.as_deref()),
    );
    map.push(
        Value::string(KEY_STATUS),
        result.status.as_ref().map_or(Value::Null, status_to_value),
    );
    let mut obligations = List::new();
    for obligation in &result.obligations {
        obligations.push(obligation_to_value(obligation));
    }
    map.push(Value::string(KEY_OBLIGATIONS), Value::List(obligations));
    Value::Map(map)
}

fn result_from_value(value: &Value) -> Result<DecisionResult, UnmarshalError> {
    let map = expect_map(value, CLASS_RESULT, "Result")?;
    let mut decision: Option<Decision> = None;
    let mut resource_id = None;
    let mut status = None;
    let mut obligations = Vec::new();
    for (key, entry) in map.entries() {
        match entry_key(key, "Result")? {
            KEY_DECISION => {
                if !entry.is_null() {
                    let code = expect_i32(entry, "Result", KEY_DECISION)?;
                    decision = Some(Decision::from_code(code));
                }
            },
            KEY_RESOURCE_ID => {
                resource_id = opt_string_field(entry, "Result", KEY_RESOURCE_ID)?;
            },
            KEY_STATUS => {
                if !entry.is_null() {
                    status = Some(status_from_value(entry)?);
                }
            },
            KEY_OBLIGATIONS => {
                for item in expect_list(entry, "Result", KEY_OBLIGATIONS)? {
                    obligations.push(obligation_from_value(item)?);
                }
            },
            key => skip_unknown_key("Result", key),
        }
    }
    let decision = decision.ok_or(UnmarshalError::MissingRequired {
        class: "Result",
        field: KEY_DECISION,
    })?;
    Ok(DecisionResult {
        decision,
        resource_id,
        status,
        obligations,
    })
}

fn status_to_value(status: &Status) -> Value {
    let mut map = Map::typed(CLASS_STATUS);
    map.push(
        Value::string(KEY_MESSAGE),
        Value::string(status.message.clone()),
    );
    map.push(
        Value::string(KEY_CODE),
        status
            .code
            .as_ref()
            .map_or(Value::Null, status_code_to_value),
    );
    Value::Map(map)
}

fn status_from_value(value: &Value) -> Result<Status, UnmarshalError> {
    let map = expect_map(value, CLASS_STATUS, "Status")?;
    let mut message: Option<String> = None;
    let mut code = None;
    for (key, entry) in map.entries() {
        match entry_key(key, "Status")? {
            KEY_MESSAGE => message = opt_string_field(entry, "Status", KEY_MESSAGE)?,
            KEY_CODE => {
                // A null code node simply means no code.
                if !entry.is_null() {
                    code = Some(status_code_from_value(entry)?);
                }
            },
            key => skip_unknown_key("Status", key),
        }
    }
    let message = message.ok_or(UnmarshalError::MissingRequired {
        class: "Status",
        field: KEY_MESSAGE,
    })?;
    Ok(Status { message, code })
}

fn status_code_to_value(code: &StatusCode) -> Value {
    // Walk to the deepest subcode, then build the maps inside out; the
    // chain depth is caller-controlled, so recursion is avoided.
    let mut chain = Vec::new();
    let mut cursor = Some(code);
    while let Some(node) = cursor {
        chain.push(node);
        cursor = node.subcode.as_deref();
    }
    let mut value = Value::Null;
    for node in chain.into_iter().rev() {
        let mut map = Map::typed(CLASS_STATUS_CODE);
        map.push(Value::string(KEY_CODE), Value::string(node.code.clone()));
        map.push(Value::string(KEY_SUBCODE), value);
        value = Value::Map(map);
    }
    value
}

fn status_code_from_value(value: &Value) -> Result<StatusCode, UnmarshalError> {
    let mut codes: Vec<String> = Vec::new();
    let mut cursor = value;
    loop {
        if codes.len() == MAX_STATUS_CODE_DEPTH {
            return Err(UnmarshalError::depth_exceeded());
        }
        let map = expect_map(cursor, CLASS_STATUS_CODE, "StatusCode")?;
        let mut code: Option<String> = None;
        let mut subcode: Option<&Value> = None;
        for (key, entry) in map.entries() {
            match entry_key(key, "StatusCode")? {
                KEY_CODE => code = opt_string_field(entry, "StatusCode", KEY_CODE)?,
                KEY_SUBCODE => {
                    if !entry.is_null() {
                        subcode = Some(entry);
                    }
                },
                key => skip_unknown_key("StatusCode", key),
            }
        }
        codes.push(code.ok_or(UnmarshalError::MissingRequired {
            class: "StatusCode",
            field: KEY_CODE,
        })?);
        match subcode {
            Some(next) => cursor = next,
            None => break,
        }
    }
    let mut node: Option<StatusCode> = None;
    for code in codes.into_iter().rev() {
        node = Some(StatusCode {
            code,
            subcode: node.map(Box::new),
        });
    }
    node.ok_or(UnmarshalError::MissingRequired {
        class: "StatusCode",
        field: KEY_CODE,
    })
}

fn obligation_to_value(obligation: &Obligation) -> Value {
    let mut map = Map::typed(CLASS_OBLIGATION);
    map.push(Value::string(KEY_ID), Value::string(obligation.id.clone()));
    map.push(
        Value::string(KEY_FULFILL_ON),
        Value::Int32(obligation.fulfill_on.code()),
    );
    let mut assignments = List::new();
    for assignment in &obligation.assignments {
        assignments.push(assignment_to_value(assignment));
    }
    map.push(Value::string(KEY_ASSIGNMENTS), Value::List(assignments));
    Value::Map(map)
}

fn obligation_from_value(value: &Value) -> Result<Obligation, UnmarshalError> {
    let map = expect_map(value, CLASS_OBLIGATION, "Obligation")?;
    let mut id: Option<String> = None;
    let mut obligation = Obligation::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "Obligation")? {
            KEY_ID => id = opt_string_field(entry, "Obligation", KEY_ID)?,
            KEY_FULFILL_ON => {
                let code = expect_i32(entry, "Obligation", KEY_FULFILL_ON)?;
                obligation.fulfill_on =
                    FulfillOn::from_code(code).ok_or(UnmarshalError::EnumOutOfRange {
                        class: "Obligation",
                        field: KEY_FULFILL_ON,
                        value: code,
                    })?;
            },
            KEY_ASSIGNMENTS => {
                for item in expect_list(entry, "Obligation", KEY_ASSIGNMENTS)? {
                    obligation.assignments.push(assignment_from_value(item)?);
                }
            },
            key => skip_unknown_key("Obligation", key),
        }
    }
    obligation.id = id.ok_or(UnmarshalError::MissingRequired {
        class: "Obligation",
        field: KEY_ID,
    })?;
    Ok(obligation)
}

fn assignment_to_value(assignment: &AttributeAssignment) -> Value {
    let mut map = Map::typed(CLASS_ATTRIBUTE_ASSIGNMENT);
    map.push(Value::string(KEY_ID), Value::string(assignment.id.clone()));
    map.push(
        Value::string(KEY_VALUES),
        string_list_value(&assignment.values),
    );
    Value::Map(map)
}

fn assignment_from_value(value: &Value) -> Result<AttributeAssignment, UnmarshalError> {
    let map = expect_map(value, CLASS_ATTRIBUTE_ASSIGNMENT, "AttributeAssignment")?;
    let mut id: Option<String> = None;
    let mut assignment = AttributeAssignment::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "AttributeAssignment")? {
            KEY_ID => id = opt_string_field(entry, "AttributeAssignment", KEY_ID)?,
            KEY_VALUES => {
                assignment.values = string_items(entry, "AttributeAssignment", KEY_VALUES)?;
            },
            key => skip_unknown_key("AttributeAssignment", key),
        }
    }
    assignment.id = id.ok_or(UnmarshalError::MissingRequired {
        class: "AttributeAssignment",
        field: KEY_ID,
    })?;
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::super::{marshal_response, unmarshal_response};
    use super::*;
    use crate::hessian::serialize;
    use crate::xacml::{Attribute, Request, Subject};

    fn permit_response() -> Response {
        let mut status = Status::new("ok");
        status.code = Some(StatusCode::new("urn:oasis:names:tc:xacml:1.0:status:ok"));
        let mut obligation = Obligation::new("urn:example:obligation:uidgid");
        obligation.fulfill_on = FulfillOn::Permit;
        obligation
            .assignments
            .push(AttributeAssignment::new("urn:example:posix-uid", "1001"));
        obligation
            .assignments
            .push(AttributeAssignment::new("urn:example:posix-gid", "2001"));
        let mut result = DecisionResult::new(Decision::Permit);
        result.resource_id = Some("urn:example:cluster".to_owned());
        result.status = Some(status);
        result.obligations.push(obligation);
        Response {
            request: None,
            results: vec![result],
        }
    }

    #[test]
    fn response_round_trips() {
        let response = permit_response();
        let bytes = marshal_response(&response).unwrap();
        assert_eq!(unmarshal_response(&bytes).unwrap(), response);
    }

    #[test]
    fn response_with_echoed_request_round_trips() {
        let mut subject = Subject::default();
        subject
            .attributes
            .push(Attribute::new("urn:example:attr").value("v"));
        let request = Request {
            subjects: vec![subject],
            ..Request::default()
        };
        let mut response = permit_response();
        response.request = Some(request);
        let bytes = marshal_response(&response).unwrap();
        assert_eq!(unmarshal_response(&bytes).unwrap(), response);
    }

    #[test]
    fn missing_decision_is_rejected() {
        let result = Map::typed(CLASS_RESULT);
        let mut results = List::new();
        results.push(Value::Map(result));
        let mut response = Map::typed(CLASS_RESPONSE);
        response.push(Value::string(KEY_RESULTS), Value::List(results));
        let bytes = serialize(&Value::Map(response)).unwrap();
        let err = unmarshal_response(&bytes).unwrap_err();
        assert_eq!(
            err,
            UnmarshalError::MissingRequired {
                class: "Result",
                field: "decision"
            }
        );
    }

    #[test]
    fn unknown_decision_code_decodes_as_indeterminate() {
        let mut result = Map::typed(CLASS_RESULT);
        result.push(Value::string(KEY_DECISION), Value::Int32(99));
        let mut results = List::new();
        results.push(Value::Map(result));
        let mut response = Map::typed(CLASS_RESPONSE);
        response.push(Value::string(KEY_RESULTS), Value::List(results));
        let bytes = serialize(&Value::Map(response)).unwrap();
        let decoded = unmarshal_response(&bytes).unwrap();
        assert_eq!(decoded.results[0].decision, Decision::Indeterminate);
    }

    #[test]
    fn out_of_range_fulfill_on_is_rejected() {
        let mut obligation = Map::typed(CLASS_OBLIGATION);
        obligation.push(Value::string(KEY_ID), Value::string("urn:example:o"));
        obligation.push(Value::string(KEY_FULFILL_ON), Value::Int32(7));
        let mut obligations = List::new();
        obligations.push(Value::Map(obligation));
        let mut result = Map::typed(CLASS_RESULT);
        result.push(Value::string(KEY_DECISION), Value::Int32(0));
        result.push(Value::string(KEY_OBLIGATIONS), Value::List(obligations));
        let mut results = List::new();
        results.push(Value::Map(result));
        let mut response = Map::typed(CLASS_RESPONSE);
        response.push(Value::string(KEY_RESULTS), Value::List(results));
        let bytes = serialize(&Value::Map(response)).unwrap();
        let err = unmarshal_response(&bytes).unwrap_err();
        assert_eq!(
            err,
            UnmarshalError::EnumOutOfRange {
                class: "Obligation",
                field: "fulfillOn",
                value: 7
            }
        );
    }

    #[test]
    fn absent_fulfill_on_defaults_to_deny() {
        let mut obligation = Map::typed(CLASS_OBLIGATION);
        obligation.push(Value::string(KEY_ID), Value::string("urn:example:o"));
        let mut obligations = List::new();
        obligations.push(Value::Map(obligation));
        let mut result = Map::typed(CLASS_RESULT);
        result.push(Value::string(KEY_DECISION), Value::Int32(1));
        result.push(Value::string(KEY_OBLIGATIONS), Value::List(obligations));
        let mut results = List::new();
        results.push(Value::Map(result));
        let mut response = Map::typed(CLASS_RESPONSE);
        response.push(Value::string(KEY_RESULTS), Value::List(results));
        let bytes = serialize(&Value::Map(response)).unwrap();
        let decoded = unmarshal_response(&bytes).unwrap();
        assert_eq!(decoded.results[0].obligations[0].fulfill_on, FulfillOn::Deny);
    }

    fn nested_status_code(depth: usize) -> StatusCode {
        let mut node = StatusCode::new(format!("urn:example:level:{depth}"));
        for level in (1..depth).rev() {
            let mut parent = StatusCode::new(format!("urn:example:level:{level}"));
            parent.subcode = Some(Box::new(node));
            node = parent;
        }
        node
    }

    #[test]
    fn status_code_chain_round_trips() {
        let mut status = Status::new("processing failed");
        status.code = Some(nested_status_code(3));
        let mut result = DecisionResult::new(Decision::Indeterminate);
        result.status = Some(status);
        let response = Response {
            request: None,
            results: vec![result],
        };
        let bytes = marshal_response(&response).unwrap();
        assert_eq!(unmarshal_response(&bytes).unwrap(), response);
    }

    #[test]
    fn status_code_chain_at_31_decodes() {
        let mut status = Status::new("deep");
        status.code = Some(nested_status_code(31));
        let mut result = DecisionResult::new(Decision::Deny);
        result.status = Some(status);
        let response = Response {
            request: None,
            results: vec![result],
        };
        let bytes = marshal_response(&response).unwrap();
        assert_eq!(unmarshal_response(&bytes).unwrap(), response);
    }

    #[test]
    fn status_code_chain_at_33_is_rejected() {
        let mut status = Status::new("too deep");
        status.code = Some(nested_status_code(33));
        let mut result = DecisionResult::new(Decision::Deny);
        result.status = Some(status);
        let response = Response {
            request: None,
            results: vec![result],
        };
        let bytes = marshal_response(&response).unwrap();
        let err = unmarshal_response(&bytes).unwrap_err();
        assert_eq!(
            err,
            UnmarshalError::DepthExceeded {
                max: MAX_STATUS_CODE_DEPTH
            }
        );
    }

    #[test]
    fn null_subcode_is_skipped() {
        let mut code = Map::typed(CLASS_STATUS_CODE);
        code.push(
            Value::string(KEY_CODE),
            Value::string("urn:oasis:names:tc:xacml:1.0:status:ok"),
        );
        code.push(Value::string(KEY_SUBCODE), Value::Null);
        let mut status = Map::typed(CLASS_STATUS);
        status.push(Value::string(KEY_MESSAGE), Value::string("ok"));
        status.push(Value::string(KEY_CODE), Value::Map(code));
        let mut result = Map::typed(CLASS_RESULT);
        result.push(Value::string(KEY_DECISION), Value::Int32(1));
        result.push(Value::string(KEY_STATUS), Value::Map(status));
        let mut results = List::new();
        results.push(Value::Map(result));
        let mut response = Map::typed(CLASS_RESPONSE);
        response.push(Value::string(KEY_RESULTS), Value::List(results));
        let bytes = serialize(&Value::Map(response)).unwrap();
        let decoded = unmarshal_response(&bytes).unwrap();
        let code = decoded.results[0]
            .status
            .as_ref()
            .and_then(|s| s.code.as_ref())
            .expect("status code");
        assert!(code.subcode.is_none());
    }

    #[test]
    fn status_null_is_a_result_without_status() {
        let mut result = Map::typed(CLASS_RESULT);
        result.push(Value::string(KEY_DECISION), Value::Int32(0));
        result.push(Value::string(KEY_STATUS), Value::Null);
        let mut results = List::new();
        results.push(Value::Map(result));
        let mut response = Map::typed(CLASS_RESPONSE);
        response.push(Value::string(KEY_RESULTS), Value::List(results));
        let bytes = serialize(&Value::Map(response)).unwrap();
        let decoded = unmarshal_response(&bytes).unwrap();
        assert!(decoded.results[0].status.is_none());
    }

    #[test]
    fn obligation_order_is_preserved() {
        let mut result = DecisionResult::new(Decision::Permit);
        for n in 0..4 {
            let mut obligation = Obligation::new(format!("urn:example:obligation:{n}"));
            obligation.fulfill_on = FulfillOn::Permit;
            result.obligations.push(obligation);
        }
        let response = Response {
            request: None,
            results: vec![result],
        };
        let bytes = marshal_response(&response).unwrap();
        let decoded = unmarshal_response(&bytes).unwrap();
        for (n, obligation) in decoded.results[0].obligations.iter().enumerate() {
            assert_eq!(obligation.id, format!("urn:example:obligation:{n}"));
        }
    }
}
