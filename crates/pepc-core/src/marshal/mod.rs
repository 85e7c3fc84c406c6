//! Translation between the XACML object model and typed Hessian maps.
//!
//! Every domain entity maps to a Hessian map whose type string is the
//! entity's Java wire class name (`org.glite.authz.pep.model.*`) and
//! whose keys are the lowerCamelCase field names. The mapping is purely
//! structural: no I/O, no state shared between calls.
//!
//! Encoding rules:
//!
//! - required string fields are emitted as string nodes; optional string
//!   fields as an explicit `(key, Null)` pair when absent,
//! - list fields are always emitted as an untyped list, even when empty,
//! - enum fields ([`Decision`](crate::xacml::Decision),
//!   [`FulfillOn`](crate::xacml::FulfillOn)) travel as their `Int32` wire
//!   codes,
//! - nested entities are nested typed maps, or Null when absent,
//! - field order is fixed per entity.
//!
//! Decoding is order-independent and forward compatible: an unknown key
//! in any map is logged at warning level and skipped, while an unknown
//! wire class name in a typed slot is an error. Required fields that are
//! absent or null fail with [`UnmarshalError::MissingRequired`]. On any
//! error no partial graph is returned.

mod error;
mod request;
mod response;

use bytes::Bytes;
use tracing::warn;

pub use error::UnmarshalError;

use crate::hessian::{self, EncodeError, List, Map, Value};
use crate::xacml::{Request, Response};

/// Cap on `StatusCode.subcode` nesting during unmarshalling.
pub const MAX_STATUS_CODE_DEPTH: usize = 32;

pub(crate) const CLASS_REQUEST: &str = "org.glite.authz.pep.model.Request";
pub(crate) const CLASS_SUBJECT: &str = "org.glite.authz.pep.model.Subject";
pub(crate) const CLASS_RESOURCE: &str = "org.glite.authz.pep.model.Resource";
pub(crate) const CLASS_ACTION: &str = "org.glite.authz.pep.model.Action";
pub(crate) const CLASS_ENVIRONMENT: &str = "org.glite.authz.pep.model.Environment";
pub(crate) const CLASS_ATTRIBUTE: &str = "org.glite.authz.pep.model.Attribute";
pub(crate) const CLASS_RESPONSE: &str = "org.glite.authz.pep.model.Response";
pub(crate) const CLASS_RESULT: &str = "org.glite.authz.pep.model.Result";
pub(crate) const CLASS_STATUS: &str = "org.glite.authz.pep.model.Status";
pub(crate) const CLASS_STATUS_CODE: &str = "org.glite.authz.pep.model.StatusCode";
pub(crate) const CLASS_OBLIGATION: &str = "org.glite.authz.pep.model.Obligation";
pub(crate) const CLASS_ATTRIBUTE_ASSIGNMENT: &str =
    "org.glite.authz.pep.model.AttributeAssignment";

pub(crate) const KEY_SUBJECTS: &str = "subjects";
pub(crate) const KEY_RESOURCES: &str = "resources";
pub(crate) const KEY_ACTION: &str = "action";
pub(crate) const KEY_ENVIRONMENT: &str = "environment";
pub(crate) const KEY_CATEGORY: &str = "category";
pub(crate) const KEY_ATTRIBUTES: &str = "attributes";
pub(crate) const KEY_CONTENT: &str = "content";
pub(crate) const KEY_ID: &str = "id";
pub(crate) const KEY_DATA_TYPE: &str = "dataType";
pub(crate) const KEY_ISSUER: &str = "issuer";
pub(crate) const KEY_VALUES: &str = "values";
pub(crate) const KEY_REQUEST: &str = "request";
pub(crate) const KEY_RESULTS: &str = "results";
pub(crate) const KEY_DECISION: &str = "decision";
pub(crate) const KEY_RESOURCE_ID: &str = "resourceId";
pub(crate) const KEY_STATUS: &str = "status";
pub(crate) const KEY_OBLIGATIONS: &str = "obligations";
pub(crate) const KEY_MESSAGE: &str = "message";
pub(crate) const KEY_CODE: &str = "code";
pub(crate) const KEY_SUBCODE: &str = "subcode";
pub(crate) const KEY_FULFILL_ON: &str = "fulfillOn";
pub(crate) const KEY_ASSIGNMENTS: &str = "assignments";

/// Marshals a request into its Hessian wire form.
///
/// Output is deterministic: the same request graph yields byte-identical
/// output on every call.
///
/// # Errors
///
/// Returns an [`EncodeError`] only on programmer errors (a value too
/// large to chunk under the stream cap).
pub fn marshal_request(request: &Request) -> Result<Bytes, EncodeError> {
    hessian::serialize(&request::request_to_value(request))
}

/// Unmarshals a request from its Hessian wire form.
///
/// # Errors
///
/// Returns an [`UnmarshalError`] when the bytes are not a valid Hessian
/// stream or the stream does not carry a request graph.
pub fn unmarshal_request(input: &[u8]) -> Result<Request, UnmarshalError> {
    let root = hessian::deserialize(input)?;
    request::request_from_value(&root)
}

/// Marshals a response into its Hessian wire form.
///
/// # Errors
///
/// Returns an [`EncodeError`] only on programmer errors (a value too
/// large to chunk under the stream cap).
pub fn marshal_response(response: &Response) -> Result<Bytes, EncodeError> {
    hessian::serialize(&response::response_to_value(response))
}

/// Unmarshals a PEPd response from its Hessian wire form.
///
/// # Errors
///
/// Returns an [`UnmarshalError`] when the bytes are not a valid Hessian
/// stream or the stream does not carry a response graph.
pub fn unmarshal_response(input: &[u8]) -> Result<Response, UnmarshalError> {
    let root = hessian::deserialize(input)?;
    response::response_from_value(&root)
}

/// An optional string field: an explicit Null when absent.
pub(crate) fn opt_string_value(field: Option<&str>) -> Value {
    field.map_or(Value::Null, Value::string)
}

/// A list field of plain strings.
pub(crate) fn string_list_value(values: &[String]) -> Value {
    let mut list = List::new();
    for value in values {
        list.push(Value::string(value.clone()));
    }
    Value::List(list)
}

/// A typed slot: the value must be a map carrying exactly `class`.
pub(crate) fn expect_map<'a>(
    value: &'a Value,
    class: &'static str,
    context: &'static str,
) -> Result<&'a Map, UnmarshalError> {
    let map = match value {
        Value::Map(map) => map,
        other => {
            return Err(UnmarshalError::ShapeMismatch {
                context: context.to_owned(),
                expected: "map",
                found: other.kind_name().to_owned(),
            })
        },
    };
    match map.type_name() {
        Some(name) if name == class => Ok(map),
        Some(name) => Err(UnmarshalError::ShapeMismatch {
            context: context.to_owned(),
            expected: class,
            found: name.to_owned(),
        }),
        None => Err(UnmarshalError::ShapeMismatch {
            context: context.to_owned(),
            expected: class,
            found: "untyped map".to_owned(),
        }),
    }
}

/// Map keys must be string nodes.
pub(crate) fn entry_key<'a>(
    key: &'a Value,
    context: &'static str,
) -> Result<&'a str, UnmarshalError> {
    key.as_str().ok_or_else(|| UnmarshalError::ShapeMismatch {
        context: format!("{context} map key"),
        expected: "string",
        found: key.kind_name().to_owned(),
    })
}

/// A string-or-null field. Both Null and an absent key denote absence.
pub(crate) fn opt_string_field(
    value: &Value,
    class: &'static str,
    field: &'static str,
) -> Result<Option<String>, UnmarshalError> {
    match value {
        Value::String(s) => Ok(Some(s.clone())),
        Value::Null => Ok(None),
        other => Err(UnmarshalError::ShapeMismatch {
            context: format!("{class}.{field}"),
            expected: "string or null",
            found: other.kind_name().to_owned(),
        }),
    }
}

/// A list-valued field.
pub(crate) fn expect_list<'a>(
    value: &'a Value,
    class: &'static str,
    field: &'static str,
) -> Result<&'a List, UnmarshalError> {
    match value {
        Value::List(list) => Ok(list),
        other => Err(UnmarshalError::ShapeMismatch {
            context: format!("{class}.{field}"),
            expected: "list",
            found: other.kind_name().to_owned(),
        }),
    }
}

/// An integer-valued field.
pub(crate) fn expect_i32(
    value: &Value,
    class: &'static str,
    field: &'static str,
) -> Result<i32, UnmarshalError> {
    value.as_i32().ok_or_else(|| UnmarshalError::ShapeMismatch {
        context: format!("{class}.{field}"),
        expected: "int32",
        found: value.kind_name().to_owned(),
    })
}

/// A list of plain strings (attribute and assignment values).
pub(crate) fn string_items(
    value: &Value,
    class: &'static str,
    field: &'static str,
) -> Result<Vec<String>, UnmarshalError> {
    let list = expect_list(value, class, field)?;
    let mut items = Vec::with_capacity(list.len());
    for element in list {
        match element {
            Value::String(s) => items.push(s.clone()),
            other => {
                return Err(UnmarshalError::ShapeMismatch {
                    context: format!("{class}.{field}"),
                    expected: "string",
                    found: other.kind_name().to_owned(),
                })
            },
        }
    }
    Ok(items)
}

/// Logs and skips a key the wire contract does not know.
pub(crate) fn skip_unknown_key(class: &'static str, key: &str) {
    warn!(class, key, "skipping unknown wire key");
}
