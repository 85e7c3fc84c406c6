//! Response-side entities.

use serde::Serialize;

use super::{Decision, FulfillOn, Request};

/// The PEPd's answer to an authorization query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    /// The effective request the PDP evaluated, echoed back when the
    /// server is configured to do so.
    pub request: Option<Request>,
    /// One result per evaluated resource.
    pub results: Vec<DecisionResult>,
}

/// One evaluated decision with its status and obligations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionResult {
    /// The authorization decision.
    pub decision: Decision,
    /// The resource this result applies to, if the server names it.
    pub resource_id: Option<String>,
    /// Evaluation status, if any.
    pub status: Option<Status>,
    /// Obligations attached to the decision. May be empty.
    pub obligations: Vec<Obligation>,
}

impl DecisionResult {
    /// A new result carrying a decision and nothing else.
    #[must_use]
    pub const fn new(decision: Decision) -> Self {
        Self {
            decision,
            resource_id: None,
            status: None,
            obligations: Vec::new(),
        }
    }
}

/// Evaluation status: a message plus an optional categorical code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Status {
    /// Human-readable status message. Required on the wire.
    pub message: String,
    /// Categorical status code, if any.
    pub code: Option<StatusCode>,
}

impl Status {
    /// A new status with the given message and no code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }
}

/// A URN-tagged status code with an optional, recursively nested subcode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusCode {
    /// Status code URN. Required on the wire.
    pub code: String,
    /// More specific subcode, if any.
    pub subcode: Option<Box<StatusCode>>,
}

impl StatusCode {
    /// A new status code with no subcode.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            subcode: None,
        }
    }
}

/// An instruction the enforcement point must carry out when the decision
/// matches [`Obligation::fulfill_on`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Obligation {
    /// Obligation identifier URN. Required on the wire.
    pub id: String,
    /// Which decision triggers the obligation.
    pub fulfill_on: FulfillOn,
    /// Attribute assignments parameterizing the obligation.
    pub assignments: Vec<AttributeAssignment>,
}

impl Obligation {
    /// A new obligation with the given identifier, fulfilled on deny.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A named, multi-valued parameter of an obligation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeAssignment {
    /// Assignment identifier URN. Required on the wire.
    pub id: String,
    /// Assignment values, in insertion order.
    pub values: Vec<String>,
}

impl AttributeAssignment {
    /// A new assignment with the given identifier and a single value.
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: vec![value.into()],
        }
    }
}
