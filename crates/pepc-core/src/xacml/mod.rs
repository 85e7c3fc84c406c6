//! The XACML request/response object model.
//!
//! Plain data types mirroring the authorization vocabulary the PEPd
//! evaluates: a [`Request`] carries [`Subject`]s, [`Resource`]s, an
//! optional [`Action`] and [`Environment`], each holding [`Attribute`]s;
//! a [`Response`] carries [`DecisionResult`]s with an optional [`Status`]
//! and [`Obligation`]s the enforcement point must fulfill.
//!
//! Entities are built by the caller (request side) or by the unmarshaller
//! (response side) and are read-only afterwards; all collections preserve
//! insertion order, which is significant on the wire. The enum types
//! [`Decision`] and [`FulfillOn`] carry their integer wire codes but are
//! tagged sums here; conversion happens at the marshalling boundary.
//!
//! Well-known attribute, obligation, and status-code identifiers live in
//! [`ids`].

pub mod ids;
mod request;
mod response;

use std::fmt;

use serde::Serialize;

pub use request::{Action, Attribute, Environment, Request, Resource, Subject};
pub use response::{
    AttributeAssignment, DecisionResult, Obligation, Response, Status, StatusCode,
};

/// An authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    /// Access denied.
    Deny,
    /// Access granted.
    Permit,
    /// The PDP could not evaluate the request.
    Indeterminate,
    /// No policy applies to the request.
    NotApplicable,
}

impl Decision {
    /// The integer wire code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Deny => 0,
            Self::Permit => 1,
            Self::Indeterminate => 2,
            Self::NotApplicable => 3,
        }
    }

    /// Maps a wire code to a decision. Unknown codes decode as
    /// [`Decision::Indeterminate`].
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Deny,
            1 => Self::Permit,
            3 => Self::NotApplicable,
            _ => Self::Indeterminate,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deny => "Deny",
            Self::Permit => "Permit",
            Self::Indeterminate => "Indeterminate",
            Self::NotApplicable => "Not Applicable",
        };
        f.write_str(s)
    }
}

/// The decision an obligation is attached to.
///
/// An enforcement point fulfills an obligation only when the result's
/// decision matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FulfillOn {
    /// Fulfill on a deny decision.
    #[default]
    Deny,
    /// Fulfill on a permit decision.
    Permit,
}

impl FulfillOn {
    /// The integer wire code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Deny => 0,
            Self::Permit => 1,
        }
    }

    /// Maps a wire code back; unknown codes are rejected by the caller.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Deny),
            1 => Some(Self::Permit),
            _ => None,
        }
    }
}

impl fmt::Display for FulfillOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deny => f.write_str("Deny"),
            Self::Permit => f.write_str("Permit"),
        }
    }
}
