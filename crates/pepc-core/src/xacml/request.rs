//! Request-side entities.

use serde::Serialize;

/// An authorization query: who wants to do what to which resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Request {
    /// The acting subjects. The grid profile puts every subject
    /// attribute (DN, certificate chain, FQANs) into one logical subject.
    pub subjects: Vec<Subject>,
    /// The resources the action targets.
    pub resources: Vec<Resource>,
    /// The action to authorize, if any.
    pub action: Option<Action>,
    /// Environment attributes, if any.
    pub environment: Option<Environment>,
}

/// The entity requesting access.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Subject {
    /// Subject category URN, if any.
    pub category: Option<String>,
    /// Subject attributes, in insertion order.
    pub attributes: Vec<Attribute>,
}

/// The entity access is requested to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resource {
    /// Free-form resource content, if any.
    pub content: Option<String>,
    /// Resource attributes, in insertion order.
    pub attributes: Vec<Attribute>,
}

/// The operation being authorized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Action {
    /// Action attributes, in insertion order.
    pub attributes: Vec<Attribute>,
}

/// Attributes describing the evaluation environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Environment {
    /// Environment attributes, in insertion order.
    pub attributes: Vec<Attribute>,
}

/// A named, optionally typed, multi-valued attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attribute {
    /// Attribute identifier URN. Required on the wire.
    pub id: String,
    /// Datatype URI, if any.
    pub data_type: Option<String>,
    /// Issuer, if any.
    pub issuer: Option<String>,
    /// Attribute values, in insertion order. May be empty.
    pub values: Vec<String>,
}

impl Attribute {
    /// A new attribute with the given identifier and no values.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the datatype URI.
    #[must_use]
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Sets the issuer.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Appends a value.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }
}
