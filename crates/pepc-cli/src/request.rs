//! Building the effective XACML request from command-line inputs.
//!
//! The grid AuthZ Interop profile expects ONE logical subject carrying
//! every subject attribute (DN, certificate chain, FQANs), so the
//! builders here each produce attributes that are merged into a single
//! [`Subject`] in a fixed order.

use pepc_core::xacml::{ids, Action, Attribute, Request, Resource, Subject};

/// The subject-id attribute for a user DN (RFC 2253 format).
pub fn subject_id_attribute(dn: &str) -> Attribute {
    Attribute::new(ids::XACML_SUBJECT_ID)
        .data_type(ids::XACML_DATATYPE_X500_NAME)
        .value(dn)
}

/// The cert-chain attribute for a filtered PEM chain.
pub fn certchain_attribute(pem_chain: &str) -> Attribute {
    Attribute::new(ids::AUTHZINTEROP_SUBJECT_CERTCHAIN)
        .data_type(ids::XACML_DATATYPE_BASE64_BINARY)
        .value(pem_chain)
}

/// The VOMS FQAN attributes: the first FQAN is the primary one, the
/// `voms-fqan` attribute lists all of them in order. Returns nothing for
/// an empty FQAN list.
pub fn fqan_attributes(fqans: &[String]) -> Vec<Attribute> {
    let Some(primary) = fqans.first() else {
        return Vec::new();
    };
    let mut all = Attribute::new(ids::AUTHZINTEROP_SUBJECT_VOMS_FQAN)
        .data_type(ids::XACML_DATATYPE_STRING);
    for fqan in fqans {
        all = all.value(fqan);
    }
    vec![
        Attribute::new(ids::AUTHZINTEROP_SUBJECT_VOMS_PRIMARY_FQAN)
            .data_type(ids::XACML_DATATYPE_STRING)
            .value(primary),
        all,
    ]
}

/// Assembles the request: one merged subject, an optional resource-id
/// resource, an optional action-id action.
pub fn build_request(
    subjectid: Option<&str>,
    certchain: Option<&str>,
    fqans: &[String],
    resourceid: Option<&str>,
    actionid: Option<&str>,
) -> Request {
    let mut subject = Subject::default();
    if let Some(dn) = subjectid {
        subject.attributes.push(subject_id_attribute(dn));
    }
    if let Some(chain) = certchain {
        subject.attributes.push(certchain_attribute(chain));
    }
    subject.attributes.extend(fqan_attributes(fqans));

    let mut request = Request {
        subjects: vec![subject],
        ..Request::default()
    };
    if let Some(id) = resourceid {
        let mut resource = Resource::default();
        resource
            .attributes
            .push(Attribute::new(ids::XACML_RESOURCE_ID).value(id));
        request.resources.push(resource);
    }
    if let Some(id) = actionid {
        let mut action = Action::default();
        action
            .attributes
            .push(Attribute::new(ids::XACML_ACTION_ID).value(id));
        request.action = Some(action);
    }
    request
}
