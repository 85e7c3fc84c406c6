//! Well-known XACML and AuthZ Interop identifiers.
//!
//! The codec treats every identifier as an opaque string; these constants
//! exist for request builders and for rendering responses.

/// Subject identifier attribute (the user DN).
pub const XACML_SUBJECT_ID: &str = "urn:oasis:names:tc:xacml:1.0:subject:subject-id";

/// Resource identifier attribute.
pub const XACML_RESOURCE_ID: &str = "urn:oasis:names:tc:xacml:1.0:resource:resource-id";

/// Action identifier attribute.
pub const XACML_ACTION_ID: &str = "urn:oasis:names:tc:xacml:1.0:action:action-id";

/// String datatype.
pub const XACML_DATATYPE_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// X.500 distinguished name datatype.
pub const XACML_DATATYPE_X500_NAME: &str = "urn:oasis:names:tc:xacml:1.0:data-type:x500Name";

/// Base64-encoded binary datatype.
pub const XACML_DATATYPE_BASE64_BINARY: &str = "http://www.w3.org/2001/XMLSchema#base64Binary";

/// Success status code.
pub const XACML_STATUSCODE_OK: &str = "urn:oasis:names:tc:xacml:1.0:status:ok";

/// Processing-error status code.
pub const XACML_STATUSCODE_PROCESSING_ERROR: &str =
    "urn:oasis:names:tc:xacml:1.0:status:processing-error";

/// AuthZ Interop subject attribute: PEM certificate chain.
pub const AUTHZINTEROP_SUBJECT_CERTCHAIN: &str =
    "http://authz-interop.org/xacml/subject/cert-chain";

/// AuthZ Interop subject attribute: all VOMS FQANs, in order.
pub const AUTHZINTEROP_SUBJECT_VOMS_FQAN: &str =
    "http://authz-interop.org/xacml/subject/voms-fqan";

/// AuthZ Interop subject attribute: the primary VOMS FQAN.
pub const AUTHZINTEROP_SUBJECT_VOMS_PRIMARY_FQAN: &str =
    "http://authz-interop.org/xacml/subject/voms-primary-fqan";

/// AuthZ Interop obligation: map the user to a POSIX UID/GID pair.
pub const AUTHZINTEROP_OBLIGATION_UIDGID: &str =
    "http://authz-interop.org/xacml/obligation/uidgid";

/// AuthZ Interop obligation: secondary POSIX GIDs.
pub const AUTHZINTEROP_OBLIGATION_SECONDARY_GIDS: &str =
    "http://authz-interop.org/xacml/obligation/secondary-gids";

/// AuthZ Interop obligation: map the user to a local account name.
pub const AUTHZINTEROP_OBLIGATION_USERNAME: &str =
    "http://authz-interop.org/xacml/obligation/username";

/// Assignment carrying a POSIX UID.
pub const AUTHZINTEROP_ATTR_POSIX_UID: &str =
    "http://authz-interop.org/xacml/attribute/posix-uid";

/// Assignment carrying a POSIX GID.
pub const AUTHZINTEROP_ATTR_POSIX_GID: &str =
    "http://authz-interop.org/xacml/attribute/posix-gid";

/// Assignment carrying a local account name.
pub const AUTHZINTEROP_ATTR_USERNAME: &str =
    "http://authz-interop.org/xacml/attribute/username";
