//! # pepc-core
//!
//! Client library for a XACML Policy Enforcement Point daemon (PEPd) that
//! speaks a Hessian 1.0 binary envelope over HTTP(S).
//!
//! The crate is organized in layers, leaves first:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              PepClient                   │  HTTP(S) POST + failover
//! ├─────────────────────────────────────────┤
//! │              marshal                     │  XACML ⇄ typed Hessian maps
//! ├─────────────────────────────────────────┤
//! │              hessian                     │  tagged value tree ⇄ bytes
//! ├─────────────────────────────────────────┤
//! │              xacml                       │  Request/Response object model
//! └─────────────────────────────────────────┘
//! ```
//!
//! The [`hessian`] and [`marshal`] layers are pure: they perform no I/O,
//! share no state between calls, and produce deterministic output for a
//! given input graph. All network traffic lives in [`client`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use pepc_core::client::{ClientConfig, PepClient};
//! use pepc_core::xacml::{ids, Attribute, Request, Subject};
//!
//! let mut subject = Subject::default();
//! subject.attributes.push(
//!     Attribute::new(ids::XACML_SUBJECT_ID)
//!         .data_type(ids::XACML_DATATYPE_X500_NAME)
//!         .value("CN=Alice,O=Example,C=CH"),
//! );
//! let mut request = Request::default();
//! request.subjects.push(subject);
//!
//! let config = ClientConfig::default().endpoint("https://pepd.example.org:8154/authz");
//! let client = PepClient::new(config)?;
//! let response = client.authorize(&request)?;
//! # Ok::<(), pepc_core::client::ClientError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod hessian;
pub mod marshal;
pub mod xacml;

pub use client::{ClientConfig, ClientError, PepClient};
pub use marshal::{marshal_request, unmarshal_response, UnmarshalError};
pub use xacml::{Request, Response};
