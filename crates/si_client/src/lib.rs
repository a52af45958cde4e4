//! Blocking client for the System Initiative public API.
//!
//! [`SiClient`] binds a [`Session`] (token → workspace) to at most one active
//! change set and exposes one method per endpoint. Every scoped method fails
//! with [`ClientError::Precondition`] before touching the network when no
//! change set is active.
//!
//! Requests go through the [`Transport`] trait. [`HttpTransport`] talks to
//! the real service; [`mock::MockTransport`] replays canned responses for
//! tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use si_client::SiClient;
//! use si_protocol::ClientConfig;
//!
//! let config = ClientConfig::with_default_url(&token)?;
//! let mut client = SiClient::connect(config)?;
//! client.create_or_use_change_set("Add schema")?;
//! let schemas = client.search_schemas(Some("AWS::EC2"))?;
//! ```

pub mod client;
pub mod error;
pub mod mock;
pub mod session;
pub mod transport;

pub use client::SiClient;
pub use error::{ClientError, Result};
pub use session::{create_session, Session};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
