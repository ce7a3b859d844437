//! # sdplus
//!
//! A client for the ManageEngine ServiceDesk Plus REST/XML API
//! (`/sdpapi/...`).
//!
//! Each operation is one HTTP call: input fields are wrapped in the
//! vendor's `<Operation><Details>...</Details></Operation>` envelope, and
//! the XML answer is normalized either into an [`OperationResult`]
//! (status, message and flattened parameters) or into a generic
//! `serde_json::Value` tree, from which list answers are reduced to
//! [`Record`]s.
//!
//! ## Architecture
//!
//! - [`config`] - Explicit endpoint and credential configuration
//! - [`error`] - Error type with API key sanitization
//! - [`envelope`] - Request envelope builder
//! - [`xml`] - Generic XML tree and XML-to-JSON conversion
//! - [`response`] - Direct and generic response normalization
//! - [`models`] - Results, records, technician directory, request filters
//! - [`sdp_client`] - HTTP transport and the per-operation methods
//!
//! ## Failures
//!
//! Transport and parse problems are `Err(SdpError)`. A failure reported by
//! ServiceDesk Plus itself is data: the returned `OperationResult` has
//! `is_success() == false` and carries the server's message.
//!
//! ## Example
//!
//! ```ignore
//! use sdplus::{Config, Fields, SdpClient};
//!
//! async fn example() -> Result<(), sdplus::SdpError> {
//!     let config = Config::new("http://sdplus/sdpapi/", "0AB1-CD23-...")?;
//!     let client = SdpClient::new(&config)?;
//!
//!     let created = client
//!         .request_add(
//!             Fields::new()
//!                 .with("requester", "Simon Crouch")
//!                 .with("subject", "Printer not working"),
//!         )
//!         .await?;
//!
//!     if let Some(id) = created.get("workorderid") {
//!         client.note_add(id, false, "Toner ordered").await?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod models;
pub mod response;
pub mod sdp_client;
pub mod xml;

pub use config::Config;
pub use envelope::Fields;
pub use error::SdpError;
pub use models::{DatedRecord, OperationResult, Queue, Record, TechnicianDirectory};
pub use sdp_client::{OperationCall, RequestListParams, SdpClient};
