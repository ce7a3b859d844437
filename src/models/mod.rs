//! Data models for ServiceDesk Plus responses.
//!
//! This module contains the direct-mode operation result, record
//! extraction for list responses, the technician directory and request
//! filter lookup.

mod common;
mod queue;
mod record;
mod technician;

pub use common::*;
pub use queue::*;
pub use record::*;
pub use technician::*;
