//! Decoder output schema
//!
//! This module defines the shape of the decoded activity-file output the engine
//! consumes, and the table of message types it knows about.

mod bundle;
mod message_kind;

pub use bundle::*;
pub use message_kind::*;
