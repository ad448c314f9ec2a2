//! Synheart Fit - Activity summary and HRV derivation engine
//!
//! Fit turns the output of an activity-file decoder into derived artifacts
//! through a deterministic pipeline: message normalization → summary extraction
//! (with HRV analysis) → data type listing → report encoding.
//!
//! ## Modules
//!
//! - **Schema**: Decoder output model and the table of known message types
//! - **Summary**: Session-first activity summary with per-record fallback
//! - **HRV**: RR interval extraction and time-domain statistics

pub mod aggregate;
pub mod catalog;
pub mod encoder;
pub mod error;
pub mod hrv;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod summary;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use catalog::DataCatalog;
pub use error::ComputeError;
pub use hrv::{HrvAnalyzer, HrvOptions, RrIntervalExtractor};
pub use normalizer::{MessageNormalizer, NormalizedGroups};
pub use pipeline::{hrv_from_rr_json, summarize_decoded_json, FitProcessor};
pub use summary::SummaryExtractor;

// Schema exports
pub use schema::{DecodedMessageBundle, DecoderOutput, MessageKind};

/// Fit version embedded in all reports
pub const FIT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-fit";
