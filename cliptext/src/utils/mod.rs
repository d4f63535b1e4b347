//! Utility modules for cliptext.
//!
//! # Modules
//!
//! - [`fingerprint`]: Content fingerprints used to deduplicate clipboard text
//! - [`label`]: Menu label truncation

pub mod fingerprint;
pub mod label;

pub use fingerprint::fingerprint;
pub use label::{truncate_label, LABEL_WIDTH};
