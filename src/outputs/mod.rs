//! Output generation for ranked results.
//!
//! # Submodules
//!
//! - [`json`]: Serializes [`RankedResult`](crate::models::RankedResult)s as
//!   a pretty-printed JSON array, to stdout or to a file

pub mod json;
