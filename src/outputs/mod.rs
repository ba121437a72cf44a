//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: renders the ordered publications and replaces the cache file
//!
//! # Output Structure
//!
//! ```text
//! publications.json   # [{"title": ..., "date": "2021-06-15T00:00:00.000Z", ...}, ...]
//! ```

pub mod json;
