//! Common utilities for the loam HTML toolkit.
//!
//! This crate provides shared infrastructure used by the parser, DOM, and
//! selector crates:
//! - **Warning System** - deduplicated terminal output for recovered errors
//! - **URL Resolution** - relative-to-absolute URL resolution for `abs_url`

pub mod url;
pub mod warning;
