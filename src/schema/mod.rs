//! Landmark Hunt input schema
//!
//! This module defines the session-document input: how raw uploaded bytes are
//! decoded into text, and how that text is read null-safely into typed records.

mod decode;
mod document;

pub use decode::*;
pub use document::*;
