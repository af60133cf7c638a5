//! Integration test crate for the configurator workspace.
//!
//! This crate exists for its `tests/` directory; the library itself is
//! empty.

#![cfg_attr(not(test), forbid(unsafe_code))]
