//! FFI surface of the native row-descriptor library.
//!
//! This module contains the low-level C ABI functions and layouts. Users
//! should prefer the safe Rust wrappers in the parent modules.

pub mod error;
pub mod handles;
pub mod raw;

pub use error::check_allocation;
pub use handles::*;
pub use raw::*;
