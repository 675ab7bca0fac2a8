//! Error conversion utilities for FFI.

use crate::error::{Error, Result};

/// Convert the result of a native allocator into an address.
///
/// Native allocators signal failure by returning null; that becomes
/// [`Error::AllocationFailed`] for `class`.
pub fn check_allocation<P>(obj: *mut P, class: &'static str) -> Result<usize> {
    if obj.is_null() {
        log::error!("native allocation of {} failed", class);
        return Err(Error::AllocationFailed { class });
    }
    Ok(obj as usize)
}
