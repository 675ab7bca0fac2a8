//! Ownership-tracking handles for Bullet constraint solver row descriptors.
//!
//! This crate exposes the solver's row descriptors (`btConstraintInfo1`,
//! `btConstraintInfo2`) and the element buffers behind their pointer fields
//! through a C ABI, wrapped in handles that know whether they own the native
//! object. An owned object is destroyed exactly once: on explicit
//! [`release`](NativeHandle::release), when its handle is rebound, or when the
//! handle is dropped, whichever comes first. Borrowed handles never destroy
//! anything.
//!
//! # Example
//!
//! ```
//! use btrows::{ConstraintInfo2, HandleStatus, ScalarArray};
//!
//! fn main() -> btrows::Result<()> {
//!     let error = ScalarArray::new(3)?;
//!     let info = ConstraintInfo2::new()?;
//!     info.set_fps(60.0)?;
//!     info.set_rowskip(1)?;
//!     info.set_constraint_error(Some(error.as_ptr()?))?;
//!     assert_eq!(info.fps()?, 60.0);
//!
//!     // A second, non-owning view of the same descriptor.
//!     let view = unsafe { ConstraintInfo2::from_raw(info.address(), false) };
//!     assert_eq!(view.status(), HandleStatus::Bound { owns: false });
//!     drop(view);
//!     assert_eq!(info.fps()?, 60.0);
//!
//!     // Release early; dropping `info` later is a no-op.
//!     assert!(info.release());
//!     assert!(info.fps().is_err());
//!     Ok(())
//! }
//! ```

#[macro_use]
mod macros;

pub mod array;
pub mod constraint_info;
pub mod error;
mod ffi;
pub mod handle;
pub mod schema;
pub mod types;

// Re-export main types at the crate root
pub use array::{IntArray, ScalarArray};
pub use constraint_info::{ConstraintInfo1, ConstraintInfo2};
pub use error::{Error, Result};
pub use ffi::{IntPtr, ScalarPtr};
pub use handle::{HandleStatus, NativeHandle, NativeType};
pub use schema::{FieldInfo, FieldKind, FieldValue, NativeSchema};
pub use types::NativeStats;

/// API version constants.
pub mod version {
    /// API major version.
    pub const MAJOR: i32 = 0;
    /// API minor version.
    pub const MINOR: i32 = 1;
    /// API patch version.
    pub const PATCH: i32 = 0;
}

/// Get the API version string (e.g., "0.1.0").
pub fn api_version() -> String {
    format!("{}.{}.{}", version::MAJOR, version::MINOR, version::PATCH)
}

/// Check if this crate is compatible with code written against the given
/// version.
///
/// Returns `true` if the major versions match and `minor` is not newer than
/// ours.
pub fn api_version_compatible(major: i32, minor: i32) -> bool {
    major == version::MAJOR && minor <= version::MINOR
}

/// Native library version, encoded as `major * 100 + minor` (e.g. 282).
pub fn bullet_version() -> i32 {
    ffi::bt_get_version()
}

/// Snapshot of the native layer's allocation counters.
pub fn native_stats() -> NativeStats {
    let (allocations, deallocations) = ffi::counters();
    NativeStats {
        allocations,
        deallocations,
    }
}
