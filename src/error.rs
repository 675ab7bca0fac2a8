//! Error types for the btrows crate.

use thiserror::Error;

use crate::schema::FieldKind;

/// Result type alias for btrows operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for btrows operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Handle is not bound to any native object.
    #[error("invalid handle: {class} is not bound to a native object")]
    InvalidHandle {
        /// Native class name.
        class: &'static str,
    },

    /// Handle was released; its native object must not be touched again.
    #[error("{class} handle already released")]
    AlreadyReleased {
        /// Native class name.
        class: &'static str,
    },

    /// The native allocator returned null.
    #[error("native allocation of {class} failed")]
    AllocationFailed {
        /// Native class name.
        class: &'static str,
    },

    /// Element index past the end of a native array.
    #[error("index {index} out of bounds for native array of length {len}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Array length.
        len: usize,
    },

    /// No field with this name in the class schema.
    #[error("{class} has no field named `{field}`")]
    UnknownField {
        /// Native class name.
        class: &'static str,
        /// Requested field name.
        field: String,
    },

    /// Value kind does not match the field's declared kind.
    #[error("field `{field}` holds {expected:?}, got {actual:?}")]
    FieldKind {
        /// Field name.
        field: &'static str,
        /// Kind declared in the schema.
        expected: FieldKind,
        /// Kind of the supplied value.
        actual: FieldKind,
    },
}

impl Error {
    /// Check if this is an unbound handle error.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Error::InvalidHandle { .. })
    }

    /// Check if this is a use-after-release error.
    pub fn is_released(&self) -> bool {
        matches!(self, Error::AlreadyReleased { .. })
    }

    /// Check if this is an allocation failure.
    pub fn is_allocation_failed(&self) -> bool {
        matches!(self, Error::AllocationFailed { .. })
    }
}
