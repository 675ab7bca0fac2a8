//! Field schemas for native classes.
//!
//! Each class describes its fields as a table of name, kind and byte offset.
//! The typed accessors on the wrappers are generated from the same table, and
//! [`NativeHandle::get_field`] / [`NativeHandle::set_field`] use it directly.

use std::os::raw::c_int;

use crate::error::{Error, Result};
use crate::ffi::{BtScalar, IntPtr, ScalarPtr};
use crate::handle::{NativeHandle, NativeType};

/// Semantic type of a native field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `btScalar`.
    Scalar,
    /// `int`.
    Int,
    /// `btScalar*`, borrowed.
    ScalarPtr,
    /// `int*`, borrowed.
    IntPtr,
}

/// One entry of a class schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name.
    pub name: &'static str,
    /// Semantic type.
    pub kind: FieldKind,
    /// Byte offset inside the native structure.
    pub offset: usize,
}

/// A field value read from or written to a native object.
///
/// Pointer values never own their target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// A `btScalar`.
    Scalar(f32),
    /// A C `int`.
    Int(i32),
    /// Borrowed pointer to `btScalar` elements. May be null.
    ScalarPtr(ScalarPtr),
    /// Borrowed pointer to `int` elements. May be null.
    IntPtr(IntPtr),
}

impl FieldValue {
    /// Kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Scalar(_) => FieldKind::Scalar,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::ScalarPtr(_) => FieldKind::ScalarPtr,
            FieldValue::IntPtr(_) => FieldKind::IntPtr,
        }
    }
}

/// A native class with a field schema.
///
/// # Safety
///
/// Every [`FieldInfo`] must describe a field of the native layout at its true
/// offset and with its true type.
pub unsafe trait NativeSchema: NativeType {
    /// Fields in declaration order.
    const FIELDS: &'static [FieldInfo];

    /// Look up a field by name.
    fn field(name: &str) -> Option<&'static FieldInfo> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }
}

fn lookup<T: NativeSchema>(name: &str) -> Result<&'static FieldInfo> {
    T::field(name).ok_or_else(|| Error::UnknownField {
        class: T::CLASS_NAME,
        field: name.to_string(),
    })
}

impl<T: NativeSchema> NativeHandle<T> {
    /// Read a field by name.
    pub fn get_field(&self, name: &str) -> Result<FieldValue> {
        let info = lookup::<T>(name)?;
        self.with_ptr(|obj| unsafe {
            let at = obj.cast::<u8>().add(info.offset);
            match info.kind {
                FieldKind::Scalar => FieldValue::Scalar(at.cast::<BtScalar>().read()),
                FieldKind::Int => FieldValue::Int(at.cast::<c_int>().read()),
                FieldKind::ScalarPtr => FieldValue::ScalarPtr(ScalarPtr::from_address(
                    at.cast::<*mut BtScalar>().read() as usize,
                )),
                FieldKind::IntPtr => FieldValue::IntPtr(IntPtr::from_address(
                    at.cast::<*mut c_int>().read() as usize,
                )),
            }
        })
    }

    /// Write a field by name. The value's kind must match the schema.
    pub fn set_field(&self, name: &str, value: FieldValue) -> Result<()> {
        let info = lookup::<T>(name)?;
        if value.kind() != info.kind {
            return Err(Error::FieldKind {
                field: info.name,
                expected: info.kind,
                actual: value.kind(),
            });
        }
        self.with_ptr(|obj| unsafe {
            let at = obj.cast::<u8>().add(info.offset);
            match value {
                FieldValue::Scalar(v) => at.cast::<BtScalar>().write(v),
                FieldValue::Int(v) => at.cast::<c_int>().write(v),
                FieldValue::ScalarPtr(p) => at.cast::<*mut BtScalar>().write(p.as_mut_ptr()),
                FieldValue::IntPtr(p) => at.cast::<*mut c_int>().write(p.as_mut_ptr()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstraintInfo1, ConstraintInfo2};

    #[test]
    fn test_offsets_follow_declaration_order() {
        for fields in [ConstraintInfo1::FIELDS, ConstraintInfo2::FIELDS] {
            for pair in fields.windows(2) {
                assert!(
                    pair[0].offset < pair[1].offset,
                    "{} should precede {}",
                    pair[0].name,
                    pair[1].name
                );
            }
        }
    }

    #[test]
    fn test_info2_schema() {
        assert_eq!(ConstraintInfo2::FIELDS.len(), 14);
        let fps = ConstraintInfo2::field("fps").unwrap();
        assert_eq!(fps.offset, 0);
        assert_eq!(fps.kind, FieldKind::Scalar);
        assert_eq!(
            ConstraintInfo2::field("findex").unwrap().kind,
            FieldKind::IntPtr
        );
        assert!(ConstraintInfo2::field("nub").is_none());
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(FieldValue::Int(3).kind(), FieldKind::Int);
        assert_eq!(
            FieldValue::ScalarPtr(ScalarPtr::null()).kind(),
            FieldKind::ScalarPtr
        );
    }
}
