//! Natively allocated element buffers.
//!
//! These back the pointer fields of [`ConstraintInfo2`](crate::ConstraintInfo2).
//! The array handle owns the buffer; pointers handed out by `as_ptr` borrow it
//! and dangle once the array is released.

use crate::error::{Error, Result};
use crate::ffi;
use crate::handle::NativeHandle;

macro_rules! native_array {
    (
        $(#[$meta:meta])*
        $name:ident<$elem:ty> => $class:literal, $raw:ty, $ptr:ident,
        new: $new:path, delete: $delete:path, data: $data:path, len: $len:path
    ) => {
        $(#[$meta])*
        pub struct $name {
            handle: NativeHandle<$name>,
        }

        unsafe impl $crate::NativeType for $name {
            const CLASS_NAME: &'static str = $class;
            type Args = usize;

            fn allocate(len: usize) -> *mut std::ffi::c_void {
                $new(len).cast()
            }

            unsafe fn destroy(obj: *mut std::ffi::c_void) {
                $delete(obj.cast())
            }
        }

        impl $name {
            /// Allocate a zeroed native array of `len` elements.
            pub fn new(len: usize) -> Result<Self> {
                Ok(Self {
                    handle: NativeHandle::new(len)?,
                })
            }

            /// Allocate a native array holding a copy of `values`.
            pub fn from_slice(values: &[$elem]) -> Result<Self> {
                let array = Self::new(values.len())?;
                array.copy_from_slice(values)?;
                Ok(array)
            }

            /// Wrap an array address obtained elsewhere.
            ///
            /// # Safety
            ///
            /// See [`NativeHandle::from_raw`].
            pub unsafe fn from_raw(address: usize, owns: bool) -> Self {
                Self {
                    handle: NativeHandle::from_raw(address, owns),
                }
            }

            /// Give up the wrapper without destroying the native object.
            /// Returns the address, which the caller is now responsible for.
            pub fn into_raw(self) -> usize {
                self.handle.into_raw()
            }

            /// The underlying handle.
            pub fn handle(&self) -> &NativeHandle<$name> {
                &self.handle
            }

            /// Number of elements.
            pub fn len(&self) -> Result<usize> {
                self.handle.with_ptr(|arr| unsafe { $len(arr.cast::<$raw>()) })
            }

            /// Whether the array has no elements.
            pub fn is_empty(&self) -> Result<bool> {
                Ok(self.len()? == 0)
            }

            /// Borrowed pointer to the first element.
            pub fn as_ptr(&self) -> Result<ffi::$ptr> {
                self.handle
                    .with_ptr(|arr| unsafe { ffi::$ptr::from_address($data(arr.cast::<$raw>()) as usize) })
            }

            /// Read the element at `index`.
            pub fn get(&self, index: usize) -> Result<$elem> {
                self.with_elements(|data, len| {
                    if index >= len {
                        return Err(Error::IndexOutOfBounds { index, len });
                    }
                    Ok(unsafe { data.add(index).read() })
                })
            }

            /// Write the element at `index`.
            pub fn set(&self, index: usize, value: $elem) -> Result<()> {
                self.with_elements(|data, len| {
                    if index >= len {
                        return Err(Error::IndexOutOfBounds { index, len });
                    }
                    unsafe { data.add(index).write(value) };
                    Ok(())
                })
            }

            /// Copy `values` into the start of the array.
            pub fn copy_from_slice(&self, values: &[$elem]) -> Result<()> {
                self.with_elements(|data, len| {
                    if values.len() > len {
                        return Err(Error::IndexOutOfBounds {
                            index: values.len() - 1,
                            len,
                        });
                    }
                    unsafe { std::ptr::copy_nonoverlapping(values.as_ptr(), data, values.len()) };
                    Ok(())
                })
            }

            /// Copy the whole array out.
            pub fn to_vec(&self) -> Result<Vec<$elem>> {
                self.with_elements(|data, len| {
                    Ok(unsafe { std::slice::from_raw_parts(data, len) }.to_vec())
                })
            }

            fn with_elements<R>(&self, f: impl FnOnce(*mut $elem, usize) -> Result<R>) -> Result<R> {
                self.handle.with_ptr(|arr| {
                    let arr = arr.cast::<$raw>();
                    let (data, len) = unsafe { ($data(arr), $len(arr)) };
                    f(data, len)
                })?
            }
        }

        impl std::ops::Deref for $name {
            type Target = NativeHandle<$name>;

            fn deref(&self) -> &Self::Target {
                &self.handle
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.handle, f)
            }
        }
    };
}

native_array! {
    /// Native `btScalar` buffer.
    ScalarArray<f32> => "btScalarArray", ffi::BtScalarArray, ScalarPtr,
        new: ffi::bt_scalar_array_new,
        delete: ffi::bt_scalar_array_delete,
        data: ffi::bt_scalar_array_data,
        len: ffi::bt_scalar_array_len
}

native_array! {
    /// Native `int` buffer.
    IntArray<i32> => "intArray", ffi::BtIntArray, IntPtr,
        new: ffi::bt_int_array_new,
        delete: ffi::bt_int_array_delete,
        data: ffi::bt_int_array_data,
        len: ffi::bt_int_array_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_array_is_zeroed() {
        let a = ScalarArray::new(4).unwrap();
        assert_eq!(a.len().unwrap(), 4);
        assert_eq!(a.to_vec().unwrap(), vec![0.0; 4]);
        assert!(a.owns());
    }

    #[test]
    fn test_get_set_bounds() {
        let a = IntArray::new(2).unwrap();
        a.set(1, -1).unwrap();
        assert_eq!(a.get(1).unwrap(), -1);
        assert_eq!(
            a.get(2).unwrap_err(),
            Error::IndexOutOfBounds { index: 2, len: 2 }
        );
        assert!(a.set(5, 0).is_err());
    }

    #[test]
    fn test_from_slice_round_trip() {
        let a = ScalarArray::from_slice(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(a.copy_from_slice(&[0.0; 4]).is_err());
    }

    #[test]
    fn test_empty_array() {
        let a = IntArray::new(0).unwrap();
        assert!(a.is_empty().unwrap());
        assert!(a.to_vec().unwrap().is_empty());
        assert!(a.get(0).is_err());
    }

    #[test]
    fn test_oversized_allocation_fails() {
        let err = ScalarArray::new(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            Error::AllocationFailed {
                class: "btScalarArray"
            }
        );
    }

    #[test]
    fn test_unallocatable_length_fails_without_abort() {
        // Fits in `isize` bytes, but no allocator can satisfy it.
        let len = isize::MAX as usize / std::mem::size_of::<f32>();
        let err = ScalarArray::new(len).unwrap_err();
        assert!(err.is_allocation_failed());

        let err = IntArray::new(isize::MAX as usize / std::mem::size_of::<i32>()).unwrap_err();
        assert_eq!(err, Error::AllocationFailed { class: "intArray" });
    }

    #[test]
    fn test_pointer_addresses_elements() {
        let a = IntArray::from_slice(&[10, 20, 30]).unwrap();
        let p = a.as_ptr().unwrap();
        assert_eq!(unsafe { p.add(2).read(0) }, 30);
    }

    #[test]
    fn test_released_array_rejects_access() {
        let a = ScalarArray::new(1).unwrap();
        assert!(a.release());
        assert!(a.len().unwrap_err().is_released());
        assert!(a.as_ptr().unwrap_err().is_released());
    }
}
