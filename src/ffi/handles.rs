//! Borrowed pointer types for native scalar and integer memory.
//!
//! Each pointer type is a newtype wrapper around the native address. They
//! never own what they point at: the memory belongs to a native array or a
//! containing structure.

use std::os::raw::c_int;

/// Macro to define a typed, non-owning pointer.
macro_rules! define_pointer {
    ($(#[$meta:meta])* $name:ident, $elem:ty) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            _p: usize,
        }

        impl $name {
            /// Create a null pointer.
            #[inline]
            pub const fn null() -> Self {
                Self { _p: 0 }
            }

            /// Wrap a native address.
            #[inline]
            pub const fn from_address(address: usize) -> Self {
                Self { _p: address }
            }

            /// Check if this pointer is null.
            #[inline]
            pub const fn is_null(&self) -> bool {
                self._p == 0
            }

            /// The native address.
            #[inline]
            pub const fn address(&self) -> usize {
                self._p
            }

            /// Pointer `count` elements further on.
            #[inline]
            pub const fn add(self, count: usize) -> Self {
                Self {
                    _p: self._p.wrapping_add(count.wrapping_mul(std::mem::size_of::<$elem>())),
                }
            }

            #[inline]
            pub(crate) fn as_mut_ptr(self) -> *mut $elem {
                self._p as *mut $elem
            }

            #[inline]
            pub(crate) fn from_mut_ptr(ptr: *mut $elem) -> Option<Self> {
                if ptr.is_null() {
                    None
                } else {
                    Some(Self { _p: ptr as usize })
                }
            }

            /// Read the element at `index`.
            ///
            /// # Safety
            ///
            /// The pointer must be non-null, aligned, and `index` must lie inside
            /// the live native allocation it points into.
            #[inline]
            pub unsafe fn read(self, index: usize) -> $elem {
                self.as_mut_ptr().add(index).read()
            }

            /// Write the element at `index`.
            ///
            /// # Safety
            ///
            /// Same requirements as [`read`](Self::read), and no other thread may
            /// access the element concurrently.
            #[inline]
            pub unsafe fn write(self, index: usize, value: $elem) {
                self.as_mut_ptr().add(index).write(value)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }
    };
}

define_pointer!(
    /// Non-owning pointer to native `btScalar` memory.
    ScalarPtr,
    f32
);
define_pointer!(
    /// Non-owning pointer to native `int` memory.
    IntPtr,
    c_int
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_pointer() {
        let p = ScalarPtr::default();
        assert!(p.is_null());
        assert_eq!(p.address(), 0);
        assert_eq!(ScalarPtr::from_mut_ptr(std::ptr::null_mut()), None);
    }

    #[test]
    fn test_add_counts_elements() {
        let p = IntPtr::from_address(0x1000);
        assert_eq!(p.add(3).address(), 0x1000 + 3 * 4);
        assert_eq!(ScalarPtr::from_address(0x20).add(0), ScalarPtr::from_address(0x20));
        assert_eq!(
            IntPtr::from_address(0x10).add(usize::MAX).address(),
            0x10usize.wrapping_sub(4)
        );
    }

    #[test]
    fn test_read_write_local_buffer() {
        let mut buf = [0.0f32; 4];
        let p = ScalarPtr::from_mut_ptr(buf.as_mut_ptr()).unwrap();
        unsafe {
            p.write(2, 1.5);
            assert_eq!(p.add(2).read(0), 1.5);
        }
        assert_eq!(buf[2], 1.5);
    }
}
