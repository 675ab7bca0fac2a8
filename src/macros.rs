//! Generators for native class wrappers.

/// Maps a field kind keyword to its [`FieldKind`](crate::schema::FieldKind).
macro_rules! field_kind {
    (scalar) => {
        $crate::schema::FieldKind::Scalar
    };
    (int) => {
        $crate::schema::FieldKind::Int
    };
    (scalar_ptr) => {
        $crate::schema::FieldKind::ScalarPtr
    };
    (int_ptr) => {
        $crate::schema::FieldKind::IntPtr
    };
}

/// Typed getter/setter pair forwarding to a native field accessor.
macro_rules! field_accessor {
    (scalar, $raw:ty, $field:ident, $setter:ident, $get:path, $set:path) => {
        #[doc = concat!("Read `", stringify!($field), "`.")]
        pub fn $field(&self) -> $crate::Result<f32> {
            self.handle.with_ptr(|obj| unsafe { $get(obj.cast::<$raw>()) })
        }

        #[doc = concat!("Write `", stringify!($field), "`.")]
        pub fn $setter(&self, value: f32) -> $crate::Result<()> {
            self.handle.with_ptr(|obj| unsafe { $set(obj.cast::<$raw>(), value) })
        }
    };
    (int, $raw:ty, $field:ident, $setter:ident, $get:path, $set:path) => {
        #[doc = concat!("Read `", stringify!($field), "`.")]
        pub fn $field(&self) -> $crate::Result<i32> {
            self.handle.with_ptr(|obj| unsafe { $get(obj.cast::<$raw>()) })
        }

        #[doc = concat!("Write `", stringify!($field), "`.")]
        pub fn $setter(&self, value: i32) -> $crate::Result<()> {
            self.handle.with_ptr(|obj| unsafe { $set(obj.cast::<$raw>(), value) })
        }
    };
    (scalar_ptr, $raw:ty, $field:ident, $setter:ident, $get:path, $set:path) => {
        #[doc = concat!("Read the `", stringify!($field), "` pointer. `None` when null.")]
        pub fn $field(&self) -> $crate::Result<Option<$crate::ScalarPtr>> {
            self.handle.with_ptr(|obj| unsafe {
                $crate::ScalarPtr::from_mut_ptr($get(obj.cast::<$raw>()))
            })
        }

        #[doc = concat!("Point `", stringify!($field), "` at borrowed memory, or null it.")]
        pub fn $setter(&self, value: Option<$crate::ScalarPtr>) -> $crate::Result<()> {
            let ptr = value.map_or(std::ptr::null_mut(), $crate::ScalarPtr::as_mut_ptr);
            self.handle.with_ptr(|obj| unsafe { $set(obj.cast::<$raw>(), ptr) })
        }
    };
    (int_ptr, $raw:ty, $field:ident, $setter:ident, $get:path, $set:path) => {
        #[doc = concat!("Read the `", stringify!($field), "` pointer. `None` when null.")]
        pub fn $field(&self) -> $crate::Result<Option<$crate::IntPtr>> {
            self.handle.with_ptr(|obj| unsafe {
                $crate::IntPtr::from_mut_ptr($get(obj.cast::<$raw>()))
            })
        }

        #[doc = concat!("Point `", stringify!($field), "` at borrowed memory, or null it.")]
        pub fn $setter(&self, value: Option<$crate::IntPtr>) -> $crate::Result<()> {
            let ptr = value.map_or(std::ptr::null_mut(), $crate::IntPtr::as_mut_ptr);
            self.handle.with_ptr(|obj| unsafe { $set(obj.cast::<$raw>(), ptr) })
        }
    };
}

/// Defines a wrapper for a fixed-layout native class.
///
/// The wrapper owns a [`NativeHandle`](crate::NativeHandle) to itself and
/// dereferences to it, so every class shares the same lifecycle surface.
/// Field names must match the `#[repr(C)]` layout's field names.
macro_rules! native_class {
    (
        $(#[$meta:meta])*
        $name:ident => $class:literal, $raw:ty, new: $new:path, delete: $delete:path;
        fields {
            $( $kind:ident $field:ident / $setter:ident: $get:path, $set:path; )*
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            handle: $crate::NativeHandle<$name>,
        }

        unsafe impl $crate::NativeType for $name {
            const CLASS_NAME: &'static str = $class;
            type Args = ();

            fn allocate(_: ()) -> *mut std::ffi::c_void {
                $new().cast()
            }

            unsafe fn destroy(obj: *mut std::ffi::c_void) {
                $delete(obj.cast())
            }
        }

        unsafe impl $crate::schema::NativeSchema for $name {
            const FIELDS: &'static [$crate::schema::FieldInfo] = &[
                $(
                    $crate::schema::FieldInfo {
                        name: stringify!($field),
                        kind: field_kind!($kind),
                        offset: std::mem::offset_of!($raw, $field),
                    },
                )*
            ];
        }

        impl $name {
            #[doc = concat!("Allocate a new native `", $class, "` owned by this wrapper.")]
            pub fn new() -> $crate::Result<Self> {
                Ok(Self {
                    handle: $crate::NativeHandle::new(())?,
                })
            }

            #[doc = concat!("Wrap a `", $class, "` address obtained elsewhere.")]
            ///
            /// # Safety
            ///
            /// See [`NativeHandle::from_raw`](crate::NativeHandle::from_raw).
            pub unsafe fn from_raw(address: usize, owns: bool) -> Self {
                Self {
                    handle: $crate::NativeHandle::from_raw(address, owns),
                }
            }

            /// Give up the wrapper without destroying the native object.
            /// Returns the address, which the caller is now responsible for.
            pub fn into_raw(self) -> usize {
                self.handle.into_raw()
            }

            /// The underlying handle.
            pub fn handle(&self) -> &$crate::NativeHandle<$name> {
                &self.handle
            }

            $(
                field_accessor!($kind, $raw, $field, $setter, $get, $set);
            )*
        }

        impl std::ops::Deref for $name {
            type Target = $crate::NativeHandle<$name>;

            fn deref(&self) -> &Self::Target {
                &self.handle
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.handle == other.handle
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.handle, f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.handle, f)
            }
        }
    };
}
