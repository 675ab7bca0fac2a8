//! C ABI surface of the native row-descriptor library.
//!
//! Layouts mirror Bullet's single-precision `btTypedConstraint::btConstraintInfo1`
//! and `btTypedConstraint::btConstraintInfo2`, plus `carrays`-style element
//! buffers. Every object is allocated here and must be destroyed through the
//! matching `*_delete` function.
//! Users should prefer the safe Rust wrappers in the parent modules.

use std::os::raw::c_int;
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Native scalar type (single precision build).
pub type BtScalar = f32;

/// Native library version, as reported by `btGetVersion()`.
pub const BT_BULLET_VERSION: c_int = 282;

static ALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static DEALLOCATIONS: AtomicU64 = AtomicU64::new(0);

fn note_alloc(class: &str, obj: usize) {
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    log::trace!("native new {}({:#x})", class, obj);
}

fn note_dealloc(class: &str, obj: usize) {
    DEALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    log::trace!("native delete {}({:#x})", class, obj);
}

/// Total native allocations and deallocations performed so far.
pub fn counters() -> (u64, u64) {
    (
        ALLOCATIONS.load(Ordering::Relaxed),
        DEALLOCATIONS.load(Ordering::Relaxed),
    )
}

/// Row count query result.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct BtConstraintInfo1 {
    pub num_constraint_rows: c_int,
    pub nub: c_int,
}

/// Row descriptor filled by a constraint for the solver.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BtConstraintInfo2 {
    pub fps: BtScalar,
    pub erp: BtScalar,
    pub j1_linear_axis: *mut BtScalar,
    pub j1_angular_axis: *mut BtScalar,
    pub j2_linear_axis: *mut BtScalar,
    pub j2_angular_axis: *mut BtScalar,
    pub rowskip: c_int,
    pub constraint_error: *mut BtScalar,
    pub cfm: *mut BtScalar,
    pub lower_limit: *mut BtScalar,
    pub upper_limit: *mut BtScalar,
    pub findex: *mut c_int,
    pub num_iterations: c_int,
    pub damping: BtScalar,
}

impl Default for BtConstraintInfo2 {
    fn default() -> Self {
        Self {
            fps: 0.0,
            erp: 0.0,
            j1_linear_axis: ptr::null_mut(),
            j1_angular_axis: ptr::null_mut(),
            j2_linear_axis: ptr::null_mut(),
            j2_angular_axis: ptr::null_mut(),
            rowskip: 0,
            constraint_error: ptr::null_mut(),
            cfm: ptr::null_mut(),
            lower_limit: ptr::null_mut(),
            upper_limit: ptr::null_mut(),
            findex: ptr::null_mut(),
            num_iterations: 0,
            damping: 0.0,
        }
    }
}

/// Element buffer header for `btScalar` arrays.
#[repr(C)]
#[derive(Debug)]
pub struct BtScalarArray {
    pub len: usize,
    pub data: *mut BtScalar,
}

/// Element buffer header for `int` arrays.
#[repr(C)]
#[derive(Debug)]
pub struct BtIntArray {
    pub len: usize,
    pub data: *mut c_int,
}

/// Returns the native library version.
pub extern "C" fn bt_get_version() -> c_int {
    BT_BULLET_VERSION
}

macro_rules! native_object {
    ($ty:ident, $class:literal, $new:ident, $delete:ident) => {
        pub extern "C" fn $new() -> *mut $ty {
            let obj = Box::into_raw(Box::<$ty>::default());
            note_alloc($class, obj as usize);
            obj
        }

        /// # Safety
        ///
        /// `obj` must be null or come from the matching constructor, and must
        /// not be used afterwards.
        pub unsafe extern "C" fn $delete(obj: *mut $ty) {
            if obj.is_null() {
                return;
            }
            note_dealloc($class, obj as usize);
            drop(Box::from_raw(obj));
        }
    };
}

/// Generates `*_get` / `*_set` pairs for plain struct fields.
macro_rules! native_fields {
    ($ty:ident { $($get:ident, $set:ident => $field:ident: $fty:ty;)* }) => {
        $(
            /// # Safety
            ///
            /// `obj` must point to a live object.
            pub unsafe extern "C" fn $get(obj: *const $ty) -> $fty {
                (*obj).$field
            }

            /// # Safety
            ///
            /// `obj` must point to a live object.
            pub unsafe extern "C" fn $set(obj: *mut $ty, value: $fty) {
                (*obj).$field = value;
            }
        )*
    };
}

macro_rules! native_array {
    ($arr:ident, $elem:ty, $class:literal, $new:ident, $delete:ident, $data:ident, $len:ident) => {
        /// Returns null if `len` elements cannot be allocated.
        pub extern "C" fn $new(len: usize) -> *mut $arr {
            let mut data = Vec::new();
            if data.try_reserve_exact(len).is_err() {
                return ptr::null_mut();
            }
            data.resize(len, <$elem>::default());
            let data = Box::into_raw(data.into_boxed_slice()) as *mut $elem;
            let arr = Box::into_raw(Box::new($arr { len, data }));
            note_alloc($class, arr as usize);
            arr
        }

        /// # Safety
        ///
        /// `arr` must be null or come from the matching constructor, and must
        /// not be used afterwards.
        pub unsafe extern "C" fn $delete(arr: *mut $arr) {
            if arr.is_null() {
                return;
            }
            note_dealloc($class, arr as usize);
            let arr = Box::from_raw(arr);
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(arr.data, arr.len)));
        }

        /// # Safety
        ///
        /// `arr` must point to a live array.
        pub unsafe extern "C" fn $data(arr: *const $arr) -> *mut $elem {
            (*arr).data
        }

        /// # Safety
        ///
        /// `arr` must point to a live array.
        pub unsafe extern "C" fn $len(arr: *const $arr) -> usize {
            (*arr).len
        }
    };
}

native_object!(
    BtConstraintInfo1,
    "btConstraintInfo1",
    bt_constraint_info1_new,
    bt_constraint_info1_delete
);

native_fields!(BtConstraintInfo1 {
    bt_constraint_info1_num_constraint_rows_get, bt_constraint_info1_num_constraint_rows_set => num_constraint_rows: c_int;
    bt_constraint_info1_nub_get, bt_constraint_info1_nub_set => nub: c_int;
});

native_object!(
    BtConstraintInfo2,
    "btConstraintInfo2",
    bt_constraint_info2_new,
    bt_constraint_info2_delete
);

native_fields!(BtConstraintInfo2 {
    bt_constraint_info2_fps_get, bt_constraint_info2_fps_set => fps: BtScalar;
    bt_constraint_info2_erp_get, bt_constraint_info2_erp_set => erp: BtScalar;
    bt_constraint_info2_j1_linear_axis_get, bt_constraint_info2_j1_linear_axis_set => j1_linear_axis: *mut BtScalar;
    bt_constraint_info2_j1_angular_axis_get, bt_constraint_info2_j1_angular_axis_set => j1_angular_axis: *mut BtScalar;
    bt_constraint_info2_j2_linear_axis_get, bt_constraint_info2_j2_linear_axis_set => j2_linear_axis: *mut BtScalar;
    bt_constraint_info2_j2_angular_axis_get, bt_constraint_info2_j2_angular_axis_set => j2_angular_axis: *mut BtScalar;
    bt_constraint_info2_rowskip_get, bt_constraint_info2_rowskip_set => rowskip: c_int;
    bt_constraint_info2_constraint_error_get, bt_constraint_info2_constraint_error_set => constraint_error: *mut BtScalar;
    bt_constraint_info2_cfm_get, bt_constraint_info2_cfm_set => cfm: *mut BtScalar;
    bt_constraint_info2_lower_limit_get, bt_constraint_info2_lower_limit_set => lower_limit: *mut BtScalar;
    bt_constraint_info2_upper_limit_get, bt_constraint_info2_upper_limit_set => upper_limit: *mut BtScalar;
    bt_constraint_info2_findex_get, bt_constraint_info2_findex_set => findex: *mut c_int;
    bt_constraint_info2_num_iterations_get, bt_constraint_info2_num_iterations_set => num_iterations: c_int;
    bt_constraint_info2_damping_get, bt_constraint_info2_damping_set => damping: BtScalar;
});

native_array!(
    BtScalarArray,
    BtScalar,
    "btScalarArray",
    bt_scalar_array_new,
    bt_scalar_array_delete,
    bt_scalar_array_data,
    bt_scalar_array_len
);

native_array!(
    BtIntArray,
    c_int,
    "intArray",
    bt_int_array_new,
    bt_int_array_delete,
    bt_int_array_data,
    bt_int_array_len
);
