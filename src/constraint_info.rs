//! Constraint solver row descriptors.
//!
//! A constraint first reports how many rows it needs through
//! [`ConstraintInfo1`], then fills one [`ConstraintInfo2`] whose pointer
//! fields address per-row buffers (Jacobians, errors, CFM, limits), each
//! `rowskip` elements apart. The descriptor never owns those buffers.

use crate::ffi;

native_class! {
    /// Row count query (`btConstraintInfo1`).
    ConstraintInfo1 => "btConstraintInfo1", ffi::BtConstraintInfo1,
        new: ffi::bt_constraint_info1_new,
        delete: ffi::bt_constraint_info1_delete;
    fields {
        int num_constraint_rows / set_num_constraint_rows:
            ffi::bt_constraint_info1_num_constraint_rows_get,
            ffi::bt_constraint_info1_num_constraint_rows_set;
        int nub / set_nub: ffi::bt_constraint_info1_nub_get, ffi::bt_constraint_info1_nub_set;
    }
}

native_class! {
    /// Solver row descriptor (`btConstraintInfo2`).
    ///
    /// # Example
    ///
    /// ```
    /// use btrows::{ConstraintInfo2, ScalarArray};
    ///
    /// let cfm = ScalarArray::new(6)?;
    /// let info = ConstraintInfo2::new()?;
    /// info.set_rowskip(1)?;
    /// info.set_cfm(Some(cfm.as_ptr()?))?;
    ///
    /// // The pointer read back is borrowed: dropping it frees nothing.
    /// assert_eq!(info.cfm()?, Some(cfm.as_ptr()?));
    /// # Ok::<(), btrows::Error>(())
    /// ```
    ConstraintInfo2 => "btConstraintInfo2", ffi::BtConstraintInfo2,
        new: ffi::bt_constraint_info2_new,
        delete: ffi::bt_constraint_info2_delete;
    fields {
        scalar fps / set_fps: ffi::bt_constraint_info2_fps_get, ffi::bt_constraint_info2_fps_set;
        scalar erp / set_erp: ffi::bt_constraint_info2_erp_get, ffi::bt_constraint_info2_erp_set;
        scalar_ptr j1_linear_axis / set_j1_linear_axis:
            ffi::bt_constraint_info2_j1_linear_axis_get,
            ffi::bt_constraint_info2_j1_linear_axis_set;
        scalar_ptr j1_angular_axis / set_j1_angular_axis:
            ffi::bt_constraint_info2_j1_angular_axis_get,
            ffi::bt_constraint_info2_j1_angular_axis_set;
        scalar_ptr j2_linear_axis / set_j2_linear_axis:
            ffi::bt_constraint_info2_j2_linear_axis_get,
            ffi::bt_constraint_info2_j2_linear_axis_set;
        scalar_ptr j2_angular_axis / set_j2_angular_axis:
            ffi::bt_constraint_info2_j2_angular_axis_get,
            ffi::bt_constraint_info2_j2_angular_axis_set;
        int rowskip / set_rowskip:
            ffi::bt_constraint_info2_rowskip_get,
            ffi::bt_constraint_info2_rowskip_set;
        scalar_ptr constraint_error / set_constraint_error:
            ffi::bt_constraint_info2_constraint_error_get,
            ffi::bt_constraint_info2_constraint_error_set;
        scalar_ptr cfm / set_cfm: ffi::bt_constraint_info2_cfm_get, ffi::bt_constraint_info2_cfm_set;
        scalar_ptr lower_limit / set_lower_limit:
            ffi::bt_constraint_info2_lower_limit_get,
            ffi::bt_constraint_info2_lower_limit_set;
        scalar_ptr upper_limit / set_upper_limit:
            ffi::bt_constraint_info2_upper_limit_get,
            ffi::bt_constraint_info2_upper_limit_set;
        int_ptr findex / set_findex:
            ffi::bt_constraint_info2_findex_get,
            ffi::bt_constraint_info2_findex_set;
        int num_iterations / set_num_iterations:
            ffi::bt_constraint_info2_num_iterations_get,
            ffi::bt_constraint_info2_num_iterations_set;
        scalar damping / set_damping:
            ffi::bt_constraint_info2_damping_get,
            ffi::bt_constraint_info2_damping_set;
    }
}
