//! Basic example: fill one solver row descriptor for a three-row constraint.
//!
//! Run with: cargo run --example basic

use btrows::{ConstraintInfo1, ConstraintInfo2, HandleStatus, IntArray, ScalarArray};

fn main() -> btrows::Result<()> {
    println!("API Version: {}", btrows::api_version());
    println!("Bullet version: {}", btrows::bullet_version());

    // Ask the constraint how many rows it needs.
    let info1 = ConstraintInfo1::new()?;
    info1.set_num_constraint_rows(3)?;
    info1.set_nub(3)?;
    let rows = info1.num_constraint_rows()? as usize;
    println!("\n{} reports {} rows", info1, rows);

    // Row buffers are owned by their arrays; the descriptor only borrows them.
    let rowskip = 8;
    let j1_linear = ScalarArray::new(rows * rowskip)?;
    let error = ScalarArray::new(rows)?;
    let cfm = ScalarArray::new(rows)?;
    let lower = ScalarArray::from_slice(&vec![f32::MIN; rows])?;
    let upper = ScalarArray::from_slice(&vec![f32::MAX; rows])?;
    let findex = IntArray::from_slice(&vec![-1; rows])?;

    let info2 = ConstraintInfo2::new()?;
    info2.set_fps(60.0)?;
    info2.set_erp(0.2)?;
    info2.set_rowskip(rowskip as i32)?;
    info2.set_j1_linear_axis(Some(j1_linear.as_ptr()?))?;
    info2.set_constraint_error(Some(error.as_ptr()?))?;
    info2.set_cfm(Some(cfm.as_ptr()?))?;
    info2.set_lower_limit(Some(lower.as_ptr()?))?;
    info2.set_upper_limit(Some(upper.as_ptr()?))?;
    info2.set_findex(Some(findex.as_ptr()?))?;

    // Write unit linear Jacobians through the borrowed pointer, row by row.
    if let Some(j1) = info2.j1_linear_axis()? {
        for row in 0..rows {
            unsafe { j1.add(row * rowskip).write(row, 1.0) };
        }
    }
    println!("J1 linear rows: {:?}", j1_linear.to_vec()?);

    println!("\n--- Schema ---");
    for field in <ConstraintInfo2 as btrows::NativeSchema>::FIELDS {
        println!(
            "  {:<18} {:?} at offset {} = {:?}",
            field.name,
            field.kind,
            field.offset,
            info2.get_field(field.name)?
        );
    }

    // A borrowed view never frees the descriptor.
    let view = unsafe { ConstraintInfo2::from_raw(info2.address(), false) };
    println!("\nView: {:?}", view);
    drop(view);
    assert_eq!(info2.status(), HandleStatus::Bound { owns: true });

    // Explicit release; the later drop is a no-op.
    info2.release();
    println!("After release: {:?}", info2.status());
    match info2.erp() {
        Ok(_) => println!("unexpected access after release"),
        Err(e) => println!("Access after release rejected: {}", e),
    }

    let stats = btrows::native_stats();
    println!(
        "\nNative objects: {} allocated, {} destroyed",
        stats.allocations, stats.deallocations
    );

    Ok(())
}
