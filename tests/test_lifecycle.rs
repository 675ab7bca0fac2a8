//! Handle lifecycle tests.
//!
//! A tracked class counts native destructor calls through a counter carried in
//! each allocation, so tests running in parallel never share counts.

use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use btrows::{ConstraintInfo2, HandleStatus, NativeHandle, NativeType};

struct TrackedRow {
    frees: Arc<AtomicUsize>,
    erp: f32,
}

enum Tracked {}

unsafe impl NativeType for Tracked {
    const CLASS_NAME: &'static str = "TrackedRow";
    type Args = Arc<AtomicUsize>;

    fn allocate(frees: Self::Args) -> *mut c_void {
        Box::into_raw(Box::new(TrackedRow { frees, erp: 0.0 })).cast()
    }

    unsafe fn destroy(obj: *mut c_void) {
        let row = Box::from_raw(obj.cast::<TrackedRow>());
        row.frees.fetch_add(1, Ordering::SeqCst);
    }
}

fn tracked() -> (NativeHandle<Tracked>, Arc<AtomicUsize>) {
    let frees = Arc::new(AtomicUsize::new(0));
    let handle = NativeHandle::<Tracked>::new(Arc::clone(&frees)).expect("allocation should succeed");
    (handle, frees)
}

fn set_erp(handle: &NativeHandle<Tracked>, value: f32) -> btrows::Result<()> {
    handle.with_ptr(|obj| unsafe { (*obj.cast::<TrackedRow>()).erp = value })
}

fn erp(handle: &NativeHandle<Tracked>) -> btrows::Result<f32> {
    handle.with_ptr(|obj| unsafe { (*obj.cast::<TrackedRow>()).erp })
}

#[test]
fn test_double_release_frees_once() {
    let (handle, frees) = tracked();
    handle.release();
    handle.release();
    assert_eq!(frees.load(Ordering::SeqCst), 1);
}

#[test]
fn test_release_clears_address_and_guards_fields() {
    let (handle, _frees) = tracked();
    assert_ne!(handle.address(), 0);
    handle.release();

    assert_eq!(handle.address(), 0, "address should be cleared on release");
    assert!(erp(&handle).unwrap_err().is_released());
    assert!(set_erp(&handle, 1.0).unwrap_err().is_released());
}

#[test]
fn test_rebind_frees_exactly_once_between_binds() {
    let (handle, frees) = tracked();
    let next_frees = Arc::new(AtomicUsize::new(0));
    let next = Tracked::allocate(Arc::clone(&next_frees));

    unsafe { handle.rebind(next as usize, true) };
    assert_eq!(frees.load(Ordering::SeqCst), 1, "old object freed once by rebind");
    assert_eq!(next_frees.load(Ordering::SeqCst), 0, "new object untouched");

    drop(handle);
    assert_eq!(frees.load(Ordering::SeqCst), 1);
    assert_eq!(next_frees.load(Ordering::SeqCst), 1);
}

#[test]
fn test_borrowed_handle_never_frees() {
    let (owner, frees) = tracked();
    {
        let borrowed = unsafe { NativeHandle::<Tracked>::from_raw(owner.address(), false) };
        set_erp(&borrowed, 0.8).unwrap();
        assert!(!borrowed.release(), "borrowed release must not free");
    }
    {
        let _borrowed = unsafe { NativeHandle::<Tracked>::from_raw(owner.address(), false) };
    }
    assert_eq!(frees.load(Ordering::SeqCst), 0);
    assert_eq!(erp(&owner).unwrap(), 0.8);

    drop(owner);
    assert_eq!(frees.load(Ordering::SeqCst), 1);
}

#[test]
fn test_explicit_release_and_drop_backstop_race() {
    for _ in 0..64 {
        let (handle, frees) = tracked();
        let handle = Arc::new(handle);

        let remote = Arc::clone(&handle);
        let explicit = thread::spawn(move || {
            remote.release();
        });
        let backstop = thread::spawn(move || drop(handle));

        explicit.join().unwrap();
        backstop.join().unwrap();
        assert_eq!(frees.load(Ordering::SeqCst), 1, "no double free");
    }
}

#[test]
fn test_many_concurrent_releases() {
    let (handle, frees) = tracked();

    let winners = thread::scope(|s| {
        let workers: Vec<_> = (0..16).map(|_| s.spawn(|| handle.release())).collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap())
            .filter(|freed| *freed)
            .count()
    });

    assert_eq!(winners, 1);
    assert_eq!(frees.load(Ordering::SeqCst), 1);
}

#[test]
fn test_end_to_end_tracked() {
    let (handle, frees) = tracked();
    set_erp(&handle, 0.25).unwrap();
    assert_eq!(erp(&handle).unwrap(), 0.25);

    handle.release();
    assert!(erp(&handle).is_err());
    assert_eq!(frees.load(Ordering::SeqCst), 1);
}

#[test]
fn test_end_to_end_constraint_info() {
    let info = ConstraintInfo2::new().expect("allocation should succeed");
    assert_eq!(info.status(), HandleStatus::Bound { owns: true });

    info.set_erp(0.2).unwrap();
    assert_eq!(info.erp().unwrap(), 0.2);

    let before = btrows::native_stats();
    assert!(info.release(), "owned descriptor should be destroyed");
    assert!(btrows::native_stats().deallocations > before.deallocations);

    assert_eq!(info.status(), HandleStatus::Released);
    assert!(info.erp().unwrap_err().is_released());
    assert!(!info.release(), "second release is a no-op");
}

#[test]
fn test_ownership_handoff_between_wrappers() {
    let owner = ConstraintInfo2::new().unwrap();
    owner.set_num_iterations(4).unwrap();

    // Move responsibility to a second wrapper, as a container would.
    let address = owner.release_ownership().unwrap();
    let adopted = unsafe { ConstraintInfo2::from_raw(address, true) };
    drop(owner);

    assert_eq!(adopted.num_iterations().unwrap(), 4);
    assert!(adopted.release());
}

#[test]
fn test_into_raw_round_trip() {
    let info = ConstraintInfo2::new().unwrap();
    info.set_damping(0.5).unwrap();
    let expected = NativeHandle::address_of(Some(info.handle()));

    // Wrapper gone, native object still alive.
    let address = info.into_raw();
    assert_eq!(address, expected);

    let info = unsafe { ConstraintInfo2::from_raw(address, true) };
    assert_eq!(info.damping().unwrap(), 0.5);
    assert!(info.release());
}

#[test]
fn test_callback_can_reenter_its_handle() {
    let info = Arc::new(ConstraintInfo2::new().unwrap());
    info.set_erp(0.3).unwrap();
    let (tx, rx) = mpsc::channel();

    let remote = Arc::clone(&info);
    thread::spawn(move || {
        let shown = remote.with_ptr(|_| (remote.to_string(), remote.erp()));
        let released = remote.with_ptr(|_| remote.release());
        tx.send((shown, released)).unwrap();
    });

    let (shown, released) = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("reentrant calls should not block");
    let (text, erp) = shown.unwrap();
    assert!(text.starts_with("btConstraintInfo2(0x"));
    assert_eq!(erp, Ok(0.3));
    assert_eq!(released, Ok(true));
    assert_eq!(info.status(), HandleStatus::Released);
}
