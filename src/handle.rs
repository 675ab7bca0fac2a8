//! Ownership-tracking handles to natively allocated objects.
//!
//! A [`NativeHandle`] holds a native address, whether it is responsible for
//! destroying the object behind it, and whether it has already been released.
//! Every release path (explicit [`release`](NativeHandle::release), rebinding,
//! and drop) funnels through one guarded routine, so the native destructor
//! runs at most once per owned address.
//!
//! The guard is reentrant: a closure passed to
//! [`with_ptr`](NativeHandle::with_ptr) may call back into the same handle.

use std::cell::Cell;
use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;

use parking_lot::ReentrantMutex;

use crate::error::{Error, Result};
use crate::ffi::check_allocation;

/// A native entity type reachable through the C ABI.
///
/// # Safety
///
/// `allocate` must return either null or a pointer that `destroy` accepts,
/// and `destroy` must free exactly the object it is given.
pub unsafe trait NativeType {
    /// Native class name, used in diagnostics.
    const CLASS_NAME: &'static str;

    /// Parameters forwarded to the native allocator.
    type Args;

    /// Allocate a new native object. Returns null on failure.
    fn allocate(args: Self::Args) -> *mut c_void;

    /// Destroy a native object returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `obj` must be live and must not be used afterwards.
    unsafe fn destroy(obj: *mut c_void);
}

/// Lifecycle state of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleStatus {
    /// Not bound to any native object.
    Unbound,
    /// Bound to a native object.
    Bound {
        /// Whether this handle destroys the object on release.
        owns: bool,
    },
    /// Released. Terminal until the handle is rebound.
    Released,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Explicit,
    Rebind,
    Drop,
}

#[derive(Debug, Clone, Copy)]
struct HandleState {
    address: usize,
    owns: bool,
    released: bool,
}

impl HandleState {
    const UNBOUND: Self = Self {
        address: 0,
        owns: false,
        released: false,
    };

    const RELEASED: Self = Self {
        address: 0,
        owns: false,
        released: true,
    };

    fn bound(address: usize, owns: bool) -> Self {
        Self {
            address,
            owns: owns && address != 0,
            released: false,
        }
    }

    fn status(&self) -> HandleStatus {
        if self.released {
            HandleStatus::Released
        } else if self.address == 0 {
            HandleStatus::Unbound
        } else {
            HandleStatus::Bound { owns: self.owns }
        }
    }

    fn check<T: NativeType>(&self) -> Result<usize> {
        if self.released {
            Err(Error::AlreadyReleased {
                class: T::CLASS_NAME,
            })
        } else if self.address == 0 {
            Err(Error::InvalidHandle {
                class: T::CLASS_NAME,
            })
        } else {
            Ok(self.address)
        }
    }
}

/// Handle to a native object of type `T`.
///
/// Owned handles destroy their object when released or dropped. Borrowed
/// handles (created with `owns = false`) never do.
///
/// # Example
///
/// ```
/// use btrows::ConstraintInfo2;
///
/// let info = ConstraintInfo2::new()?;
/// info.set_erp(0.2)?;
/// assert!(info.owns());
///
/// info.release();
/// assert_eq!(info.address(), 0);
/// assert!(info.erp().unwrap_err().is_released());
/// # Ok::<(), btrows::Error>(())
/// ```
pub struct NativeHandle<T: NativeType> {
    state: ReentrantMutex<Cell<HandleState>>,
    _type: PhantomData<fn() -> T>,
}

impl<T: NativeType> NativeHandle<T> {
    fn with_state(state: HandleState) -> Self {
        Self {
            state: ReentrantMutex::new(Cell::new(state)),
            _type: PhantomData,
        }
    }

    /// Allocate a new native object owned by the returned handle.
    pub fn new(args: T::Args) -> Result<Self> {
        let address = check_allocation(T::allocate(args), T::CLASS_NAME)?;
        Ok(Self::with_state(HandleState::bound(address, true)))
    }

    /// Create a handle bound to nothing.
    pub fn unbound() -> Self {
        Self::with_state(HandleState::UNBOUND)
    }

    /// Wrap an address obtained elsewhere.
    ///
    /// Pass `owns = false` for memory owned by someone else, such as a field
    /// embedded in a larger native structure.
    ///
    /// # Safety
    ///
    /// `address` must be 0 or point to a live `T`. With `owns = true` it must
    /// come from `T::allocate` and no other handle may own it.
    pub unsafe fn from_raw(address: usize, owns: bool) -> Self {
        Self::with_state(HandleState::bound(address, owns))
    }

    /// SWIG-style `getCPtr`: the address of `handle`, or 0 for `None`.
    pub fn address_of(handle: Option<&Self>) -> usize {
        handle.map_or(0, Self::address)
    }

    /// Native class name.
    pub fn class_name(&self) -> &'static str {
        T::CLASS_NAME
    }

    /// Current native address. 0 when unbound or released.
    pub fn address(&self) -> usize {
        self.state.lock().get().address
    }

    /// Whether this handle destroys its object on release.
    pub fn owns(&self) -> bool {
        self.state.lock().get().owns
    }

    /// Whether this handle has been released.
    pub fn is_released(&self) -> bool {
        self.state.lock().get().released
    }

    /// Current lifecycle state.
    pub fn status(&self) -> HandleStatus {
        self.state.lock().get().status()
    }

    /// Point this handle at another native object.
    ///
    /// An owned, unreleased object is destroyed first. Rebinding to the
    /// address already held only updates the ownership flag. Rebinding to 0
    /// leaves the handle unbound.
    ///
    /// # Safety
    ///
    /// Same requirements as [`from_raw`](Self::from_raw).
    pub unsafe fn rebind(&self, address: usize, owns: bool) {
        let guard = self.state.lock();
        let mut state = guard.get();
        if address != 0 && !state.released && state.address == address {
            state.owns = owns;
            guard.set(state);
            return;
        }
        Self::release_locked(&guard, Trigger::Rebind);
        guard.set(HandleState::bound(address, owns));
    }

    /// Release the handle.
    ///
    /// Destroys the native object if this handle owns it. Safe to call any
    /// number of times and from several threads; returns `true` only for the
    /// call that destroyed the object.
    pub fn release(&self) -> bool {
        Self::release_locked(&self.state.lock(), Trigger::Explicit)
    }

    // The state is marked released before the destructor runs, so neither a
    // panicking destructor nor a reentrant call can reach it twice.
    fn release_locked(cell: &Cell<HandleState>, trigger: Trigger) -> bool {
        let state = cell.get();
        if state.released {
            return false;
        }
        cell.set(HandleState::RELEASED);

        if !state.owns || state.address == 0 {
            return false;
        }
        log::debug!(
            "releasing {}({:#x}) on {:?}",
            T::CLASS_NAME,
            state.address,
            trigger
        );
        unsafe { T::destroy(state.address as *mut c_void) };
        true
    }

    /// Make this handle responsible for destroying its object.
    pub fn take_ownership(&self) -> Result<()> {
        let guard = self.state.lock();
        let mut state = guard.get();
        if let Err(e) = state.check::<T>() {
            log::warn!("take_ownership on empty {} handle", T::CLASS_NAME);
            return Err(e);
        }
        state.owns = true;
        guard.set(state);
        Ok(())
    }

    /// Hand responsibility for the object to someone else, typically the
    /// native side. Returns the address.
    pub fn release_ownership(&self) -> Result<usize> {
        let guard = self.state.lock();
        let mut state = guard.get();
        let address = match state.check::<T>() {
            Ok(address) => address,
            Err(e) => {
                log::warn!("release_ownership on empty {} handle", T::CLASS_NAME);
                return Err(e);
            }
        };
        state.owns = false;
        guard.set(state);
        Ok(address)
    }

    /// Give up the handle without destroying anything. Returns the address,
    /// which the caller is now responsible for.
    pub fn into_raw(mut self) -> usize {
        self.state.get_mut().replace(HandleState::RELEASED).address
    }

    /// Run `f` with the native pointer while holding the handle's lock.
    ///
    /// Other threads wait until `f` returns. `f` may call back into this
    /// handle, but the pointer it was given dangles once it releases or
    /// rebinds the handle.
    ///
    /// Fails without calling `f` if the handle is unbound or released.
    pub fn with_ptr<R>(&self, f: impl FnOnce(*mut c_void) -> R) -> Result<R> {
        let guard = self.state.lock();
        let address = guard.get().check::<T>()?;
        Ok(f(address as *mut c_void))
    }
}

impl<T: NativeType> Default for NativeHandle<T> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<T: NativeType> Drop for NativeHandle<T> {
    fn drop(&mut self) {
        Self::release_locked(self.state.get_mut(), Trigger::Drop);
    }
}

impl<T: NativeType> PartialEq for NativeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.address() == other.address()
    }
}

impl<T: NativeType> fmt::Display for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:#x})", T::CLASS_NAME, self.address())
    }
}

impl<T: NativeType> fmt::Debug for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().get();
        f.debug_struct("NativeHandle")
            .field("class", &T::CLASS_NAME)
            .field("address", &format_args!("{:#x}", state.address))
            .field("owns", &state.owns)
            .field("released", &state.released)
            .finish()
    }
}
