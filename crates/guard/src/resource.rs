//! Owning wrapper for arbitrary resource handles
//!
//! [`UniqueResource`] pairs a resource value (a descriptor, an index, a raw
//! pointer, an OS handle) with the deleter that releases it, and calls that
//! deleter exactly once when ownership ends.

use std::fmt;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};
use std::ptr;
use tidyup_core::report::{self, FailureOrigin};
use tidyup_core::unwind;

/// Releases a resource of type `R`.
///
/// Implemented for every `FnMut(&mut R)`, so closures and plain functions can
/// be used directly. Implement it on a named type when the deleter needs to be
/// compared or inspected through [`UniqueResource::get_deleter`].
pub trait Deleter<R> {
    fn delete(&mut self, resource: &mut R);
}

impl<R, F> Deleter<R> for F
where
    F: FnMut(&mut R),
{
    #[inline]
    fn delete(&mut self, resource: &mut R) {
        self(resource)
    }
}

/// Exclusive owner of a resource value and its deleter.
///
/// Assigning over a `UniqueResource` (`slot = other`) deletes the resource it
/// currently holds, if armed, and adopts `other`'s resource and deleter. The
/// source is moved, so it can never fire.
#[must_use = "a unique resource deletes its value when dropped; binding it to `_` deletes it immediately"]
pub struct UniqueResource<R, D: Deleter<R>> {
    resource: R,
    deleter: D,
    armed: bool,
}

impl<R, D: Deleter<R>> UniqueResource<R, D> {
    /// Take ownership of `resource`; `deleter` runs when ownership ends
    pub fn new(resource: R, deleter: D) -> Self {
        Self {
            resource,
            deleter,
            armed: true,
        }
    }

    /// Hold `resource` without owning it; the deleter will not run
    pub(crate) fn unarmed(resource: R, deleter: D) -> Self {
        Self {
            resource,
            deleter,
            armed: false,
        }
    }

    /// The held resource value
    #[inline]
    pub fn get(&self) -> &R {
        &self.resource
    }

    #[inline]
    pub fn get_deleter(&self) -> &D {
        &self.deleter
    }

    /// Whether the deleter will still run for the held value
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Give up ownership. The value stays readable through
    /// [`UniqueResource::get`] but is never deleted.
    pub fn release(&mut self) {
        if mem::replace(&mut self.armed, false) {
            tracing::trace!("unique resource released");
        }
    }

    /// Delete the held resource now, if armed, and disarm
    pub fn reset(&mut self) {
        if mem::replace(&mut self.armed, false) {
            tracing::trace!("unique resource reset");
            self.deleter.delete(&mut self.resource);
        }
    }

    /// Delete the held resource, if armed, and take ownership of `resource`
    /// with the existing deleter.
    ///
    /// The wrapper owns `resource` before the old value is deleted, so a
    /// panicking deleter leaves it armed on the new value and the old value
    /// is never deleted a second time.
    pub fn reset_with(&mut self, resource: R) {
        let mut previous = mem::replace(&mut self.resource, resource);
        if mem::replace(&mut self.armed, true) {
            tracing::trace!("unique resource reset with new value");
            self.deleter.delete(&mut previous);
        }
    }

    /// Delete the held resource, if armed, and adopt `other`'s resource and
    /// deleter. Same as `*self = other`.
    pub fn replace(&mut self, other: Self) {
        *self = other;
    }

    /// Release ownership and return the raw value. The deleter is dropped
    /// without being called.
    pub fn into_inner(self) -> R {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so each field is moved out once
        let (resource, deleter) = unsafe { (ptr::read(&this.resource), ptr::read(&this.deleter)) };
        drop(deleter);
        resource
    }
}

impl<T, D: Deleter<*mut T>> UniqueResource<*mut T, D> {
    /// Borrow the pointee.
    ///
    /// # Safety
    ///
    /// The held pointer must be non-null, aligned and point to a live `T` that
    /// is not mutated elsewhere while the borrow exists.
    pub unsafe fn pointee(&self) -> &T {
        // SAFETY: upheld by the caller
        unsafe { &*self.resource }
    }

    /// Mutably borrow the pointee.
    ///
    /// # Safety
    ///
    /// As for [`UniqueResource::pointee`], and the pointee must not be
    /// accessed through any other path while the borrow exists.
    pub unsafe fn pointee_mut(&mut self) -> &mut T {
        // SAFETY: upheld by the caller
        unsafe { &mut *self.resource }
    }
}

impl<T, D: Deleter<*const T>> UniqueResource<*const T, D> {
    /// Borrow the pointee.
    ///
    /// # Safety
    ///
    /// The held pointer must be non-null, aligned and point to a live `T` that
    /// is not mutated while the borrow exists.
    pub unsafe fn pointee(&self) -> &T {
        // SAFETY: upheld by the caller
        unsafe { &*self.resource }
    }
}

impl<R: Deref, D: Deleter<R>> Deref for UniqueResource<R, D> {
    type Target = R::Target;

    fn deref(&self) -> &Self::Target {
        self.resource.deref()
    }
}

impl<R: DerefMut, D: Deleter<R>> DerefMut for UniqueResource<R, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resource.deref_mut()
    }
}

impl<R, D: Deleter<R>> Drop for UniqueResource<R, D> {
    fn drop(&mut self) {
        if !mem::replace(&mut self.armed, false) {
            return;
        }

        tracing::trace!("unique resource deleted on drop");
        if unwind::in_flight() > 0 {
            let (resource, deleter) = (&mut self.resource, &mut self.deleter);
            let _ = report::contain(FailureOrigin::UniqueResource, || deleter.delete(resource));
        } else {
            self.deleter.delete(&mut self.resource);
        }
    }
}

impl<R: fmt::Debug, D: Deleter<R>> fmt::Debug for UniqueResource<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueResource")
            .field("resource", &self.resource)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}
