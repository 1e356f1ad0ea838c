//! Leak-free construction of [`UniqueResource`] from an acquisition result
//!
//! Acquisition functions commonly report failure through a sentinel value
//! (`-1` for a descriptor, `0` for an index, a null pointer). The helpers here
//! compare the acquired value against that sentinel once and only arm the
//! wrapper for a real resource.

use crate::resource::{Deleter, UniqueResource};
use tidyup_core::{Error, Result};

/// Wrap `resource`, armed only if it differs from `invalid`
#[must_use = "the returned wrapper deletes the resource when dropped; binding it to `_` deletes it immediately"]
pub fn make_unique_resource_checked<R, D>(
    resource: R,
    invalid: &R,
    deleter: D,
) -> UniqueResource<R, D>
where
    R: PartialEq,
    D: Deleter<R>,
{
    if resource == *invalid {
        tracing::trace!("acquisition returned the invalid value, wrapper left unarmed");
        UniqueResource::unarmed(resource, deleter)
    } else {
        UniqueResource::new(resource, deleter)
    }
}

/// Wrap `resource` with a deleter produced by a fallible binding step.
///
/// `deleter` is the caller's fallback: it owns the resource while `bind`
/// runs. If `bind` returns an error the fallback deletes the resource before
/// [`Error::DeleterBinding`] is returned; if `bind` panics the fallback
/// deletes it while the panic unwinds. On success the fallback is dropped
/// unused and the bound deleter takes over. A resource equal to `invalid` is
/// never deleted.
#[must_use = "the returned wrapper deletes the resource when dropped; binding it to `_` deletes it immediately"]
pub fn try_make_unique_resource_checked<R, D, B, E, F>(
    resource: R,
    invalid: &R,
    deleter: D,
    bind: F,
) -> Result<UniqueResource<R, B>>
where
    R: PartialEq,
    D: Deleter<R>,
    B: Deleter<R>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    F: FnOnce(&D) -> std::result::Result<B, E>,
{
    let mut pending = make_unique_resource_checked(resource, invalid, deleter);
    let acquired = pending.is_armed();

    match bind(pending.get_deleter()) {
        Ok(bound) => {
            let resource = pending.into_inner();
            if acquired {
                Ok(UniqueResource::new(resource, bound))
            } else {
                Ok(UniqueResource::unarmed(resource, bound))
            }
        }
        Err(err) => {
            let err = Error::deleter_binding(err);
            tracing::debug!(error = %err, acquired, "deleter binding failed, releasing resource");
            pending.reset();
            Err(err)
        }
    }
}
