use crate::{Decision, DenyReason, IdentityClaim};

/// A stored record with a fixed owning account.
pub trait OwnedRecord {
    fn owner_id(&self) -> i64;
}

impl<T: OwnedRecord + ?Sized> OwnedRecord for &T {
    fn owner_id(&self) -> i64 {
        (**self).owner_id()
    }
}

/// Decide access to a loaded record by comparing its owner to the caller.
///
/// Callers must resolve missing records to `NotFound` themselves before
/// calling; this function only ever allows or denies.
pub fn authorize_against_record<R: OwnedRecord + ?Sized>(
    claim: &IdentityClaim,
    record: &R,
) -> Decision {
    if claim.role.is_elevated() {
        return Decision::Allowed;
    }
    if record.owner_id() == claim.id {
        return Decision::Allowed;
    }
    Decision::Denied(DenyReason::NotOwner)
}
