//! Entity trait: identity + continuity across state changes.
//!
//! Every persisted record also carries two independent lifecycle flags:
//!
//! - `active`: soft-delete marker. `false` means deleted; no code path flips it back.
//! - `enabled`: administrative availability. Reversible, and cascaded from the
//!   owning store to its products and coupons.

use serde::{Deserialize, Serialize};

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// The `{active, enabled}` pair carried by lifecycle-managed records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LifecycleFlags {
    pub active: bool,
    pub enabled: bool,
}

impl LifecycleFlags {
    /// Active and enabled (the default for users, products, coupons, orders).
    pub fn live() -> Self {
        Self {
            active: true,
            enabled: true,
        }
    }

    /// Active but waiting for an administrator to enable it (new stores).
    pub fn pending_approval() -> Self {
        Self {
            active: true,
            enabled: false,
        }
    }

    /// Visible to normal queries.
    pub fn is_live(&self) -> bool {
        self.active && self.enabled
    }
}

impl Default for LifecycleFlags {
    fn default() -> Self {
        Self::live()
    }
}

/// Access to a record's lifecycle flags.
///
/// Records stay passive data holders: this only exposes the flags so the
/// lifecycle manager can flip them.
pub trait HasLifecycle {
    fn lifecycle(&self) -> &LifecycleFlags;

    fn lifecycle_mut(&mut self) -> &mut LifecycleFlags;

    fn is_active(&self) -> bool {
        self.lifecycle().active
    }

    fn is_enabled(&self) -> bool {
        self.lifecycle().enabled
    }
}
