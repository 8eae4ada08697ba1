use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{
    limits, validate, DomainError, DomainResult, Entity, HasLifecycle, LifecycleFlags, StoreId,
    UserId,
};

/// A seller's storefront. The pivot of the enable/disable cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub rut: String,
    pub activity: String,
    #[serde(flatten)]
    pub lifecycle: LifecycleFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStore {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub rut: String,
    pub activity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStore {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rut: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
}

fn check_description(value: &str) -> DomainResult<()> {
    validate::length("description", value, limits::NAME_MIN_LEN, limits::NAME_MAX_LEN)
}

fn check_activity(value: &str) -> DomainResult<()> {
    validate::length("activity", value, limits::NAME_MIN_LEN, limits::NAME_MAX_LEN)
}

impl Store {
    /// Open a store for `owner_id`.
    ///
    /// New stores are active but disabled until an administrator approves them.
    pub fn open(owner_id: UserId, cmd: CreateStore, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate::trimmed("name", &cmd.name)?;
        validate::store_name(&name)?;

        let rut = validate::trimmed("rut", &cmd.rut)?;
        validate::rut(&rut)?;

        let activity = validate::trimmed("activity", &cmd.activity)?;
        check_activity(&activity)?;

        let description = validate::optional(cmd.description.as_deref());
        if let Some(v) = &description {
            check_description(v)?;
        }

        let image_url = validate::optional(cmd.image_url.as_deref());
        if let Some(v) = &image_url {
            validate::http_url("image_url", v)?;
        }

        Ok(Self {
            id: StoreId::new(),
            owner_id,
            name,
            description,
            image_url,
            rut,
            activity,
            lifecycle: LifecycleFlags::pending_approval(),
            created_at: now,
            updated_at: None,
        })
    }

    /// Approved by an administrator and not deleted.
    pub fn is_approved(&self) -> bool {
        self.lifecycle.is_live()
    }

    pub fn apply_update(&mut self, update: UpdateStore, now: DateTime<Utc>) -> DomainResult<()> {
        let name = validate::optional(update.name.as_deref());
        let description = validate::optional(update.description.as_deref());
        let image_url = validate::optional(update.image_url.as_deref());
        let rut = validate::optional(update.rut.as_deref());
        let activity = validate::optional(update.activity.as_deref());

        if name.is_none()
            && description.is_none()
            && image_url.is_none()
            && rut.is_none()
            && activity.is_none()
        {
            return Err(DomainError::validation("no store fields to update"));
        }

        if let Some(v) = &name {
            validate::store_name(v)?;
        }
        if let Some(v) = &description {
            check_description(v)?;
        }
        if let Some(v) = &image_url {
            validate::http_url("image_url", v)?;
        }
        if let Some(v) = &rut {
            validate::rut(v)?;
        }
        if let Some(v) = &activity {
            check_activity(v)?;
        }

        if let Some(v) = name {
            self.name = v;
        }
        if description.is_some() {
            self.description = description;
        }
        if image_url.is_some() {
            self.image_url = image_url;
        }
        if let Some(v) = rut {
            self.rut = v;
        }
        if let Some(v) = activity {
            self.activity = v;
        }
        self.updated_at = Some(now);
        Ok(())
    }
}

impl Entity for Store {
    type Id = StoreId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl HasLifecycle for Store {
    fn lifecycle(&self) -> &LifecycleFlags {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut LifecycleFlags {
        &mut self.lifecycle
    }
}
