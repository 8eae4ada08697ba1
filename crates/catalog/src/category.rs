use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{
    validate, CategoryId, DomainError, DomainResult, Entity, HasLifecycle, LifecycleFlags,
};

/// Product category. Categories nest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub lifecycle: LifecycleFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCategory {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Category {
    pub fn create(cmd: CreateCategory, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate::trimmed("name", &cmd.name)?;
        validate::product_name(&name)?;

        let image_url = validate::optional(cmd.image_url.as_deref());
        if let Some(v) = &image_url {
            validate::http_url("image_url", v)?;
        }

        Ok(Self {
            id: CategoryId::new(),
            name,
            parent_id: cmd.parent_id,
            image_url,
            lifecycle: LifecycleFlags::live(),
            created_at: now,
            updated_at: None,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn apply_update(&mut self, update: UpdateCategory, now: DateTime<Utc>) -> DomainResult<()> {
        let name = validate::optional(update.name.as_deref());
        let image_url = validate::optional(update.image_url.as_deref());

        if name.is_none() && image_url.is_none() && update.parent_id.is_none() {
            return Err(DomainError::validation("no category fields to update"));
        }
        if update.parent_id == Some(self.id) {
            return Err(DomainError::validation("a category cannot be its own parent"));
        }

        if let Some(v) = &name {
            validate::product_name(v)?;
        }
        if let Some(v) = &image_url {
            validate::http_url("image_url", v)?;
        }

        if let Some(v) = name {
            self.name = v;
        }
        if image_url.is_some() {
            self.image_url = image_url;
        }
        if update.parent_id.is_some() {
            self.parent_id = update.parent_id;
        }
        self.updated_at = Some(now);
        Ok(())
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl HasLifecycle for Category {
    fn lifecycle(&self) -> &LifecycleFlags {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut LifecycleFlags {
        &mut self.lifecycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_root_and_child() {
        let now = Utc::now();
        let root = Category::create(
            CreateCategory {
                name: "Hogar".to_string(),
                parent_id: None,
                image_url: None,
            },
            now,
        )
        .unwrap();
        let child = Category::create(
            CreateCategory {
                name: "Cocina".to_string(),
                parent_id: Some(root.id),
                image_url: None,
            },
            now,
        )
        .unwrap();

        assert!(root.is_root());
        assert_eq!(child.parent_id, Some(root.id));
        assert!(child.lifecycle.is_live());
    }

    #[test]
    fn short_name_is_rejected() {
        let err = Category::create(
            CreateCategory {
                name: "ab".to_string(),
                parent_id: None,
                image_url: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn category_cannot_parent_itself() {
        let mut cat = Category::create(
            CreateCategory {
                name: "Jardín".to_string(),
                parent_id: None,
                image_url: None,
            },
            Utc::now(),
        )
        .unwrap();
        let update = UpdateCategory {
            parent_id: Some(cat.id),
            ..Default::default()
        };
        assert!(cat.apply_update(update, Utc::now()).is_err());
    }
}
