use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{
    limits, validate, CategoryId, DomainError, DomainResult, Entity, HasLifecycle,
    LifecycleFlags, ProductId, StoreId,
};

/// Catalog product listed by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Decimal,
    /// Catalog discount, a percentage in `[0, 100]`.
    pub discount: Decimal,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub lifecycle: LifecycleFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

fn check_price(price: Decimal) -> DomainResult<()> {
    validate::decimal_range("price", price, limits::min_price(), limits::max_price())
}

fn check_discount(discount: Decimal) -> DomainResult<()> {
    validate::decimal_range(
        "discount",
        discount,
        Decimal::from(limits::DISCOUNT_MIN),
        limits::max_percentage(),
    )
}

fn check_description(value: &str) -> DomainResult<()> {
    validate::length(
        "description",
        value,
        limits::DESCRIPTION_MIN_LEN,
        limits::DESCRIPTION_MAX_LEN,
    )
}

fn check_short_description(value: &str) -> DomainResult<()> {
    validate::length(
        "short_description",
        value,
        limits::SHORT_DESCRIPTION_MIN_LEN,
        limits::SHORT_DESCRIPTION_MAX_LEN,
    )
}

fn normalize_images(images: Vec<String>) -> DomainResult<Vec<String>> {
    let images: Vec<String> = images
        .iter()
        .filter_map(|i| validate::optional(Some(i.as_str())))
        .collect();
    for url in &images {
        validate::http_url("images", url)?;
    }
    Ok(images)
}

/// Lowercase, trim and dedupe tags, keeping first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

impl Product {
    /// List a new product under `store_id`.
    pub fn list(store_id: StoreId, cmd: CreateProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate::trimmed("name", &cmd.name)?;
        validate::product_name(&name)?;

        check_price(cmd.price)?;
        let discount = cmd.discount.unwrap_or(Decimal::ZERO);
        check_discount(discount)?;

        let description = validate::optional(cmd.description.as_deref());
        if let Some(v) = &description {
            check_description(v)?;
        }
        let short_description = validate::optional(cmd.short_description.as_deref());
        if let Some(v) = &short_description {
            check_short_description(v)?;
        }

        Ok(Self {
            id: ProductId::new(),
            store_id,
            category_id: cmd.category_id,
            name,
            description,
            short_description,
            price: cmd.price,
            discount,
            images: normalize_images(cmd.images)?,
            tags: normalize_tags(cmd.tags),
            lifecycle: LifecycleFlags::live(),
            created_at: now,
            updated_at: None,
        })
    }

    /// Price after the catalog discount: `price * (1 - discount / 100)`.
    pub fn effective_price(&self) -> Decimal {
        self.price * (Decimal::ONE - self.discount / Decimal::ONE_HUNDRED)
    }

    pub fn apply_update(&mut self, update: UpdateProduct, now: DateTime<Utc>) -> DomainResult<()> {
        let name = validate::optional(update.name.as_deref());
        let description = validate::optional(update.description.as_deref());
        let short_description = validate::optional(update.short_description.as_deref());

        let nothing = update.category_id.is_none()
            && name.is_none()
            && description.is_none()
            && short_description.is_none()
            && update.price.is_none()
            && update.discount.is_none()
            && update.images.is_none()
            && update.tags.is_none();
        if nothing {
            return Err(DomainError::validation("no product fields to update"));
        }

        if let Some(v) = &name {
            validate::product_name(v)?;
        }
        if let Some(v) = &description {
            check_description(v)?;
        }
        if let Some(v) = &short_description {
            check_short_description(v)?;
        }
        if let Some(v) = update.price {
            check_price(v)?;
        }
        if let Some(v) = update.discount {
            check_discount(v)?;
        }
        let images = update.images.map(normalize_images).transpose()?;

        if let Some(v) = update.category_id {
            self.category_id = v;
        }
        if let Some(v) = name {
            self.name = v;
        }
        if description.is_some() {
            self.description = description;
        }
        if short_description.is_some() {
            self.short_description = short_description;
        }
        if let Some(v) = update.price {
            self.price = v;
        }
        if let Some(v) = update.discount {
            self.discount = v;
        }
        if let Some(v) = images {
            self.images = v;
        }
        if let Some(v) = update.tags {
            self.tags = normalize_tags(v);
        }
        self.updated_at = Some(now);
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl HasLifecycle for Product {
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
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create(price: &str) -> CreateProduct {
        CreateProduct {
            category_id: CategoryId::new(),
            name: "Silla de madera".to_string(),
            description: None,
            short_description: Some("Silla de roble macizo, hecha a mano".to_string()),
            price: dec(price),
            discount: None,
            images: vec!["https://cdn.example.com/silla.jpg".to_string(), "  ".to_string()],
            tags: vec![" Madera ".to_string(), "madera".to_string(), "hogar".to_string()],
        }
    }

    #[test]
    fn listing_normalizes_tags_and_images() {
        let p = Product::list(StoreId::new(), create("19990"), Utc::now()).unwrap();
        assert_eq!(p.tags, vec!["madera", "hogar"]);
        assert_eq!(p.images.len(), 1);
        assert_eq!(p.discount, Decimal::ZERO);
        assert!(p.lifecycle.is_live());
    }

    #[test]
    fn price_bounds_are_enforced() {
        assert!(Product::list(StoreId::new(), create("0"), Utc::now()).is_err());
        assert!(Product::list(StoreId::new(), create("0.01"), Utc::now()).is_ok());
        assert!(Product::list(StoreId::new(), create("1000000000000"), Utc::now()).is_err());
    }

    #[test]
    fn discount_above_hundred_is_rejected() {
        let mut cmd = create("100");
        cmd.discount = Some(dec("100.5"));
        assert!(matches!(
            Product::list(StoreId::new(), cmd, Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn effective_price_applies_catalog_discount() {
        let mut cmd = create("200");
        cmd.discount = Some(dec("25"));
        let p = Product::list(StoreId::new(), cmd, Utc::now()).unwrap();
        assert_eq!(p.effective_price(), dec("150"));
    }

    #[test]
    fn update_validates_before_mutating() {
        let mut p = Product::list(StoreId::new(), create("100"), Utc::now()).unwrap();
        let update = UpdateProduct {
            price: Some(dec("50")),
            discount: Some(dec("-1")),
            ..Default::default()
        };
        assert!(p.apply_update(update, Utc::now()).is_err());
        assert_eq!(p.price, dec("100"));
    }
}
