use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{
    limits, validate, CouponId, DomainError, DomainResult, Entity, HasLifecycle, LifecycleFlags,
    StoreId,
};

/// Discount code issued by a store.
///
/// Applies to every product of the issuing store while `now <= expiration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub store_id: StoreId,
    pub name: String,
    pub expiration: DateTime<Utc>,
    /// Percent off when `percentage` is set, otherwise a flat amount.
    pub value: Decimal,
    pub percentage: bool,
    #[serde(flatten)]
    pub lifecycle: LifecycleFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_percentage() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCoupon {
    pub name: String,
    pub expiration: DateTime<Utc>,
    pub value: Decimal,
    #[serde(default = "default_percentage")]
    pub percentage: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCoupon {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub percentage: Option<bool>,
}

/// Range-check `value` and clamp percentages to 100.
fn normalize_value(value: Decimal, percentage: bool) -> DomainResult<Decimal> {
    validate::decimal_range("value", value, Decimal::ZERO, limits::max_price())?;
    if percentage {
        Ok(value.min(limits::max_percentage()))
    } else {
        Ok(value)
    }
}

impl Coupon {
    pub fn issue(store_id: StoreId, cmd: CreateCoupon, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate::trimmed("name", &cmd.name)?;
        validate::coupon_name(&name)?;
        let value = normalize_value(cmd.value, cmd.percentage)?;

        Ok(Self {
            id: CouponId::new(),
            store_id,
            name,
            expiration: cmd.expiration,
            value,
            percentage: cmd.percentage,
            lifecycle: LifecycleFlags::live(),
            created_at: now,
            updated_at: None,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration
    }

    pub fn apply_update(&mut self, update: UpdateCoupon, now: DateTime<Utc>) -> DomainResult<()> {
        let name = validate::optional(update.name.as_deref());
        if name.is_none()
            && update.expiration.is_none()
            && update.value.is_none()
            && update.percentage.is_none()
        {
            return Err(DomainError::validation("no coupon fields to update"));
        }
        if let Some(v) = &name {
            validate::coupon_name(v)?;
        }

        let percentage = update.percentage.unwrap_or(self.percentage);
        let value = normalize_value(update.value.unwrap_or(self.value), percentage)?;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = update.expiration {
            self.expiration = v;
        }
        self.value = value;
        self.percentage = percentage;
        self.updated_at = Some(now);
        Ok(())
    }
}

impl Entity for Coupon {
    type Id = CouponId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl HasLifecycle for Coupon {
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
    use chrono::Duration;

    fn create(value: i64, percentage: bool) -> CreateCoupon {
        CreateCoupon {
            name: "VERANO-20".to_string(),
            expiration: Utc::now() + Duration::days(7),
            value: Decimal::from(value),
            percentage,
        }
    }

    #[test]
    fn percentage_value_is_clamped_to_hundred() {
        let coupon = Coupon::issue(StoreId::new(), create(150, true), Utc::now()).unwrap();
        assert_eq!(coupon.value, Decimal::from(100));
    }

    #[test]
    fn flat_value_is_not_clamped() {
        let coupon = Coupon::issue(StoreId::new(), create(150, false), Utc::now()).unwrap();
        assert_eq!(coupon.value, Decimal::from(150));
    }

    #[test]
    fn negative_value_is_rejected() {
        assert!(matches!(
            Coupon::issue(StoreId::new(), create(-1, true), Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn expiration_is_inclusive() {
        let coupon = Coupon::issue(StoreId::new(), create(10, true), Utc::now()).unwrap();
        assert!(!coupon.is_expired(coupon.expiration));
        assert!(coupon.is_expired(coupon.expiration + Duration::seconds(1)));
    }

    #[test]
    fn switching_to_percentage_reclamps_value() {
        let mut coupon = Coupon::issue(StoreId::new(), create(500, false), Utc::now()).unwrap();
        let update = UpdateCoupon {
            percentage: Some(true),
            ..Default::default()
        };
        coupon.apply_update(update, Utc::now()).unwrap();
        assert!(coupon.percentage);
        assert_eq!(coupon.value, Decimal::from(100));
    }
}
