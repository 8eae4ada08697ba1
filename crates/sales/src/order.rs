use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{
    CouponId, DomainError, DomainResult, Entity, HasLifecycle, LifecycleFlags, OrderId, ProductId,
    UserId,
};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Complete,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Complete => "COMPLETE",
            OrderStatus::Failed => "FAILED",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "COMPLETE" => Ok(OrderStatus::Complete),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(DomainError::validation(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// Order placement request: product ids (repeated ids are extra units) and
/// the coupons to redeem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub products: Vec<ProductId>,
    #[serde(default)]
    pub coupons: Vec<CouponId>,
}

impl PlaceOrder {
    pub fn validate(&self) -> DomainResult<()> {
        if self.products.is_empty() {
            return Err(DomainError::validation("an order needs at least one product"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub products: Vec<ProductId>,
    pub coupons: Vec<CouponId>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub lifecycle: LifecycleFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Record a placed order with its priced amounts.
    pub fn place(
        user_id: UserId,
        cmd: PlaceOrder,
        subtotal: Decimal,
        total: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        cmd.validate()?;
        if subtotal < Decimal::ZERO || total < Decimal::ZERO {
            return Err(DomainError::invariant("order amounts cannot be negative"));
        }
        if total > subtotal {
            return Err(DomainError::invariant("order total cannot exceed its subtotal"));
        }

        Ok(Self {
            id: OrderId::new(),
            user_id,
            products: cmd.products,
            coupons: cmd.coupons,
            subtotal,
            total,
            status: OrderStatus::Pending,
            lifecycle: LifecycleFlags::live(),
            created_at: now,
            updated_at: None,
        })
    }

    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == status {
            return Err(DomainError::already_in_state(format!(
                "order is already {status}"
            )));
        }
        self.status = status;
        self.updated_at = Some(now);
        Ok(())
    }

    /// Cancel and soft-delete the order. Completed orders keep their status,
    /// anything else fails.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.lifecycle.active {
            return Err(DomainError::already_in_state("order is already cancelled"));
        }
        if self.status != OrderStatus::Complete {
            self.status = OrderStatus::Failed;
        }
        self.lifecycle.active = false;
        self.updated_at = Some(now);
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl HasLifecycle for Order {
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

    fn place() -> Order {
        let cmd = PlaceOrder {
            products: vec![ProductId::new(), ProductId::new()],
            coupons: vec![],
        };
        Order::place(
            UserId::new(),
            cmd,
            Decimal::from(150),
            Decimal::from(130),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn placed_order_is_pending() {
        let order = place();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.lifecycle.is_live());
    }

    #[test]
    fn empty_order_is_rejected() {
        let cmd = PlaceOrder {
            products: vec![],
            coupons: vec![],
        };
        let err = Order::place(UserId::new(), cmd, Decimal::ZERO, Decimal::ZERO, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn setting_same_status_is_already_in_state() {
        let mut order = place();
        order.set_status(OrderStatus::Processing, Utc::now()).unwrap();
        assert!(matches!(
            order.set_status(OrderStatus::Processing, Utc::now()),
            Err(DomainError::AlreadyInState(_))
        ));
    }

    #[test]
    fn cancel_keeps_completed_orders() {
        let mut pending = place();
        pending.cancel(Utc::now()).unwrap();
        assert_eq!(pending.status, OrderStatus::Failed);
        assert!(!pending.lifecycle.active);

        let mut done = place();
        done.set_status(OrderStatus::Complete, Utc::now()).unwrap();
        done.cancel(Utc::now()).unwrap();
        assert_eq!(done.status, OrderStatus::Complete);
        assert!(!done.lifecycle.active);
    }

    #[test]
    fn cancelling_twice_is_already_in_state() {
        let mut order = place();
        order.cancel(Utc::now()).unwrap();
        assert!(matches!(
            order.cancel(Utc::now()),
            Err(DomainError::AlreadyInState(_))
        ));
        assert_eq!(order.status, OrderStatus::Failed);
    }

    #[test]
    fn status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"PROCESSING\""
        );
        assert_eq!("complete".parse::<OrderStatus>().unwrap(), OrderStatus::Complete);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
