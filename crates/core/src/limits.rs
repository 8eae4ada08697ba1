//! Catalog and account limits shared by every domain crate.

use rust_decimal::Decimal;

pub const DISCOUNT_MIN: u32 = 0;
pub const DISCOUNT_MAX: u32 = 100;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 128;

pub const DESCRIPTION_MIN_LEN: usize = 20;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

pub const SHORT_DESCRIPTION_MIN_LEN: usize = 20;
pub const SHORT_DESCRIPTION_MAX_LEN: usize = 200;

pub const USERNAME_MIN_LEN: usize = 8;
pub const USERNAME_MAX_LEN: usize = 32;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 32;

/// Smallest sellable catalog price (0.01).
pub fn min_price() -> Decimal {
    Decimal::new(1, 2)
}

/// Largest catalog price and largest flat coupon value (999_999_999_999.99).
pub fn max_price() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Upper bound of a percentage (catalog discount or percentage coupon).
pub fn max_percentage() -> Decimal {
    Decimal::from(DISCOUNT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn price_bounds_match_catalog_rules() {
        assert_eq!(min_price(), Decimal::from_str("0.01").unwrap());
        assert_eq!(max_price(), Decimal::from_str("999999999999.99").unwrap());
        assert_eq!(max_percentage(), Decimal::from(100));
    }
}
