//! Price display and discount stacking.

pub mod balance;
pub mod promo;

#[cfg(test)]
#[path = "tests/proptest_discount.rs"]
mod proptest_discount;

pub use balance::BalanceCheck;
pub(crate) use promo::apply_with_catalog_fallback;
pub use promo::{
    DiscountedPrice, ExistingDiscount, PromoSnapshot, apply_discount, apply_discount_to_package,
    apply_discount_to_period,
};
