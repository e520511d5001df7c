//! # Checkout Planning
//!
//! The pure half of checkout: turn a caller's cart and a catalog snapshot
//! into the exact rows the unit of work must write.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  [CartLineItem]  ──► Cart::from_items ──► validated, duplicates merged │
//! │                                                │                        │
//! │                                    product_ids()  (one bulk read)       │
//! │                                                │                        │
//! │  HashMap<id, Product> snapshot ───────────────►│                        │
//! │                                                ▼                        │
//! │                                          Cart::plan                     │
//! │                                   1. every id present?                  │
//! │                                   2. stock covers quantity?             │
//! │                                   3. subtotal = price × qty (checked)   │
//! │                                   4. total = Σ subtotal (checked)       │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                                         CheckoutPlan                    │
//! │                          (decrements + details, caller input order)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLineItem, Product, TransactionDetail};
use crate::validation::validate_cart;
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Stock Policy
// =============================================================================

/// Whether checkout may drive stock below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Reject lines whose quantity exceeds the available stock.
    #[default]
    Enforce,
    /// Decrement unconditionally, even into negative stock.
    AllowNegative,
}

impl StockPolicy {
    pub fn from_allow_negative(allow_negative: bool) -> Self {
        if allow_negative {
            StockPolicy::AllowNegative
        } else {
            StockPolicy::Enforce
        }
    }

    #[inline]
    pub fn allows_negative(&self) -> bool {
        matches!(self, StockPolicy::AllowNegative)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A validated cart with one line per product.
///
/// Lines keep the order in which each product first appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// Validates raw cart lines and merges duplicate product ids.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::checkout::Cart;
    /// use kasir_core::CartLineItem;
    ///
    /// let cart = Cart::from_items(&[
    ///     CartLineItem::new(1, 2),
    ///     CartLineItem::new(2, 1),
    ///     CartLineItem::new(1, 3),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(cart.lines(), &[CartLineItem::new(1, 5), CartLineItem::new(2, 1)]);
    /// ```
    pub fn from_items(items: &[CartLineItem]) -> CoreResult<Self> {
        validate_cart(items)?;

        let mut lines: Vec<CartLineItem> = Vec::with_capacity(items.len());
        let mut index: HashMap<i64, usize> = HashMap::with_capacity(items.len());

        for item in items {
            match index.get(&item.product_id) {
                Some(&i) => {
                    let merged = lines[i].quantity.checked_add(item.quantity);
                    match merged {
                        Some(quantity) if quantity <= MAX_ITEM_QUANTITY => {
                            lines[i].quantity = quantity
                        }
                        _ => {
                            return Err(ValidationError::OutOfRange {
                                field: "quantity".to_string(),
                                min: 1,
                                max: MAX_ITEM_QUANTITY,
                            }
                            .into())
                        }
                    }
                }
                None => {
                    index.insert(item.product_id, lines.len());
                    lines.push(*item);
                }
            }
        }

        Ok(Cart { lines })
    }

    /// The merged lines.
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Distinct product ids, for the single bulk catalog read.
    pub fn product_ids(&self) -> Vec<i64> {
        self.lines.iter().map(|line| line.product_id).collect()
    }

    /// Prices the cart against a catalog snapshot.
    ///
    /// ## Errors
    /// - `ProductNotFound` for the first line whose product is absent; this
    ///   is checked for every line before any stock or pricing check
    /// - `InsufficientStock` under [`StockPolicy::Enforce`]
    /// - `AmountOverflow` if a subtotal or the total exceeds i64
    pub fn plan(
        &self,
        catalog: &HashMap<i64, Product>,
        policy: StockPolicy,
    ) -> CoreResult<CheckoutPlan> {
        if let Some(missing) = self
            .lines
            .iter()
            .find(|line| !catalog.contains_key(&line.product_id))
        {
            return Err(CoreError::ProductNotFound(missing.product_id));
        }

        let mut total = Money::zero();
        let mut lines = Vec::with_capacity(self.lines.len());

        for line in &self.lines {
            let product = &catalog[&line.product_id];

            if !policy.allows_negative() && !product.can_sell(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                    requested: line.quantity,
                });
            }

            let overflow = || CoreError::AmountOverflow {
                product_id: product.id,
            };
            let subtotal = product.price().checked_mul(line.quantity).ok_or_else(overflow)?;
            total = total.checked_add(subtotal).ok_or_else(overflow)?;

            lines.push(PlannedLine {
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price: product.price(),
                quantity: line.quantity,
                subtotal,
                available: product.stock,
            });
        }

        Ok(CheckoutPlan {
            lines,
            total_amount: total,
        })
    }
}

// =============================================================================
// Checkout Plan
// =============================================================================

/// One priced line of a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub subtotal: Money,
    /// Stock seen in the snapshot, reported if the guarded decrement fails.
    pub available: i64,
}

/// Everything the unit of work writes for one checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub lines: Vec<PlannedLine>,
    pub total_amount: Money,
}

impl CheckoutPlan {
    /// Builds the detail rows for a freshly inserted header.
    pub fn details_for(&self, transaction_id: i64) -> Vec<TransactionDetail> {
        self.lines
            .iter()
            .map(|line| TransactionDetail {
                transaction_id,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                unit_price: line.unit_price.amount(),
                quantity: line.quantity,
                subtotal: line.subtotal.amount(),
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(
        items: &[CartLineItem],
        catalog: &HashMap<i64, Product>,
        policy: StockPolicy,
    ) -> CoreResult<CheckoutPlan> {
        Cart::from_items(items)?.plan(catalog, policy)
    }

    fn catalog() -> HashMap<i64, Product> {
        [
            Product::new(1, "Beras 5kg", 10_000, 50),
            Product::new(2, "Minyak Goreng", 20_000, 30),
            Product::new(3, "Gula 1kg", 15_000, 1),
        ]
        .into_iter()
        .map(|p| (p.id, p))
        .collect()
    }

    #[test]
    fn test_plan_reference_scenario() {
        let items = [CartLineItem::new(1, 2), CartLineItem::new(2, 1)];
        let plan = plan(&items, &catalog(), StockPolicy::Enforce).unwrap();

        assert_eq!(plan.total_amount, Money::new(40_000));
        let details = plan.details_for(7);
        assert_eq!(details.len(), 2);
        assert_eq!(
            (details[0].product_id, details[0].quantity, details[0].subtotal),
            (1, 2, 20_000)
        );
        assert_eq!(
            (details[1].product_id, details[1].quantity, details[1].subtotal),
            (2, 1, 20_000)
        );
        assert!(details.iter().all(|d| d.transaction_id == 7));
        assert_eq!(details[1].product_name, "Minyak Goreng");
    }

    #[test]
    fn test_plan_keeps_input_order() {
        let items = [CartLineItem::new(2, 1), CartLineItem::new(1, 1)];
        let plan = plan(&items, &catalog(), StockPolicy::Enforce).unwrap();
        let ids: Vec<i64> = plan.lines.iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_unknown_product_wins_over_other_errors() {
        // Product 3 is short on stock, but the missing product is reported.
        let items = [CartLineItem::new(3, 5), CartLineItem::new(99, 1)];
        let err = plan(&items, &catalog(), StockPolicy::Enforce).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(99)));
    }

    #[test]
    fn test_insufficient_stock() {
        let items = [CartLineItem::new(3, 2)];
        let err = plan(&items, &catalog(), StockPolicy::Enforce).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                product_id: 3,
                available: 1,
                requested: 2
            }
        ));

        let plan = plan(&items, &catalog(), StockPolicy::AllowNegative).unwrap();
        assert_eq!(plan.total_amount, Money::new(30_000));
    }

    #[test]
    fn test_duplicates_are_merged_before_stock_check() {
        let items = [
            CartLineItem::new(1, 30),
            CartLineItem::new(2, 1),
            CartLineItem::new(1, 25),
        ];
        let cart = Cart::from_items(&items).unwrap();
        assert_eq!(cart.product_ids(), vec![1, 2]);
        assert_eq!(cart.lines()[0].quantity, 55);

        // 55 > 50 in stock even though each raw line alone would fit
        let err = cart.plan(&catalog(), StockPolicy::Enforce).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { requested: 55, .. }));
    }

    #[test]
    fn test_merged_quantity_limit() {
        let items = [CartLineItem::new(1, 600), CartLineItem::new(1, 600)];
        let err = Cart::from_items(&items).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCart(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_invalid_cart() {
        assert!(matches!(
            Cart::from_items(&[]).unwrap_err(),
            CoreError::InvalidCart(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Cart::from_items(&[CartLineItem::new(1, 0)]).unwrap_err(),
            CoreError::InvalidCart(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_amount_overflow() {
        let mut catalog = catalog();
        catalog.insert(4, Product::new(4, "Emas", i64::MAX / 2, 999));
        let items = [CartLineItem::new(4, 3)];
        let err = plan(&items, &catalog, StockPolicy::Enforce).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { product_id: 4 }));
    }

    #[test]
    fn test_stock_policy_from_flag() {
        assert_eq!(StockPolicy::from_allow_negative(false), StockPolicy::Enforce);
        assert!(StockPolicy::from_allow_negative(true).allows_negative());
        assert_eq!(StockPolicy::default(), StockPolicy::Enforce);
    }
}
