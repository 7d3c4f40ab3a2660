//! # Price Resolution
//!
//! Derives a product's effective (charged) price from its base price, the
//! promotion selected on the form and an optional manual override.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  enPromocion == false                                                   │
//! │      effective = base          (promotion and override discarded)      │
//! │                                                                         │
//! │  enPromocion == true                                                    │
//! │      manual override set?  ── yes ──► effective = override             │
//! │             │ no                                                        │
//! │             ▼                                                           │
//! │      promotion selected?   ── no  ──► effective = base                 │
//! │             │ yes                                                       │
//! │             ├── percentage p  ──► round2(base × (1 − p/100)) half-up   │
//! │             └── fixed a       ──► max(0, base − a)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Changing the base always recomputes from the selected promotion, never
//! from the previous effective value, and drops any manual override.
//!
//! Expiry is not re-checked here: the candidate list handed to the form
//! comes from [`crate::promotion::offerable_promotions`].

use serde::Serialize;

use crate::field_store::FieldStore;
use crate::money::Money;
use crate::promotion::{Discount, PromotionDescriptor};
use crate::types::Product;

// =============================================================================
// Price State
// =============================================================================

/// Resolved prices for the product form.
///
/// Invariants: `effective >= 0`; `!promotion_active ⇒ effective == base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceState {
    pub base: Money,
    pub effective: Money,
    pub promotion_active: bool,
    pub promotion_id: Option<String>,
}

impl PriceState {
    /// Amount taken off the base price.
    pub fn discount(&self) -> Money {
        (self.base - self.effective).non_negative()
    }

    /// Discount as a percentage of the base (display only).
    pub fn discount_percent(&self) -> f64 {
        if self.base.is_zero() {
            return 0.0;
        }
        (self.discount().cents() as f64 / self.base.cents() as f64 * 10_000.0).round() / 100.0
    }

    /// Writes the price fields into the product form.
    pub fn write_to(&self, store: &mut FieldStore) {
        store.set("precioBase", self.base.to_major());
        store.set("precioActual", self.effective.to_major());
        store.set("enPromocion", self.promotion_active);
        store.set("promocionId", self.promotion_id.clone().unwrap_or_default());
    }
}

/// Computes the effective price.
///
/// ## Example
/// ```rust
/// use optica_core::money::{Money, Percentage};
/// use optica_core::pricing::compute_effective;
/// use optica_core::promotion::{Discount, PromotionDescriptor};
///
/// let promo = PromotionDescriptor {
///     id: "p1".into(),
///     discount: Discount::Percentage(Percentage::from_percent(20.0)),
///     valid_until: None,
/// };
/// let state = compute_effective(Money::from_cents(10000), true, Some(&promo), None);
/// assert_eq!(state.effective.cents(), 8000);
/// ```
pub fn compute_effective(
    base: Money,
    promotion_active: bool,
    promotion: Option<&PromotionDescriptor>,
    manual_override: Option<Money>,
) -> PriceState {
    let base = base.non_negative();

    if !promotion_active {
        return PriceState {
            base,
            effective: base,
            promotion_active: false,
            promotion_id: None,
        };
    }

    let computed = match promotion.map(|p| p.discount) {
        Some(Discount::Percentage(pct)) => base.apply_percentage_discount(pct),
        Some(Discount::FixedAmount(amount)) => base.apply_fixed_discount(amount),
        None => base,
    };

    PriceState {
        base,
        effective: manual_override.unwrap_or(computed).non_negative(),
        promotion_active: true,
        promotion_id: promotion.map(|p| p.id.clone()),
    }
}

// =============================================================================
// Resolver (form-side state machine)
// =============================================================================

/// Tracks the price inputs of one open product form.
#[derive(Debug, Clone, Default)]
pub struct PriceResolver {
    base: Money,
    active: bool,
    selected: Option<PromotionDescriptor>,
    manual_override: Option<Money>,
}

impl PriceResolver {
    pub fn new(base: Money) -> Self {
        PriceResolver {
            base,
            ..Default::default()
        }
    }

    /// Edit mode: restores the inputs from a stored product.
    ///
    /// The selected promotion is looked up among `offerable`; a stored
    /// charged price that differs from the recomputed one is kept as a
    /// manual override.
    pub fn from_product(product: &Product, offerable: &[PromotionDescriptor]) -> Self {
        let promotion_id = crate::types::ref_id(&product.promocion_id);
        let selected = offerable.iter().find(|p| p.id == promotion_id).cloned();
        let mut resolver = PriceResolver {
            base: product.precio_base,
            active: product.en_promocion,
            selected,
            manual_override: None,
        };
        if resolver.active && resolver.state().effective != product.precio_actual {
            resolver.manual_override = Some(product.precio_actual);
        }
        resolver
    }

    pub fn set_base(&mut self, base: Money) -> PriceState {
        self.base = base;
        self.manual_override = None;
        self.state()
    }

    /// Toggling the promotion off discards the selection and any override.
    pub fn set_active(&mut self, active: bool) -> PriceState {
        self.active = active;
        if !active {
            self.selected = None;
            self.manual_override = None;
        }
        self.state()
    }

    pub fn select_promotion(&mut self, promotion: Option<PromotionDescriptor>) -> PriceState {
        self.selected = promotion;
        self.manual_override = None;
        self.state()
    }

    /// Operator typed the charged price by hand. Ignored while inactive.
    pub fn override_effective(&mut self, effective: Money) -> PriceState {
        if self.active {
            self.manual_override = Some(effective);
        }
        self.state()
    }

    pub fn state(&self) -> PriceState {
        compute_effective(self.base, self.active, self.selected.as_ref(), self.manual_override)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Percentage;
    use crate::types::Ref;

    fn percent(id: &str, pct: f64) -> PromotionDescriptor {
        PromotionDescriptor {
            id: id.into(),
            discount: Discount::Percentage(Percentage::from_percent(pct)),
            valid_until: None,
        }
    }

    fn fixed(id: &str, cents: i64) -> PromotionDescriptor {
        PromotionDescriptor {
            id: id.into(),
            discount: Discount::FixedAmount(Money::from_cents(cents)),
            valid_until: None,
        }
    }

    #[test]
    fn test_inactive_promotion_means_effective_equals_base() {
        let state = compute_effective(Money::from_cents(5000), false, Some(&percent("p", 50.0)), Some(Money::from_cents(1)));
        assert_eq!(state.effective, state.base);
        assert_eq!(state.promotion_id, None);
    }

    #[test]
    fn test_twenty_percent_of_hundred() {
        let state = compute_effective(Money::from_cents(10000), true, Some(&percent("p", 20.0)), None);
        assert_eq!(state.effective.cents(), 8000);
        assert_eq!(state.discount().cents(), 2000);
        assert_eq!(state.discount_percent(), 20.0);
    }

    #[test]
    fn test_fixed_amount_larger_than_base_is_zero() {
        let state = compute_effective(Money::from_cents(3000), true, Some(&fixed("p", 5000)), None);
        assert!(state.effective.is_zero());
    }

    #[test]
    fn test_manual_override_wins() {
        let state = compute_effective(Money::from_cents(10000), true, Some(&percent("p", 20.0)), Some(Money::from_cents(7500)));
        assert_eq!(state.effective.cents(), 7500);
        assert_eq!(state.promotion_id.as_deref(), Some("p"));
    }

    #[test]
    fn test_base_change_recomputes_from_promotion() {
        let mut resolver = PriceResolver::new(Money::from_cents(10000));
        resolver.set_active(true);
        resolver.select_promotion(Some(percent("p", 10.0)));
        resolver.override_effective(Money::from_cents(8500));

        let state = resolver.set_base(Money::from_cents(20000));
        assert_eq!(state.effective.cents(), 18000);
    }

    #[test]
    fn test_deactivating_discards_selection() {
        let mut resolver = PriceResolver::new(Money::from_cents(10000));
        resolver.set_active(true);
        resolver.select_promotion(Some(fixed("p", 1500)));
        assert_eq!(resolver.state().effective.cents(), 8500);

        let state = resolver.set_active(false);
        assert_eq!(state.effective.cents(), 10000);
        assert_eq!(resolver.set_active(true).effective.cents(), 10000);
    }

    #[test]
    fn test_override_ignored_while_inactive() {
        let mut resolver = PriceResolver::new(Money::from_cents(10000));
        assert_eq!(resolver.override_effective(Money::from_cents(10)).effective.cents(), 10000);
    }

    #[test]
    fn test_from_product_keeps_custom_charged_price() {
        let product = Product {
            precio_base: Money::from_cents(10000),
            precio_actual: Money::from_cents(7000),
            en_promocion: true,
            promocion_id: Some(Ref::id_only("p")),
            ..Default::default()
        };
        let resolver = PriceResolver::from_product(&product, &[percent("p", 20.0)]);
        assert_eq!(resolver.state().effective.cents(), 7000);

        let matching = Product {
            precio_actual: Money::from_cents(8000),
            ..product
        };
        let mut resolver = PriceResolver::from_product(&matching, &[percent("p", 20.0)]);
        assert_eq!(resolver.set_base(Money::from_cents(5000)).effective.cents(), 4000);
    }

    #[test]
    fn test_write_to_form() {
        let mut store = FieldStore::default();
        compute_effective(Money::from_cents(4999), true, Some(&percent("p", 15.0)), None).write_to(&mut store);
        let values = store.snapshot();
        assert_eq!(values.number("precioActual"), Some(42.49));
        assert!(values.flag("enPromocion"));
        assert_eq!(values.text("promocionId"), "p");
    }
}
