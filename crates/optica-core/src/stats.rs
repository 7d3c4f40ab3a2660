//! Summary figures shown above the product and promotion listings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::money::Money;
use crate::promotion::{Promotion, PromotionStatus};
use crate::types::Product;

/// Stat cards of a product catalog (frames, lenses, accessories).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductStats {
    pub total: usize,
    pub on_promotion: usize,
    #[ts(type = "number")]
    pub total_stock: i64,
    /// Σ effective price × total stock.
    #[ts(type = "number")]
    pub inventory_value: Money,
}

pub fn product_stats<'a>(products: impl IntoIterator<Item = &'a Product>) -> ProductStats {
    products
        .into_iter()
        .fold(ProductStats::default(), |mut stats, product| {
            let stock = product.total_stock();
            stats.total += 1;
            if product.en_promocion {
                stats.on_promotion += 1;
            }
            stats.total_stock = stats.total_stock.saturating_add(stock);
            stats.inventory_value += product.effective_price().multiply_quantity(stock.max(0));
            stats
        })
}

/// Promotion counts per lifecycle status; every status is present.
pub fn promotion_stats<'a>(
    promotions: impl IntoIterator<Item = &'a Promotion>,
    now: DateTime<Utc>,
) -> BTreeMap<PromotionStatus, usize> {
    let mut counts: BTreeMap<PromotionStatus, usize> =
        PromotionStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for promotion in promotions {
        *counts.entry(promotion.status(now)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BranchStock;
    use chrono::TimeZone;

    fn stocked(base: i64, actual: i64, promo: bool, stocks: &[i64]) -> Product {
        Product {
            precio_base: Money::from_cents(base),
            precio_actual: Money::from_cents(actual),
            en_promocion: promo,
            sucursales: stocks
                .iter()
                .map(|s| BranchStock {
                    stock: *s,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_product_stats() {
        let products = vec![
            stocked(10000, 8000, true, &[2, 3]),
            stocked(5000, 5000, false, &[1]),
            stocked(2000, 2000, false, &[]),
        ];
        let stats = product_stats(&products);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.on_promotion, 1);
        assert_eq!(stats.total_stock, 6);
        assert_eq!(stats.inventory_value.cents(), 8000 * 5 + 5000);
    }

    #[test]
    fn test_promotion_stats_counts_every_status() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let promotions = vec![
            Promotion {
                activo: true,
                ..Default::default()
            },
            Promotion {
                activo: false,
                ..Default::default()
            },
        ];
        let counts = promotion_stats(&promotions, now);
        assert_eq!(counts[&PromotionStatus::Active], 1);
        assert_eq!(counts[&PromotionStatus::Inactive], 1);
        assert_eq!(counts[&PromotionStatus::Expired], 0);
        assert_eq!(counts.len(), 4);
    }

    #[test]
    fn test_huge_stock_figures_saturate() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "precioBase": 10,
            "sucursales": [{ "stock": 9.0e18 }, { "stock": 9.0e18 }]
        }))
        .unwrap();
        assert_eq!(product.total_stock(), i64::MAX);

        let products = vec![product.clone(), product];
        let stats = product_stats(&products);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.total_stock, i64::MAX);
        assert_eq!(stats.inventory_value.cents(), i64::MAX);
    }
}
