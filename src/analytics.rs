//! Vendor analytics: reconciles the two order schemas and reduces them.
//!
//! Revenue for a vendor lives in two places: `vendor_orders` rows (matched on
//! `vendor_id` OR the legacy `vendor` column) and lines embedded in legacy
//! `orders` (matched per line on `vendor`/`assigned_vendor`). Both are
//! normalized into one in-memory list first; every figure is then computed
//! over that list in application code. The time window is applied here, not
//! in the database, mirroring how the data has always been consumed.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::domain::aggregates::order::{Order, OrderStatus, VendorOrder};
use crate::domain::value_objects::Money;

/// Commission applied to legacy order lines, which carry no rate of their own.
pub fn default_commission_rate() -> Decimal {
    Decimal::new(10, 2) // 10%
}

const TOP_PRODUCTS_LIMIT: usize = 5;

#[derive(Clone, Copy, Debug)]
pub struct AnalyticsWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl AnalyticsWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    pub fn last_days(days: i64) -> Self {
        let to = Utc::now();
        Self {
            from: to - Duration::days(days),
            to,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct NormalizedLine {
    pub product_id: Uuid,
    pub title: String,
    pub quantity: i32,
    pub price: Money,
}

impl NormalizedLine {
    pub fn revenue(&self) -> Money {
        self.price.times(self.quantity.max(0) as u32)
    }
}

/// An order reduced to the vendor's share, whichever schema it came from.
#[derive(Clone, Debug, Serialize)]
pub struct NormalizedOrder {
    pub order_ref: String,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub commission_rate: Decimal,
    pub lines: Vec<NormalizedLine>,
}

impl NormalizedOrder {
    pub fn gross(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::ZERO, |acc, l| acc.plus(l.revenue()))
    }

    pub fn net(&self) -> Money {
        self.gross().net_of_commission(self.commission_rate)
    }
}

/// Folds both order representations into one list for the given vendor.
pub fn normalize_orders(
    vendor: Uuid,
    vendor_orders: &[VendorOrder],
    orders: &[Order],
    legacy_commission: Decimal,
) -> Vec<NormalizedOrder> {
    let mut normalized = Vec::new();
    for vo in vendor_orders.iter().filter(|vo| vo.belongs_to(vendor)) {
        normalized.push(NormalizedOrder {
            order_ref: vo.order_number.clone(),
            status: vo.status,
            placed_at: vo.created_at,
            commission_rate: vo.commission_rate,
            lines: vo
                .items
                .iter()
                .map(|l| NormalizedLine {
                    product_id: l.product_id,
                    title: l.title.clone(),
                    quantity: l.quantity,
                    price: l.price,
                })
                .collect(),
        });
    }
    for order in orders {
        let lines: Vec<NormalizedLine> = order
            .vendor_lines(vendor)
            .map(|l| NormalizedLine {
                product_id: l.product_id,
                title: l.title.clone(),
                quantity: l.quantity,
                price: l.price,
            })
            .collect();
        if lines.is_empty() {
            continue;
        }
        normalized.push(NormalizedOrder {
            order_ref: order.order_number.clone(),
            status: order.status,
            placed_at: order.created_at,
            commission_rate: legacy_commission,
            lines,
        });
    }
    normalized
}

#[derive(Clone, Debug, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub orders: u32,
    pub revenue: Money,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub title: String,
    pub units: i64,
    pub revenue: Money,
}

#[derive(Clone, Debug, Serialize)]
pub struct VendorAnalytics {
    pub total_orders: u32,
    pub delivered_orders: u32,
    pub conversion_rate: Decimal,
    pub gross_revenue: Money,
    pub net_revenue: Money,
    pub status_breakdown: BTreeMap<&'static str, u32>,
    pub daily_revenue: Vec<DailyRevenue>,
    pub top_products: Vec<TopProduct>,
}

/// Windowed reduction over normalized orders. Revenue figures count
/// delivered orders only; the status breakdown counts everything in window.
pub fn compute(window: &AnalyticsWindow, orders: &[NormalizedOrder]) -> VendorAnalytics {
    let in_window: Vec<&NormalizedOrder> = orders
        .iter()
        .filter(|o| window.contains(o.placed_at))
        .collect();

    let mut status_breakdown: BTreeMap<&'static str, u32> = BTreeMap::new();
    for order in &in_window {
        *status_breakdown.entry(order.status.as_str()).or_default() += 1;
    }

    let delivered: Vec<&NormalizedOrder> = in_window
        .iter()
        .copied()
        .filter(|o| o.status == OrderStatus::Delivered)
        .collect();

    let gross_revenue = delivered
        .iter()
        .fold(Money::ZERO, |acc, o| acc.plus(o.gross()));
    let net_revenue = delivered
        .iter()
        .fold(Money::ZERO, |acc, o| acc.plus(o.net()));

    let mut daily: BTreeMap<NaiveDate, (u32, Money)> = BTreeMap::new();
    for order in &delivered {
        let bucket = daily
            .entry(order.placed_at.date_naive())
            .or_insert((0, Money::ZERO));
        bucket.0 += 1;
        bucket.1 = bucket.1.plus(order.net());
    }
    let daily_revenue = daily
        .into_iter()
        .map(|(date, (orders, revenue))| DailyRevenue {
            date,
            orders,
            revenue,
        })
        .collect();

    let mut by_product: HashMap<Uuid, TopProduct> = HashMap::new();
    for order in &delivered {
        for line in &order.lines {
            let entry = by_product
                .entry(line.product_id)
                .or_insert_with(|| TopProduct {
                    product_id: line.product_id,
                    title: line.title.clone(),
                    units: 0,
                    revenue: Money::ZERO,
                });
            entry.units += i64::from(line.quantity.max(0));
            entry.revenue = entry.revenue.plus(line.revenue());
        }
    }
    let mut top_products: Vec<TopProduct> = by_product.into_values().collect();
    top_products.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.title.cmp(&b.title))
    });
    top_products.truncate(TOP_PRODUCTS_LIMIT);

    let total_orders = in_window.len() as u32;
    let delivered_orders = delivered.len() as u32;
    let conversion_rate = if total_orders == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(delivered_orders) / Decimal::from(total_orders)).round_dp(4)
    };

    VendorAnalytics {
        total_orders,
        delivered_orders,
        conversion_rate,
        gross_revenue,
        net_revenue,
        status_breakdown,
        daily_revenue,
        top_products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::order::{OrderLine, VendorOrderLine};
    use chrono::TimeZone;
    use sqlx::types::Json;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, day, 12, 0, 0).unwrap()
    }

    fn vendor_order(
        vendor_id: Option<Uuid>,
        vendor: Option<Uuid>,
        status: OrderStatus,
        placed: DateTime<Utc>,
        lines: Vec<VendorOrderLine>,
    ) -> VendorOrder {
        VendorOrder {
            id: Uuid::new_v4(),
            order_number: format!("VO-{}", Uuid::new_v4()),
            vendor_id,
            vendor,
            status,
            items: Json(lines),
            total: Money::ZERO,
            commission_rate: Decimal::new(20, 2), // 20%
            created_at: placed,
            updated_at: placed,
        }
    }

    fn vo_line(product_id: Uuid, title: &str, quantity: i32, cents: i64) -> VendorOrderLine {
        VendorOrderLine {
            product_id,
            title: title.into(),
            quantity,
            price: Money::new(Decimal::new(cents, 2)),
        }
    }

    fn legacy_order(status: OrderStatus, placed: DateTime<Utc>, lines: Vec<OrderLine>) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: format!("ORD-{}", Uuid::new_v4()),
            user_id: Uuid::new_v4(),
            status,
            items: Json(lines),
            total: Money::ZERO,
            created_at: placed,
            updated_at: placed,
        }
    }

    #[test]
    fn normalization_merges_both_schemas() {
        let vendor = Uuid::new_v4();
        let other = Uuid::new_v4();
        let p = Uuid::new_v4();

        let vendor_orders = vec![
            // Matched via the current column.
            vendor_order(
                Some(vendor),
                None,
                OrderStatus::Delivered,
                at(1),
                vec![vo_line(p, "Mug", 1, 1000)],
            ),
            // Matched via the legacy column.
            vendor_order(
                None,
                Some(vendor),
                OrderStatus::Pending,
                at(2),
                vec![vo_line(p, "Mug", 2, 1000)],
            ),
            // Someone else's order.
            vendor_order(
                Some(other),
                None,
                OrderStatus::Delivered,
                at(2),
                vec![vo_line(p, "Mug", 9, 1000)],
            ),
        ];
        let orders = vec![legacy_order(
            OrderStatus::Delivered,
            at(3),
            vec![
                OrderLine {
                    product_id: p,
                    title: "Mug".into(),
                    quantity: 3,
                    price: Money::new(Decimal::new(1000, 2)),
                    vendor: None,
                    assigned_vendor: Some(vendor),
                },
                // A different vendor's line in the same legacy order.
                OrderLine {
                    product_id: Uuid::new_v4(),
                    title: "Vase".into(),
                    quantity: 1,
                    price: Money::new(Decimal::new(5000, 2)),
                    vendor: Some(other),
                    assigned_vendor: None,
                },
            ],
        )];

        let normalized =
            normalize_orders(vendor, &vendor_orders, &orders, default_commission_rate());
        assert_eq!(normalized.len(), 3);
        // The legacy order contributes only the vendor's own line.
        let legacy = &normalized[2];
        assert_eq!(legacy.lines.len(), 1);
        assert_eq!(legacy.lines[0].quantity, 3);
        assert_eq!(legacy.commission_rate, default_commission_rate());
    }

    #[test]
    fn revenue_counts_delivered_orders_net_of_commission() {
        let vendor = Uuid::new_v4();
        let p = Uuid::new_v4();
        let vendor_orders = vec![
            vendor_order(
                Some(vendor),
                None,
                OrderStatus::Delivered,
                at(5),
                vec![vo_line(p, "Mug", 2, 5000)], // gross 100.00, 20% commission
            ),
            vendor_order(
                Some(vendor),
                None,
                OrderStatus::Cancelled,
                at(6),
                vec![vo_line(p, "Mug", 10, 5000)],
            ),
        ];
        let normalized = normalize_orders(vendor, &vendor_orders, &[], default_commission_rate());
        let window = AnalyticsWindow::new(at(1), at(28));
        let report = compute(&window, &normalized);

        assert_eq!(report.total_orders, 2);
        assert_eq!(report.delivered_orders, 1);
        assert_eq!(report.gross_revenue.amount(), Decimal::new(10000, 2));
        assert_eq!(report.net_revenue.amount(), Decimal::new(8000, 2));
        assert_eq!(report.status_breakdown["delivered"], 1);
        assert_eq!(report.status_breakdown["cancelled"], 1);
        assert_eq!(report.conversion_rate, Decimal::new(5000, 4));
    }

    #[test]
    fn window_is_applied_in_memory() {
        let vendor = Uuid::new_v4();
        let p = Uuid::new_v4();
        let vendor_orders = vec![
            vendor_order(
                Some(vendor),
                None,
                OrderStatus::Delivered,
                at(2),
                vec![vo_line(p, "Mug", 1, 1000)],
            ),
            vendor_order(
                Some(vendor),
                None,
                OrderStatus::Delivered,
                at(20),
                vec![vo_line(p, "Mug", 1, 1000)],
            ),
        ];
        let normalized = normalize_orders(vendor, &vendor_orders, &[], default_commission_rate());
        let window = AnalyticsWindow::new(at(1), at(10));
        let report = compute(&window, &normalized);
        assert_eq!(report.total_orders, 1);
    }

    #[test]
    fn daily_buckets_group_by_date() {
        let vendor = Uuid::new_v4();
        let p = Uuid::new_v4();
        let vendor_orders = vec![
            vendor_order(
                Some(vendor),
                None,
                OrderStatus::Delivered,
                at(3),
                vec![vo_line(p, "Mug", 1, 1000)],
            ),
            vendor_order(
                Some(vendor),
                None,
                OrderStatus::Delivered,
                at(3),
                vec![vo_line(p, "Mug", 1, 1000)],
            ),
            vendor_order(
                Some(vendor),
                None,
                OrderStatus::Delivered,
                at(4),
                vec![vo_line(p, "Mug", 1, 1000)],
            ),
        ];
        let normalized = normalize_orders(vendor, &vendor_orders, &[], default_commission_rate());
        let report = compute(&AnalyticsWindow::new(at(1), at(28)), &normalized);
        assert_eq!(report.daily_revenue.len(), 2);
        assert_eq!(report.daily_revenue[0].orders, 2);
        assert_eq!(report.daily_revenue[1].orders, 1);
        // Buckets hold net revenue: 10.00 gross − 20% per order.
        assert_eq!(report.daily_revenue[0].revenue.amount(), Decimal::new(1600, 2));
    }

    #[test]
    fn top_products_rank_by_revenue() {
        let vendor = Uuid::new_v4();
        let mug = Uuid::new_v4();
        let vase = Uuid::new_v4();
        let vendor_orders = vec![vendor_order(
            Some(vendor),
            None,
            OrderStatus::Delivered,
            at(8),
            vec![
                vo_line(mug, "Mug", 10, 1000),  // 100.00
                vo_line(vase, "Vase", 1, 25000), // 250.00
            ],
        )];
        let normalized = normalize_orders(vendor, &vendor_orders, &[], default_commission_rate());
        let report = compute(&AnalyticsWindow::new(at(1), at(28)), &normalized);
        assert_eq!(report.top_products.len(), 2);
        assert_eq!(report.top_products[0].product_id, vase);
        assert_eq!(report.top_products[0].revenue.amount(), Decimal::new(25000, 2));
        assert_eq!(report.top_products[1].units, 10);
    }

    #[test]
    fn negative_line_quantities_contribute_no_revenue() {
        let line = NormalizedLine {
            product_id: Uuid::new_v4(),
            title: "Refund line".into(),
            quantity: -2,
            price: Money::new(Decimal::new(500, 2)),
        };
        assert_eq!(line.revenue(), Money::ZERO);
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let report = compute(&AnalyticsWindow::last_days(30), &[]);
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.conversion_rate, Decimal::ZERO);
        assert_eq!(report.gross_revenue, Money::ZERO);
        assert!(report.top_products.is_empty());
        assert!(report.daily_revenue.is_empty());
    }
}
