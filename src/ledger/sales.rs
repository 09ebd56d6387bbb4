use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::catalog::Amount;
use crate::domain::order::{OrderAggregate, OrderStatus};

/// Order count, units and charged amounts for one status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusTotals {
    pub orders: u64,
    pub units: u64,
    pub cash: Decimal,
    pub points: u64,
}

/// Charged amounts grouped by current order status.
///
/// Which buckets count as revenue is a reporting decision; `realized_cash`
/// is the conservative reading (delivered cash-on-delivery orders only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub by_status: BTreeMap<OrderStatus, StatusTotals>,
}

impl SalesSummary {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a OrderAggregate>) -> Self {
        let mut by_status: BTreeMap<OrderStatus, StatusTotals> = OrderStatus::ALL
            .into_iter()
            .map(|status| (status, StatusTotals::default()))
            .collect();

        for order in orders {
            let totals = by_status.entry(order.status).or_default();
            totals.orders += 1;
            totals.units = totals.units.saturating_add(u64::from(order.quantity));
            match order.amount_charged {
                Amount::Cash(cash) => totals.cash = totals.cash.saturating_add(cash),
                Amount::Points(points) => totals.points = totals.points.saturating_add(points),
            }
        }

        Self { by_status }
    }

    pub fn totals(&self, status: OrderStatus) -> StatusTotals {
        self.by_status.get(&status).cloned().unwrap_or_default()
    }

    pub fn order_count(&self) -> u64 {
        self.by_status.values().map(|totals| totals.orders).sum()
    }

    pub fn realized_cash(&self) -> Decimal {
        self.totals(OrderStatus::Delivered).cash
    }
}
