use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::domain::account::{AccountAggregate, AccountCommand, AccountCreditReason, Role};
use crate::domain::catalog::{ProductAggregate, ProductCommand};
use crate::domain::order::{OrderAggregate, OrderCommand, OrderError, OrderStatus, PaymentMethod};
use crate::event_sourcing::core::{Aggregate, ChangeSet};
use crate::event_sourcing::store::{load_aggregate, load_all, EventStore, StoreError};
use crate::metrics::Metrics;
use crate::utils::{retry_on_transient, RetryConfig};
use super::cart::Cart;
use super::catalog_reader::CatalogReader;
use super::errors::{EntityKind, LedgerError};
use super::sales::SalesSummary;

// ============================================================================
// Order Ledger
// ============================================================================
//
// Every mutating operation builds one ChangeSet and commits it atomically:
//
//   checkout  : N x OrderPlaced               (+ PointsDebited when paying in points)
//   deliver   : OrderDelivered                + ProductStockAdjusted(-quantity)
//   cancel    : OrderCanceled                 (+ PointsCredited for points orders)
//   ship      : OrderShipped
//
// Each append carries the version the aggregate was read at, so a concurrent
// writer makes the whole change set fail. Conflicts on the order being moved
// are reported as InvalidTransition; conflicts anywhere else are retried.
//
// ============================================================================

pub struct OrderLedger {
    store: Arc<dyn EventStore>,
    catalog: CatalogReader,
    retry: RetryConfig,
    metrics: Arc<Metrics>,
}

impl OrderLedger {
    pub fn new(store: Arc<dyn EventStore>, metrics: Arc<Metrics>) -> Self {
        Self {
            catalog: CatalogReader::new(store.clone()),
            store,
            retry: RetryConfig::default(),
            metrics,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn catalog(&self) -> &CatalogReader {
        &self.catalog
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Place a single-line order
    pub async fn create_order(
        &self,
        account_id: Uuid,
        product_id: Uuid,
        quantity: u32,
        payment_method: PaymentMethod,
    ) -> Result<OrderAggregate, LedgerError> {
        let mut orders = self
            .checkout(account_id, &Cart::single(product_id, quantity), payment_method)
            .await?;
        orders
            .pop()
            .ok_or_else(|| LedgerError::InvariantViolation("checkout placed no order".to_string()))
    }

    /// Turn a cart into one `Pending` order per product line. All orders and
    /// the points debit commit together or not at all.
    pub async fn checkout(
        &self,
        account_id: Uuid,
        cart: &Cart,
        payment_method: PaymentMethod,
    ) -> Result<Vec<OrderAggregate>, LedgerError> {
        let started = Instant::now();
        let result = retry_on_transient(self.retry.clone(), |_attempt| {
            self.try_checkout(account_id, cart, payment_method)
        })
        .await
        .into_result();

        self.observe("checkout", started, &result);
        result
    }

    pub async fn transition(
        &self,
        order_id: Uuid,
        to: OrderStatus,
        role: Role,
        reason: Option<String>,
    ) -> Result<OrderAggregate, LedgerError> {
        let started = Instant::now();
        let result = retry_on_transient(self.retry.clone(), |_attempt| {
            self.try_transition(order_id, to, role, reason.clone())
        })
        .await
        .into_result();

        self.observe(to.as_str(), started, &result);
        result
    }

    async fn try_checkout(
        &self,
        account_id: Uuid,
        cart: &Cart,
        payment_method: PaymentMethod,
    ) -> Result<Vec<OrderAggregate>, LedgerError> {
        if cart.is_empty() {
            return Err(LedgerError::EmptyCart);
        }

        let account = load_aggregate::<AccountAggregate>(self.store.as_ref(), account_id)
            .await?
            .ok_or(LedgerError::not_found(EntityKind::Account, account_id))?;
        if !account.has_shipping_address() {
            return Err(LedgerError::AddressRequired { account_id });
        }

        let quoted = self.catalog.quote(cart, payment_method.currency()).await?;

        let total_points = quoted
            .iter()
            .filter_map(|line| line.line_total.points())
            .try_fold(0u64, |total, points| total.checked_add(points))
            .ok_or_else(|| LedgerError::InvalidQuantity("points total overflows".to_string()))?;

        if total_points > account.points_balance {
            return Err(LedgerError::InsufficientBalance {
                required: total_points,
                available: account.points_balance,
            });
        }

        let mut change_set = ChangeSet::new(Uuid::new_v4())
            .with_user(account_id)
            .with_metadata("command", "checkout");
        let mut placed = Vec::with_capacity(quoted.len());

        for line in quoted {
            let order_id = Uuid::now_v7();
            let events = OrderAggregate::handle_initial_command(&OrderCommand::PlaceOrder {
                account_id,
                product_id: line.product_id,
                product: line.product,
                quantity: line.quantity,
                payment_method,
                amount_charged: line.line_total,
            })
            .map_err(|e| order_error(order_id, e))?;

            change_set.append::<OrderAggregate>(order_id, 0, &events)?;
            placed.push((order_id, events));
        }

        // Free items (price 0) need no debit
        if total_points > 0 {
            let order_ids = placed.iter().map(|(order_id, _)| *order_id).collect();
            let debit = account.handle_command(&AccountCommand::DebitPoints {
                amount: total_points,
                order_ids,
            })?;
            change_set.append::<AccountAggregate>(account_id, account.version(), &debit)?;
        }

        self.commit(change_set).await?;

        let orders = placed
            .into_iter()
            .map(|(order_id, events)| {
                OrderAggregate::replay(order_id, &events)
                    .map_err(|e| order_error(order_id, e))?
                    .ok_or_else(|| LedgerError::InvariantViolation(format!("order {order_id} has no events")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for _ in &orders {
            self.metrics.record_order_placed(payment_method.as_str());
        }
        if total_points > 0 {
            self.metrics.record_points_debited(total_points);
        }

        tracing::info!(
            account_id = %account_id,
            orders = orders.len(),
            payment_method = %payment_method,
            points_debited = total_points,
            "Checkout committed"
        );

        Ok(orders)
    }

    async fn try_transition(
        &self,
        order_id: Uuid,
        to: OrderStatus,
        role: Role,
        reason: Option<String>,
    ) -> Result<OrderAggregate, LedgerError> {
        let mut order = self.get_order(order_id).await?;

        let events = order
            .handle_command(&OrderCommand::Transition { to, role, reason })
            .map_err(|e| order_error(order_id, e))?;

        let mut change_set = ChangeSet::new(Uuid::new_v4())
            .with_metadata("command", to.as_str())
            .with_metadata("acting_role", role.as_str());
        change_set.append::<OrderAggregate>(order_id, order.version(), &events)?;

        let mut refunded = 0;
        match to {
            OrderStatus::Delivered => {
                let product = load_aggregate::<ProductAggregate>(self.store.as_ref(), order.product_id)
                    .await?
                    .ok_or_else(|| {
                        LedgerError::InvariantViolation(format!(
                            "order {order_id} references missing product {}",
                            order.product_id
                        ))
                    })?;
                let adjust = product.handle_command(&ProductCommand::AdjustStock {
                    delta: -i64::from(order.quantity),
                    order_id: Some(order_id),
                })?;
                change_set.append::<ProductAggregate>(order.product_id, product.version(), &adjust)?;
            }
            OrderStatus::Canceled => {
                if let Some(points) = order.refundable_points() {
                    let account = load_aggregate::<AccountAggregate>(self.store.as_ref(), order.account_id)
                        .await?
                        .ok_or_else(|| {
                            LedgerError::InvariantViolation(format!(
                                "order {order_id} references missing account {}",
                                order.account_id
                            ))
                        })?;
                    let credit = account.handle_command(&AccountCommand::CreditPoints {
                        amount: points,
                        reason: AccountCreditReason::Refund { order_id },
                    })?;
                    change_set.append::<AccountAggregate>(order.account_id, account.version(), &credit)?;
                    refunded = points;
                }
            }
            OrderStatus::Pending | OrderStatus::Shipped => {}
        }

        match self.commit(change_set).await {
            Ok(()) => {}
            Err(StoreError::Conflict { aggregate_type, .. })
                if aggregate_type == OrderAggregate::AGGREGATE_TYPE =>
            {
                // Someone moved the order first; report against what they left
                let current = self.get_order(order_id).await?;
                return Err(LedgerError::InvalidTransition {
                    order_id,
                    from: current.status,
                    to,
                    stale: true,
                });
            }
            Err(e) => return Err(e.into()),
        }

        for event in &events {
            order.apply_event(event).map_err(|e| order_error(order_id, e))?;
        }

        self.metrics.record_transition(to.as_str());
        if to == OrderStatus::Delivered {
            self.metrics.record_units_delivered(order.quantity);
        }
        if refunded > 0 {
            self.metrics.record_points_refunded(refunded);
        }

        tracing::info!(
            order_id = %order_id,
            status = %order.status,
            role = %role,
            points_refunded = refunded,
            "Order transitioned"
        );

        Ok(order)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderAggregate, LedgerError> {
        load_aggregate::<OrderAggregate>(self.store.as_ref(), order_id)
            .await?
            .ok_or(LedgerError::not_found(EntityKind::Order, order_id))
    }

    /// Newest first
    pub async fn list_orders_for_account(&self, account_id: Uuid) -> Result<Vec<OrderAggregate>, LedgerError> {
        let account_version = self
            .store
            .current_version(AccountAggregate::AGGREGATE_TYPE, account_id)
            .await?;
        if account_version == 0 {
            return Err(LedgerError::not_found(EntityKind::Account, account_id));
        }

        let mut orders: Vec<OrderAggregate> = load_all::<OrderAggregate>(self.store.as_ref())
            .await?
            .into_iter()
            .filter(|order| order.account_id == account_id)
            .collect();
        orders.sort_by(|a, b| {
            b.placed_at
                .cmp(&a.placed_at)
                .then_with(|| b.order_id.cmp(&a.order_id))
        });

        Ok(orders)
    }

    /// Admin queue view, oldest first
    pub async fn list_orders_by_status_and_method(
        &self,
        status: Option<OrderStatus>,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Vec<OrderAggregate>, LedgerError> {
        let mut orders: Vec<OrderAggregate> = load_all::<OrderAggregate>(self.store.as_ref())
            .await?
            .into_iter()
            .filter(|order| status.map_or(true, |s| order.status == s))
            .filter(|order| payment_method.map_or(true, |m| order.payment_method == m))
            .collect();
        orders.sort_by(|a, b| {
            a.placed_at
                .cmp(&b.placed_at)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });

        Ok(orders)
    }

    pub async fn sales_summary(&self) -> Result<SalesSummary, LedgerError> {
        let orders = load_all::<OrderAggregate>(self.store.as_ref()).await?;
        Ok(SalesSummary::from_orders(&orders))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn commit(&self, change_set: ChangeSet) -> Result<(), StoreError> {
        let result = self.store.append(change_set).await;
        if let Err(StoreError::Conflict { aggregate_type, aggregate_id, .. }) = &result {
            self.metrics.record_storage_conflict();
            tracing::debug!(
                aggregate_type = %aggregate_type,
                aggregate_id = %aggregate_id,
                "Change set lost a version race"
            );
        }
        result
    }

    fn observe<T>(&self, command: &str, started: Instant, result: &Result<T, LedgerError>) {
        self.metrics.observe_command(command, started.elapsed().as_secs_f64());
        if let Err(error) = result {
            self.metrics.record_rejection(error.kind());
            tracing::warn!(command = command, kind = error.kind(), error = %error, "Ledger command refused");
        }
    }
}

fn order_error(order_id: Uuid, error: OrderError) -> LedgerError {
    match error {
        OrderError::InvalidStatusTransition { from, to } => LedgerError::InvalidTransition {
            order_id,
            from,
            to,
            stale: false,
        },
        OrderError::InvalidQuantity => LedgerError::InvalidQuantity(error.to_string()),
        OrderError::CurrencyMismatch { .. }
        | OrderError::UnknownStatus(_)
        | OrderError::UnknownPaymentMethod(_) => LedgerError::Validation(error.to_string()),
        OrderError::AlreadyPlaced | OrderError::NotInitialized => {
            LedgerError::InvariantViolation(format!("order {order_id}: {error}"))
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
