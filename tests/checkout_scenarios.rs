use async_trait::async_trait;
use std::sync::Arc;

use courtside_ledger::domain::account::{Address, Role};
use courtside_ledger::domain::catalog::{Amount, PriceList};
use courtside_ledger::domain::order::{OrderStatus, PaymentMethod};
use courtside_ledger::event_sourcing::{
    Aggregate, ChangeSet, EventStore, InMemoryEventStore, RawEnvelope, StoreError,
};
use courtside_ledger::ledger::{
    AccountBook, Cart, CatalogAdmin, FulfillmentController, LedgerError, OrderLedger,
};
use courtside_ledger::metrics::Metrics;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// In-memory store that hands control back to the runtime before every
/// read and write, so commands joined on one task interleave between
/// loading state and committing it.
struct InterleavingStore {
    inner: InMemoryEventStore,
}

#[async_trait]
impl EventStore for InterleavingStore {
    async fn append(&self, change_set: ChangeSet) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.inner.append(change_set).await
    }

    async fn load_events(&self, aggregate_type: &str, aggregate_id: Uuid) -> Result<Vec<RawEnvelope>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.load_events(aggregate_type, aggregate_id).await
    }

    async fn current_version(&self, aggregate_type: &str, aggregate_id: Uuid) -> Result<i64, StoreError> {
        self.inner.current_version(aggregate_type, aggregate_id).await
    }

    async fn aggregate_ids(&self, aggregate_type: &str) -> Result<Vec<Uuid>, StoreError> {
        self.inner.aggregate_ids(aggregate_type).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}

struct Shop {
    accounts: AccountBook,
    catalog: CatalogAdmin,
    ledger: Arc<OrderLedger>,
    fulfillment: FulfillmentController,
}

impl Shop {
    fn new() -> Self {
        Self::with_store(Arc::new(InMemoryEventStore::new()))
    }

    fn interleaving() -> Self {
        Self::with_store(Arc::new(InterleavingStore {
            inner: InMemoryEventStore::new(),
        }))
    }

    fn with_store(store: Arc<dyn EventStore>) -> Self {
        let metrics = Arc::new(Metrics::new().unwrap());
        let ledger = Arc::new(OrderLedger::new(store.clone(), metrics));

        Self {
            accounts: AccountBook::new(store.clone()),
            catalog: CatalogAdmin::new(store),
            fulfillment: FulfillmentController::new(ledger.clone()),
            ledger,
        }
    }

    async fn buyer(&self, points: u64) -> Uuid {
        let account = self.accounts.open("Jordan".to_string(), points).await.unwrap();
        self.accounts
            .set_shipping_address(
                account.account_id,
                Address {
                    street: "23 Baseline Rd".to_string(),
                    city: "Chicago".to_string(),
                    state: "IL".to_string(),
                    postal_code: "60601".to_string(),
                    country: "US".to_string(),
                },
            )
            .await
            .unwrap();
        account.account_id
    }

    async fn product(&self, name: &str, points: u64, stock: u64) -> Uuid {
        self.catalog
            .register(Role::Admin, name.to_string(), None, PriceList::new(dec!(25.00), points), stock)
            .await
            .unwrap()
            .product_id
    }

    async fn balance(&self, account_id: Uuid) -> u64 {
        self.accounts.get(account_id).await.unwrap().points_balance
    }

    async fn stock(&self, product_id: Uuid) -> u64 {
        self.ledger.catalog().get_stock(product_id).await.unwrap()
    }
}

#[tokio::test]
async fn test_points_order_delivered_then_second_order_refused() {
    let shop = Shop::new();
    let account = shop.buyer(100).await;
    let product = shop.product("Training Cones", 60, 5).await;

    let order = shop
        .ledger
        .create_order(account, product, 1, PaymentMethod::Points)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.amount_charged, Amount::Points(60));
    assert_eq!(shop.balance(account).await, 40);
    assert_eq!(shop.stock(product).await, 5);

    shop.fulfillment.ship(order.order_id, Role::Seller).await.unwrap();
    let delivered = shop.fulfillment.deliver(order.order_id, Role::Seller).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert_eq!(shop.stock(product).await, 4);

    let err = shop
        .ledger
        .create_order(account, product, 1, PaymentMethod::Points)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { required: 60, available: 40 }));
    assert_eq!(shop.balance(account).await, 40);
    assert_eq!(shop.ledger.list_orders_for_account(account).await.unwrap().len(), 1);

    // Delivery happens once
    let err = shop.fulfillment.deliver(order.order_id, Role::Admin).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransition { .. }));
    assert_eq!(shop.stock(product).await, 4);
}

#[tokio::test]
async fn test_cancel_refunds_and_closes_the_order() {
    let shop = Shop::new();
    let account = shop.buyer(100).await;
    let product = shop.product("Training Cones", 60, 5).await;

    let order = shop
        .ledger
        .create_order(account, product, 1, PaymentMethod::Points)
        .await
        .unwrap();

    let canceled = shop
        .fulfillment
        .cancel(order.order_id, Role::Seller, Some("out of size".to_string()))
        .await
        .unwrap();
    assert_eq!(canceled.status, OrderStatus::Canceled);
    assert_eq!(shop.balance(account).await, 100);
    assert_eq!(shop.stock(product).await, 5);

    for result in [
        shop.fulfillment.ship(order.order_id, Role::Admin).await,
        shop.fulfillment.deliver(order.order_id, Role::Admin).await,
        shop.fulfillment.cancel(order.order_id, Role::Admin, None).await,
    ] {
        assert!(matches!(result, Err(LedgerError::InvalidTransition { .. })));
    }
    assert_eq!(shop.balance(account).await, 100);
}

#[tokio::test]
async fn test_cash_on_delivery_cancel_leaves_balance_alone() {
    let shop = Shop::new();
    let account = shop.buyer(30).await;
    let product = shop.product("Jump Rope", 60, 5).await;

    let order = shop
        .ledger
        .create_order(account, product, 2, PaymentMethod::CashOnDelivery)
        .await
        .unwrap();
    assert_eq!(order.amount_charged, Amount::Cash(dec!(50.00)));
    assert_eq!(shop.balance(account).await, 30);

    shop.fulfillment.cancel(order.order_id, Role::Admin, None).await.unwrap();
    assert_eq!(shop.balance(account).await, 30);
}

#[tokio::test]
async fn test_concurrent_orders_cannot_overspend() {
    let shop = Shop::interleaving();
    let account = shop.buyer(60).await;
    let product = shop.product("Training Cones", 60, 5).await;

    let (first, second) = tokio::join!(
        shop.ledger.create_order(account, product, 1, PaymentMethod::Points),
        shop.ledger.create_order(account, product, 1, PaymentMethod::Points),
    );

    // Both read 60 points; the loser's debit hits a stale account version
    assert!(shop.ledger.metrics().storage_conflicts.get() >= 1);

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    for err in outcomes.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance { .. } | LedgerError::StorageConflict { .. }
        ));
    }

    assert_eq!(shop.balance(account).await, 0);
    assert_eq!(shop.ledger.list_orders_for_account(account).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_racing_ship_and_cancel_leaves_one_winner() {
    let shop = Shop::interleaving();
    let account = shop.buyer(100).await;
    let product = shop.product("Training Cones", 60, 5).await;
    let order = shop
        .ledger
        .create_order(account, product, 1, PaymentMethod::Points)
        .await
        .unwrap();

    let (shipped, canceled) = tokio::join!(
        shop.fulfillment.ship(order.order_id, Role::Seller),
        shop.fulfillment.cancel(order.order_id, Role::Admin, Some("duplicate".to_string())),
    );

    // Ship commits first; cancel read the order while it was still pending
    assert_eq!(shipped.unwrap().status, OrderStatus::Shipped);
    let err = canceled.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Canceled,
            stale: true,
            ..
        }
    ));
    assert!(err.to_string().contains("changed concurrently"));

    let current = shop.ledger.get_order(order.order_id).await.unwrap();
    assert_eq!(current.status, OrderStatus::Shipped);
    assert!(current.cancel_reason.is_none());
    assert_eq!(shop.balance(account).await, 40);
}

#[tokio::test]
async fn test_multi_line_cart_is_all_or_nothing() {
    let shop = Shop::new();
    let account = shop.buyer(100).await;
    let cones = shop.product("Training Cones", 30, 5).await;
    let ladder = shop.product("Agility Ladder", 40, 1).await;

    let mut cart = Cart::new();
    cart.add(cones, 1);
    cart.add(ladder, 2);

    // Second line exceeds stock, so nothing is placed
    let err = shop.ledger.checkout(account, &cart, PaymentMethod::Points).await.unwrap_err();
    assert!(matches!(err, LedgerError::OutOfStock { requested: 2, available: 1, .. }));
    assert_eq!(shop.balance(account).await, 100);
    assert!(shop.ledger.list_orders_for_account(account).await.unwrap().is_empty());

    cart.set_quantity(ladder, 1);
    let orders = shop.ledger.checkout(account, &cart, PaymentMethod::Points).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(shop.balance(account).await, 30);

    let ladder_order = orders.iter().find(|o| o.product_id == ladder).unwrap();
    shop.fulfillment.cancel(ladder_order.order_id, Role::Seller, None).await.unwrap();
    assert_eq!(shop.balance(account).await, 70);

    let cones_order = shop
        .ledger
        .get_order(orders.iter().find(|o| o.product_id == cones).unwrap().order_id)
        .await
        .unwrap();
    assert_eq!(cones_order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_buyer_cannot_fulfill() {
    let shop = Shop::new();
    let account = shop.buyer(100).await;
    let product = shop.product("Training Cones", 60, 5).await;
    let order = shop
        .ledger
        .create_order(account, product, 1, PaymentMethod::Points)
        .await
        .unwrap();

    let err = shop.fulfillment.cancel(order.order_id, Role::Buyer, None).await.unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden { role: Role::Buyer, .. }));

    let unchanged = shop.ledger.get_order(order.order_id).await.unwrap();
    assert_eq!(unchanged.status, OrderStatus::Pending);
    assert_eq!(unchanged.version(), order.version());
    assert_eq!(shop.balance(account).await, 40);
}

#[tokio::test]
async fn test_price_change_does_not_touch_placed_orders() {
    let shop = Shop::new();
    let account = shop.buyer(100).await;
    let product = shop.product("Training Cones", 60, 5).await;
    let order = shop
        .ledger
        .create_order(account, product, 1, PaymentMethod::Points)
        .await
        .unwrap();

    shop.catalog
        .change_prices(Role::Admin, product, PriceList::new(dec!(99.00), 90))
        .await
        .unwrap();
    let canceled = shop.fulfillment.cancel(order.order_id, Role::Admin, None).await.unwrap();

    assert_eq!(canceled.amount_charged, Amount::Points(60));
    assert_eq!(shop.balance(account).await, 100);
}
