//! # Order Repository
//!
//! Checkout: turns a cart into an order inside one transaction.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place_order (single transaction)                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── load products in the cart                                        │
//! │    ├── load enabled sales, keep the ones live at `now`                  │
//! │    ├── load coupon (if a code was given)                                │
//! │    │                                                                    │
//! │    ├── price_cart(...)  ← pure, from dokan-core                         │
//! │    │                                                                    │
//! │    ├── INSERT orders                                                    │
//! │    ├── INSERT order_items   (price snapshots)                           │
//! │    ├── UPDATE products      stock = stock - qty  (guarded)              │
//! │    └── UPDATE coupons       used_count + 1       (guarded)              │
//! │    │                                                                    │
//! │  COMMIT  (any error above rolls everything back)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Order items freeze the SKU, name, listed price and sale price, so later
//! catalog edits never change what a customer was charged.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::coupon::{find_by_code_in, increment_usage_in};
use crate::repository::product::PRODUCT_COLUMNS;
use crate::repository::promotion::list_enabled_in;
use dokan_core::{
    live_sales, new_id, price_cart, Cart, CartSummary, CoreError, CouponError, Order, OrderItem,
    OrderStatus, Product, ShippingPolicy,
};

const ORDER_COLUMNS: &str = r#"
    id, customer_id, status, subtotal_poisha, savings_poisha, coupon_code,
    coupon_discount_poisha, shipping_poisha, total_poisha, created_at
"#;

const ORDER_ITEM_COLUMNS: &str = r#"
    id, order_id, product_id, sku_snapshot, name_snapshot, name_bn_snapshot,
    original_price_poisha, unit_price_poisha, discount_bps, sale_id, quantity,
    line_total_poisha
"#;

/// Repository for order database operations.
///
/// ## Usage
/// ```rust,ignore
/// let mut cart = Cart::new();
/// cart.add_item(&saree.id, 1)?;
///
/// let order = db
///     .orders()
///     .place_order("cust-42", &cart, Some("EID25"), &ShippingPolicy::default(), Utc::now())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order for `cart` at `now`.
    ///
    /// ## Returns
    /// * `Ok(Order)` - order stored, stock decremented, coupon redeemed
    /// * `Err(DbError::Rule(..))` - empty cart, unknown/hidden product,
    ///   insufficient stock, or a coupon that cannot be redeemed
    pub async fn place_order(
        &self,
        customer_id: &str,
        cart: &Cart,
        coupon_code: Option<&str>,
        shipping: &ShippingPolicy,
        now: DateTime<Utc>,
    ) -> DbResult<Order> {
        if customer_id.trim().is_empty() {
            return Err(dokan_core::ValidationError::Required {
                field: "customer_id".to_string(),
            }
            .into());
        }

        info!(
            customer_id = %customer_id,
            lines = cart.items.len(),
            coupon = ?coupon_code,
            "Placing order"
        );

        let mut tx = self.pool.begin().await?;

        let products = load_products(&mut tx, cart).await?;
        let sales = live_sales(&list_enabled_in(&mut tx).await?, now);

        let coupon = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => Some(
                find_by_code_in(&mut tx, code)
                    .await?
                    .ok_or_else(|| CouponError::NotFound(code.to_uppercase()))?,
            ),
            None => None,
        };

        let summary = price_cart(cart, &products, &sales, coupon.as_ref(), shipping, now)?;

        let order = Order {
            id: new_id(),
            customer_id: customer_id.to_string(),
            status: OrderStatus::Pending,
            subtotal_poisha: summary.subtotal.poisha(),
            savings_poisha: summary.savings.poisha(),
            coupon_code: summary.coupon_code.clone(),
            coupon_discount_poisha: summary.coupon_discount.poisha(),
            shipping_poisha: summary.shipping.poisha(),
            total_poisha: summary.total.poisha(),
            created_at: now,
        };

        insert_order(&mut tx, &order).await?;
        for item in order_items(&order.id, &summary) {
            insert_item(&mut tx, &item).await?;
            take_stock(&mut tx, &item, now).await?;
        }

        if let Some(code) = &order.coupon_code {
            increment_usage_in(&mut tx, code).await?;
        }

        tx.commit().await?;

        info!(
            order_id = %order.id,
            total_poisha = order.total_poisha,
            savings_poisha = order.savings_poisha,
            "Order placed"
        );

        Ok(order)
    }

    /// Cancels a pending order at `now` and returns its units to stock.
    ///
    /// Cancelling an already cancelled order changes nothing. Coupon usage is
    /// not refunded.
    pub async fn cancel(&self, order_id: &str, now: DateTime<Utc>) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = fetch_order(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if order.status == OrderStatus::Cancelled {
            warn!(order_id = %order_id, "Order already cancelled");
            return Ok(order);
        }

        sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(OrderStatus::Cancelled)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + (
                    SELECT SUM(quantity) FROM order_items
                    WHERE order_id = ?1 AND product_id = products.id
                ),
                updated_at = ?2
            WHERE id IN (SELECT product_id FROM order_items WHERE order_id = ?1)
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(order_id = %order_id, "Order cancelled");
        order.status = OrderStatus::Cancelled;
        Ok(order)
    }

    /// Gets an order by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        fetch_order(&mut conn, id).await
    }

    /// Lines of an order, in checkout order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY rowid"
        );
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// A customer's orders, newest first.
    pub async fn list_for_customer(&self, customer_id: &str, limit: u32) -> DbResult<Vec<Order>> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE customer_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

async fn load_products(conn: &mut SqliteConnection, cart: &Cart) -> DbResult<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    let mut products = Vec::with_capacity(cart.items.len());

    for item in &cart.items {
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&item.product_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;
        products.push(product);
    }

    debug!(count = products.len(), "Loaded cart products");
    Ok(products)
}

fn order_items(order_id: &str, summary: &CartSummary) -> Vec<OrderItem> {
    summary
        .lines
        .iter()
        .map(|line| OrderItem {
            id: new_id(),
            order_id: order_id.to_string(),
            product_id: line.product.id.clone(),
            sku_snapshot: line.product.sku.clone(),
            name_snapshot: line.product.name_en.clone(),
            name_bn_snapshot: line.product.name_bn.clone(),
            original_price_poisha: line.price.original_price.poisha(),
            unit_price_poisha: line.price.final_price.poisha(),
            discount_bps: line.price.discount.bps(),
            sale_id: line.price.sale.as_ref().map(|s| s.id.clone()),
            quantity: line.quantity,
            line_total_poisha: line.line_total.poisha(),
        })
        .collect()
}

async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, customer_id, status, subtotal_poisha, savings_poisha, coupon_code,
            coupon_discount_poisha, shipping_poisha, total_poisha, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_id)
    .bind(order.status)
    .bind(order.subtotal_poisha)
    .bind(order.savings_poisha)
    .bind(&order.coupon_code)
    .bind(order.coupon_discount_poisha)
    .bind(order.shipping_poisha)
    .bind(order.total_poisha)
    .bind(order.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, product_id, sku_snapshot, name_snapshot, name_bn_snapshot,
            original_price_poisha, unit_price_poisha, discount_bps, sale_id, quantity,
            line_total_poisha
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.product_id)
    .bind(&item.sku_snapshot)
    .bind(&item.name_snapshot)
    .bind(&item.name_bn_snapshot)
    .bind(item.original_price_poisha)
    .bind(item.unit_price_poisha)
    .bind(item.discount_bps)
    .bind(&item.sale_id)
    .bind(item.quantity)
    .bind(item.line_total_poisha)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Decrements stock, failing if another checkout got there first.
async fn take_stock(
    conn: &mut SqliteConnection,
    item: &OrderItem,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let available: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(&item.product_id)
            .fetch_one(&mut *conn)
            .await?;
        return Err(CoreError::InsufficientStock {
            sku: item.sku_snapshot.clone(),
            available,
            requested: item.quantity,
        }
        .into());
    }

    Ok(())
}

async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(order)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{self, now};
    use chrono::Duration;
    use dokan_core::{CouponKind, SaleScope};

    struct Shop {
        db: crate::pool::Database,
        saree: Product,
        tea: Product,
    }

    /// Saree (৳4,500, "sarees", 20% category sale) and tea (৳350, no sale).
    async fn shop() -> Shop {
        let db = fixtures::database().await;

        let sarees = fixtures::category("sarees", "Sarees", Some("শাড়ি"));
        db.categories().insert(&sarees).await.unwrap();

        let mut saree = fixtures::product("SR-1", 450_000, Some(&sarees.id));
        saree.name_bn = Some("জামদানি শাড়ি".to_string());
        let tea = fixtures::product("TEA-1", 35_000, None);
        db.products().insert(&saree).await.unwrap();
        db.products().insert(&tea).await.unwrap();

        db.promotions()
            .insert(&fixtures::sale(SaleScope::Category, Some(&sarees.id), 2000))
            .await
            .unwrap();

        Shop { db, saree, tea }
    }

    fn cart(lines: &[(&Product, i64)]) -> Cart {
        let mut cart = Cart::new();
        for (product, qty) in lines {
            cart.add_item(&product.id, *qty).unwrap();
        }
        cart
    }

    #[tokio::test]
    async fn test_place_order_snapshots_prices_and_takes_stock() {
        let shop = shop().await;
        let orders = shop.db.orders();
        let checkout_at = now() + Duration::minutes(30);

        let order = orders
            .place_order(
                "cust-1",
                &cart(&[(&shop.saree, 2), (&shop.tea, 1)]),
                None,
                &ShippingPolicy::default(),
                checkout_at,
            )
            .await
            .unwrap();

        // saree 4500 → 3600 ×2 = 7200; tea 350 → 7550, free delivery
        assert_eq!(order.subtotal_poisha, 755_000);
        assert_eq!(order.savings_poisha, 180_000);
        assert_eq!(order.shipping_poisha, 0);
        assert_eq!(order.total_poisha, 755_000);
        assert_eq!(order.status, OrderStatus::Pending);

        let items = orders.get_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].sku_snapshot, "SR-1");
        assert_eq!(items[0].name_bn_snapshot.as_deref(), Some("জামদানি শাড়ি"));
        assert_eq!(items[1].name_bn_snapshot, None);
        assert_eq!(items[0].original_price_poisha, 450_000);
        assert_eq!(items[0].unit_price_poisha, 360_000);
        assert_eq!(items[0].discount_bps, 2000);
        assert!(items[0].sale_id.is_some());
        assert!(items[1].sale_id.is_none());

        let saree = shop.db.products().get_by_id(&shop.saree.id).await.unwrap().unwrap();
        assert_eq!(saree.stock, 18);
        assert_eq!(saree.updated_at, checkout_at);

        assert_eq!(orders.get_by_id(&order.id).await.unwrap(), Some(order.clone()));
        assert_eq!(orders.list_for_customer("cust-1", 10).await.unwrap().len(), 1);
        assert!(orders.list_for_customer("cust-2", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ended_sale_does_not_reach_checkout() {
        let shop = shop().await;

        let order = shop
            .db
            .orders()
            .place_order(
                "cust-1",
                &cart(&[(&shop.saree, 1)]),
                None,
                &ShippingPolicy::free(),
                now() + Duration::days(1),
            )
            .await
            .unwrap();

        assert_eq!(order.subtotal_poisha, 450_000);
        assert_eq!(order.savings_poisha, 0);
    }

    #[tokio::test]
    async fn test_coupon_is_applied_and_redeemed() {
        let shop = shop().await;
        let mut single_use = fixtures::coupon("CHA50", CouponKind::Fixed, 5_000);
        single_use.max_uses = Some(1);
        shop.db.coupons().insert(&single_use).await.unwrap();

        let orders = shop.db.orders();
        let order = orders
            .place_order(
                "cust-1",
                &cart(&[(&shop.tea, 2)]),
                Some("cha50"),
                &ShippingPolicy::default(),
                now(),
            )
            .await
            .unwrap();

        // 700 - 50 + 60 delivery
        assert_eq!(order.coupon_code.as_deref(), Some("CHA50"));
        assert_eq!(order.coupon_discount_poisha, 5_000);
        assert_eq!(order.total_poisha, 71_000);

        let err = orders
            .place_order(
                "cust-2",
                &cart(&[(&shop.tea, 1)]),
                Some("CHA50"),
                &ShippingPolicy::default(),
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::Coupon(CouponError::UsageExhausted))
        ));

        let unknown = orders
            .place_order(
                "cust-2",
                &cart(&[(&shop.tea, 1)]),
                Some("NOPE"),
                &ShippingPolicy::default(),
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            unknown,
            DbError::Rule(CoreError::Coupon(CouponError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_failed_checkout_rolls_back() {
        let shop = shop().await;
        let orders = shop.db.orders();

        let err = orders
            .place_order(
                "cust-1",
                &cart(&[(&shop.tea, 1), (&shop.saree, 21)]),
                None,
                &ShippingPolicy::default(),
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::InsufficientStock { requested: 21, .. })
        ));

        let tea = shop.db.products().get_by_id(&shop.tea.id).await.unwrap().unwrap();
        assert_eq!(tea.stock, 20);
        assert!(orders.list_for_customer("cust-1", 10).await.unwrap().is_empty());

        assert!(matches!(
            orders
                .place_order("cust-1", &Cart::new(), None, &ShippingPolicy::default(), now())
                .await,
            Err(DbError::Rule(CoreError::EmptyCart))
        ));
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_once() {
        let shop = shop().await;
        let orders = shop.db.orders();

        let order = orders
            .place_order(
                "cust-1",
                &cart(&[(&shop.saree, 3)]),
                None,
                &ShippingPolicy::default(),
                now(),
            )
            .await
            .unwrap();

        let cancelled_at = now() + Duration::hours(2);
        let cancelled = orders.cancel(&order.id, cancelled_at).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        orders.cancel(&order.id, cancelled_at + Duration::hours(1)).await.unwrap();

        let saree = shop.db.products().get_by_id(&shop.saree.id).await.unwrap().unwrap();
        assert_eq!(saree.stock, 20);
        assert_eq!(saree.updated_at, cancelled_at);

        assert!(matches!(
            orders.cancel("missing", cancelled_at).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
