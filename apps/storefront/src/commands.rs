//! CLI subcommands and their execution.
//!
//! Every command reads `now` once and prices against it, so all cards in one
//! listing agree on which sales are running.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use tracing::{debug, info};

use dokan_core::{resolve_price, Cart, Order, OrderItem, Product};
use dokan_db::{Database, DbError, PricedProduct};

use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};
use crate::render;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List products with their current prices.
    Catalog {
        /// Only this category (slug, e.g. `sarees`).
        #[arg(long)]
        category: Option<String>,

        #[arg(long, default_value_t = 24)]
        limit: u32,
    },

    /// Show one product by id or SKU.
    Product { id: String },

    /// Search products by name (English or Bangla) or SKU.
    Search {
        query: String,

        #[arg(long, default_value_t = 24)]
        limit: u32,
    },

    /// Sales running right now, with countdowns.
    Sales,

    /// List categories.
    Categories,

    /// Show a customer's wishlist.
    Wishlist {
        customer: String,

        /// Save or unsave a product (id or SKU).
        #[arg(long, value_name = "PRODUCT")]
        toggle: Option<String>,
    },

    /// Place an order.
    Checkout {
        #[arg(long)]
        customer: String,

        /// Product id or SKU, optionally with a quantity: `SR-TAN-014:2`.
        #[arg(long = "item", value_name = "PRODUCT[:QTY]", required = true)]
        items: Vec<String>,

        #[arg(long)]
        coupon: Option<String>,
    },

    /// A customer's past orders.
    Orders {
        customer: String,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Cancel an order and return its stock.
    Cancel { order_id: String },
}

/// Everything a command needs.
pub struct Context {
    pub db: Database,
    pub config: StoreConfig,
    pub json: bool,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Receipt {
    order: Order,
    items: Vec<OrderItem>,
}

impl Context {
    /// Runs `command` and returns what should be printed.
    pub async fn execute(&self, command: &Command) -> AppResult<String> {
        debug!(?command, "Executing command");

        match command {
            Command::Catalog { category, limit } => {
                let cards = self
                    .db
                    .storefront()
                    .priced_catalog(category.as_deref(), *limit, self.now)
                    .await?;
                self.cards(&cards)
            }

            Command::Product { id } => {
                let product = self.find_product(id).await?;
                let card = self.db.storefront().priced_product(&product.id, self.now).await?;
                if self.json {
                    return Ok(serde_json::to_string_pretty(&card)?);
                }
                Ok(render::product_page(&card, self.config.locale, self.now))
            }

            Command::Search { query, limit } => {
                let cards = self.db.storefront().search(query, *limit, self.now).await?;
                self.cards(&cards)
            }

            Command::Sales => {
                let sales = self.db.storefront().live_sales(self.now).await?;
                if self.json {
                    return Ok(serde_json::to_string_pretty(&sales)?);
                }
                Ok(sales
                    .iter()
                    .map(|s| render::sale_line(s, self.config.locale, self.now))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }

            Command::Categories => {
                let categories = self.db.categories().list().await?;
                if self.json {
                    return Ok(serde_json::to_string_pretty(&categories)?);
                }
                Ok(categories
                    .iter()
                    .map(|c| format!("{:<12} {}", c.slug, c.display_name(self.config.locale)))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }

            Command::Wishlist { customer, toggle } => {
                let repo = self.db.wishlists();

                if let Some(key) = toggle {
                    let product = self.find_product(key).await?;
                    let mut wishlist = repo.list(customer).await?;
                    if wishlist.toggle(&product.id) {
                        repo.add(customer, &product.id).await?;
                    } else {
                        repo.remove(customer, &product.id).await?;
                    }
                    info!(customer = %customer, sku = %product.sku, "Wishlist toggled");
                }

                let products = repo.list_products(customer).await?;
                let sales = self.db.storefront().live_sales(self.now).await?;
                let cards: Vec<PricedProduct> = products
                    .into_iter()
                    .map(|product| {
                        let price = resolve_price(&product, &sales);
                        PricedProduct { product, price }
                    })
                    .collect();
                self.cards(&cards)
            }

            Command::Checkout {
                customer,
                items,
                coupon,
            } => {
                let mut cart = Cart::new();
                for raw in items {
                    let (key, quantity) = parse_item(raw)?;
                    let product = self.find_product(key).await?;
                    cart.add_item(&product.id, quantity)
                        .map_err(|e| AppError::Db(e.into()))?;
                }

                let orders = self.db.orders();
                let order = orders
                    .place_order(
                        customer,
                        &cart,
                        coupon.as_deref(),
                        &self.config.shipping,
                        self.now,
                    )
                    .await?;
                let items = orders.get_items(&order.id).await?;
                self.receipt(order, items)
            }

            Command::Orders { customer, limit } => {
                let orders = self.db.orders().list_for_customer(customer, *limit).await?;
                if self.json {
                    return Ok(serde_json::to_string_pretty(&orders)?);
                }
                Ok(orders
                    .iter()
                    .map(|o| {
                        format!(
                            "{}  {}  {:<9} {}",
                            o.created_at.format("%Y-%m-%d %H:%M"),
                            o.id,
                            o.status,
                            o.total().format(self.config.locale)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }

            Command::Cancel { order_id } => {
                let orders = self.db.orders();
                let order = orders.cancel(order_id, self.now).await?;
                let items = orders.get_items(&order.id).await?;
                self.receipt(order, items)
            }
        }
    }

    /// Looks a product up by SKU first, then by id.
    async fn find_product(&self, key: &str) -> AppResult<Product> {
        let products = self.db.products();
        if let Some(product) = products.get_by_sku(key).await? {
            return Ok(product);
        }
        products
            .get_by_id(key)
            .await?
            .ok_or_else(|| AppError::Db(DbError::not_found("Product", key)))
    }

    fn cards(&self, cards: &[PricedProduct]) -> AppResult<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(cards)?);
        }

        let mut out = format!("{}\n", self.config.store_name);
        if cards.is_empty() {
            out.push_str("(no products)");
        }
        let body = cards
            .iter()
            .map(|c| render::product_card(c, self.config.locale, self.now))
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str(&body);
        Ok(out)
    }

    fn receipt(&self, order: Order, items: Vec<OrderItem>) -> AppResult<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(&Receipt { order, items })?);
        }
        Ok(render::order_summary(&order, &items, self.config.locale))
    }
}

/// `KEY` or `KEY:QTY`.
fn parse_item(raw: &str) -> AppResult<(&str, i64)> {
    match raw.rsplit_once(':') {
        None => Ok((raw, 1)),
        Some((key, qty)) => {
            let quantity = qty
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::InvalidArgument(format!("bad quantity in '{raw}'")))?;
            Ok((key, quantity))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dokan_core::{CoreError, Locale};
    use dokan_db::seed::CatalogFixture;
    use dokan_db::DbConfig;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 14, 6, 0, 0).unwrap()
    }

    async fn context(locale: Locale, json: bool) -> Context {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CatalogFixture::demo().unwrap().apply(&db, now()).await.unwrap();
        Context {
            db,
            config: StoreConfig {
                locale,
                ..StoreConfig::default()
            },
            json,
            now: now(),
        }
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("SR-TAN-014").unwrap(), ("SR-TAN-014", 1));
        assert_eq!(parse_item("SR-TAN-014:3").unwrap(), ("SR-TAN-014", 3));
        assert!(parse_item("SR-TAN-014:lots").is_err());
    }

    #[tokio::test]
    async fn test_catalog_shows_sale_prices() {
        let ctx = context(Locale::En, false).await;

        let out = ctx
            .execute(&Command::Catalog {
                category: Some("sarees".to_string()),
                limit: 24,
            })
            .await
            .unwrap();

        // ৳3,200 tant saree, 20% saree week beats the 10% festival
        assert!(out.contains("Tangail Tant Saree"));
        assert!(out.contains("→ ৳2,560.00  [-20%]  Saree Week"));
        assert!(!out.contains("Cotton Panjabi"));
    }

    #[tokio::test]
    async fn test_product_by_sku_in_bangla() {
        let ctx = context(Locale::Bn, false).await;

        let out = ctx
            .execute(&Command::Product {
                id: "HM-NKQ-003".to_string(),
            })
            .await
            .unwrap();

        assert!(out.starts_with("নকশি কাঁথা"));
        assert!(out.contains("[-৩৫%]"));
        assert!(out.contains("শেষ হবে ০৬:০০:০০"));
    }

    #[tokio::test]
    async fn test_sales_and_search_json() {
        let ctx = context(Locale::En, true).await;

        let sales = ctx.execute(&Command::Sales).await.unwrap();
        let sales: serde_json::Value = serde_json::from_str(&sales).unwrap();
        assert_eq!(sales.as_array().map(Vec::len), Some(3));

        let found = ctx
            .execute(&Command::Search {
                query: "চা".to_string(),
                limit: 5,
            })
            .await
            .unwrap();
        let found: serde_json::Value = serde_json::from_str(&found).unwrap();
        assert_eq!(found[0]["product"]["sku"], "GR-TEA-500");
        assert_eq!(found[0]["price"]["isSale"], true);
    }

    #[tokio::test]
    async fn test_wishlist_toggle() {
        let ctx = context(Locale::En, false).await;
        let toggle = |key: &str| Command::Wishlist {
            customer: "cust-1".to_string(),
            toggle: Some(key.to_string()),
        };

        let out = ctx.execute(&toggle("GR-HON-250")).await.unwrap();
        assert!(out.contains("Sundarbans Honey"));

        let out = ctx.execute(&toggle("GR-HON-250")).await.unwrap();
        assert!(out.contains("(no products)"));
    }

    #[tokio::test]
    async fn test_checkout_orders_and_cancel() {
        let ctx = context(Locale::En, false).await;

        let receipt = ctx
            .execute(&Command::Checkout {
                customer: "cust-1".to_string(),
                items: vec!["GR-TEA-500:2".to_string(), "HM-JUT-010".to_string()],
                coupon: Some("welcome100".to_string()),
            })
            .await
            .unwrap();

        // tea 350 → 315 ×2, runner 650 → 585; 1215 - 100 + 60
        assert!(receipt.contains("Subtotal"));
        assert!(receipt.contains("৳1,215.00"));
        assert!(receipt.contains("Coupon WELCOME100"));
        assert!(receipt.ends_with("৳1,175.00"));

        let history = ctx
            .execute(&Command::Orders {
                customer: "cust-1".to_string(),
                limit: 10,
            })
            .await
            .unwrap();
        assert!(history.contains("pending"));

        let order = ctx.db.orders().list_for_customer("cust-1", 1).await.unwrap();
        let out = ctx
            .execute(&Command::Cancel {
                order_id: order[0].id.clone(),
            })
            .await
            .unwrap();
        assert!(out.starts_with("Order "));

        let tea = ctx.db.products().get_by_sku("GR-TEA-500").await.unwrap().unwrap();
        assert_eq!(tea.stock, 120);
    }

    #[tokio::test]
    async fn test_bangla_receipt_uses_bangla_names() {
        let ctx = context(Locale::Bn, false).await;

        let receipt = ctx
            .execute(&Command::Checkout {
                customer: "cust-1".to_string(),
                items: vec!["GR-TEA-500".to_string()],
                coupon: None,
            })
            .await
            .unwrap();

        assert!(receipt.starts_with("অর্ডার "));
        assert!(receipt.contains("সিলেটের চা ৫০০ গ্রাম"));
        assert!(!receipt.contains("Sylhet Tea"));
    }

    #[tokio::test]
    async fn test_checkout_rejects_unknown_and_oversized() {
        let ctx = context(Locale::En, false).await;

        let err = ctx
            .execute(&Command::Checkout {
                customer: "cust-1".to_string(),
                items: vec!["NOPE-1".to_string()],
                coupon: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Db(DbError::NotFound { .. })));

        let err = ctx
            .execute(&Command::Checkout {
                customer: "cust-1".to_string(),
                items: vec!["SR-KAT-007:6".to_string()],
                coupon: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Db(DbError::Rule(CoreError::InsufficientStock { available: 5, .. }))
        ));
    }
}
