//! # dokan-db: Database Layer for the Dokan Storefront
//!
//! SQLite storage through sqlx, plus the two providers the price resolver
//! depends on: the catalog (products) and the sales feed (live promotions).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dokan Data Flow                                  │
//! │                                                                         │
//! │  storefront CLI: `catalog --category sarees`                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     dokan-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Storefront  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │   service    │  │   │
//! │  │   │               │    │ ProductRepo   │───►│              │  │   │
//! │  │   │ SqlitePool    │◄───│ PromotionRepo │───►│ resolve_price│  │   │
//! │  │   │ Migrations    │    │ OrderRepo ... │    │ per product  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (dokan.db)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`storefront`] - Products paired with their current price
//! - [`seed`] - JSON demo catalog
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dokan_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("dokan.db")).await?;
//! let cards = db.storefront().search("jamdani", 20, Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;
pub mod storefront;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use storefront::{PricedProduct, Storefront};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::coupon::CouponRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::promotion::PromotionRepository;
pub use repository::wishlist::WishlistRepository;
