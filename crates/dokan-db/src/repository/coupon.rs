//! # Coupon Repository
//!
//! Checkout codes. Codes are stored upper-case, so lookups are
//! case-insensitive for customers typing `eid25` or `Eid25`.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use dokan_core::validation::{validate_coupon_code, validate_coupon_value};
use dokan_core::{Coupon, CouponError};

const COUPON_COLUMNS: &str = r#"
    code, kind, value, min_order_poisha, max_uses, used_count,
    starts_at, expires_at, is_active
"#;

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Inserts a coupon under its normalized code.
    ///
    /// ## Returns
    /// * `Err(DbError::Rule)` - bad code, or a value out of range for its kind
    /// * `Err(DbError::UniqueViolation)` - code already exists
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<Coupon> {
        let mut conn = self.pool.acquire().await?;
        insert_in(&mut conn, coupon).await
    }

    /// Finds a coupon by code, ignoring case and surrounding whitespace.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let mut conn = self.pool.acquire().await?;
        find_by_code_in(&mut conn, code).await
    }

    /// Records one redemption.
    ///
    /// Fails with `CouponError::UsageExhausted` once `max_uses` is reached.
    pub async fn increment_usage(&self, code: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        increment_usage_in(&mut conn, code).await
    }
}

/// [`CouponRepository::insert`] on an explicit connection.
pub(crate) async fn insert_in(conn: &mut SqliteConnection, coupon: &Coupon) -> DbResult<Coupon> {
    validate_coupon_code(&coupon.code)?;
    validate_coupon_value(coupon.kind, coupon.value)?;

    let mut stored = coupon.clone();
    stored.code = Coupon::normalize_code(&coupon.code);

    info!(code = %stored.code, kind = ?stored.kind, "Inserting coupon");

    sqlx::query(
        r#"
        INSERT INTO coupons (
            code, kind, value, min_order_poisha, max_uses, used_count,
            starts_at, expires_at, is_active
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&stored.code)
    .bind(stored.kind)
    .bind(stored.value)
    .bind(stored.min_order_poisha)
    .bind(stored.max_uses)
    .bind(stored.used_count)
    .bind(stored.starts_at)
    .bind(stored.expires_at)
    .bind(stored.is_active)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &stored.code),
        other => other,
    })?;

    Ok(stored)
}

/// [`CouponRepository::find_by_code`] on an explicit connection, so checkout
/// can run it inside its transaction.
pub(crate) async fn find_by_code_in(
    conn: &mut SqliteConnection,
    code: &str,
) -> DbResult<Option<Coupon>> {
    let code = Coupon::normalize_code(code);
    debug!(code = %code, "Looking up coupon");

    let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1");
    let coupon = sqlx::query_as::<_, Coupon>(&sql)
        .bind(&code)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(coupon)
}

/// [`CouponRepository::increment_usage`] on an explicit connection.
pub(crate) async fn increment_usage_in(conn: &mut SqliteConnection, code: &str) -> DbResult<()> {
    let code = Coupon::normalize_code(code);

    let result = sqlx::query(
        r#"
        UPDATE coupons
        SET used_count = used_count + 1
        WHERE code = ?1 AND (max_uses IS NULL OR used_count < max_uses)
        "#,
    )
    .bind(&code)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    match find_by_code_in(conn, &code).await? {
        Some(_) => Err(CouponError::UsageExhausted.into()),
        None => Err(CouponError::NotFound(code).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use dokan_core::{CoreError, CouponKind, ValidationError};

    #[tokio::test]
    async fn test_codes_are_case_insensitive() {
        let db = fixtures::database().await;
        let repo = db.coupons();

        let stored = repo
            .insert(&fixtures::coupon(" eid25 ", CouponKind::Percentage, 2500))
            .await
            .unwrap();
        assert_eq!(stored.code, "EID25");

        let found = repo.find_by_code("Eid25").await.unwrap().unwrap();
        assert_eq!(found.kind, CouponKind::Percentage);
        assert_eq!(found.value, 2500);
        assert!(repo.find_by_code("NOPE").await.unwrap().is_none());

        let dup = repo
            .insert(&fixtures::coupon("EID25", CouponKind::Fixed, 100))
            .await
            .unwrap_err();
        assert!(matches!(dup, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_usage_stops_at_max_uses() {
        let db = fixtures::database().await;
        let repo = db.coupons();

        let mut limited = fixtures::coupon("FIRST2", CouponKind::Fixed, 5_000);
        limited.max_uses = Some(2);
        repo.insert(&limited).await.unwrap();

        repo.increment_usage("first2").await.unwrap();
        repo.increment_usage("FIRST2").await.unwrap();
        let err = repo.increment_usage("FIRST2").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::Coupon(CouponError::UsageExhausted))
        ));

        let coupon = repo.find_by_code("FIRST2").await.unwrap().unwrap();
        assert_eq!(coupon.used_count, 2);

        assert!(matches!(
            repo.increment_usage("GHOST").await,
            Err(DbError::Rule(CoreError::Coupon(CouponError::NotFound(_))))
        ));
    }

    #[tokio::test]
    async fn test_invalid_code_rejected() {
        let db = fixtures::database().await;
        let err = db
            .coupons()
            .insert(&fixtures::coupon("no spaces!", CouponKind::Fixed, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_percentage_above_full_discount_rejected() {
        let db = fixtures::database().await;
        let repo = db.coupons();

        let err = repo
            .insert(&fixtures::coupon("TYPO150", CouponKind::Percentage, 15_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(repo.find_by_code("TYPO150").await.unwrap().is_none());

        let err = repo
            .insert(&fixtures::coupon("FREE0", CouponKind::Fixed, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));
    }
}
