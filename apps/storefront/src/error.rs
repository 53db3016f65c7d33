//! Storefront error types.
//!
//! Every failure the CLI can report, with a customer-facing message and a
//! process exit code.

use dokan_core::{CoreError, CouponError};
use dokan_db::DbError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Could not encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AppError {
    /// Short message for the terminal, without internal details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Db(DbError::NotFound { entity, id }) => format!("{entity} '{id}' not found"),
            AppError::Db(DbError::Rule(CoreError::Coupon(err))) => coupon_message(err),
            AppError::Db(DbError::Rule(err)) => err.to_string(),
            AppError::Db(DbError::ConnectionFailed(_) | DbError::MigrationFailed(_)) => {
                "The store database is unavailable".to_string()
            }
            AppError::Db(_) => "Something went wrong, please try again".to_string(),
            other => other.to_string(),
        }
    }

    /// Exit code: 2 for bad input, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::InvalidArgument(_) => 2,
            AppError::Db(DbError::Rule(_) | DbError::NotFound { .. }) => 2,
            _ => 1,
        }
    }
}

fn coupon_message(err: &CouponError) -> String {
    match err {
        CouponError::NotFound(code) => format!("Coupon {code} does not exist"),
        CouponError::BelowMinimum { minimum } => {
            format!("Add more to your cart: this coupon needs at least {minimum}")
        }
        other => format!("Coupon cannot be used: {other}"),
    }
}

pub type AppResult<T> = Result<T, AppError>;
