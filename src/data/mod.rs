//! Lookup helpers over the ORM.
//!
//! Each helper answers "the row, or nothing". A failed query is logged and
//! reported as `None` so callers can branch on presence alone; writes go through
//! the ORM directly and propagate their errors.

pub mod account;
pub mod profil;
pub mod token;
pub mod two_factor_confirmation;
pub mod user;

use sea_orm::DbErr;

/// Collapse a lookup result into an `Option`, logging query failures.
pub(crate) fn found<T>(result: Result<Option<T>, DbErr>, lookup: &'static str) -> Option<T> {
    match result {
        Ok(row) => row,
        Err(err) => {
            tracing::warn!(lookup, error = %err, "Lookup failed, treating as missing");
            None
        }
    }
}
