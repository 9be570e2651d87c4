//! Location repository over the `location` table.
//!
//! Runtime queries throughout; the claim protocol relies on the database
//! settling races, so the SQL is the interesting part here. `INSERT .. ON
//! CONFLICT (address) DO NOTHING RETURNING *` yields a row exactly when we
//! inserted one, which is how a process learns whether it owns the
//! provider call for an address.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;
use crate::geo::{Coordinates, LocationStore};
use crate::models::Location;

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    address: String,
    longitude: Option<f64>,
    latitude: Option<f64>,
    last_checked: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            address: row.address,
            longitude: row.longitude,
            latitude: row.latitude,
            last_checked: row.last_checked,
        }
    }
}

/// Production [`LocationStore`] backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    /// Create a new location store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All cached addresses, most recently checked first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Location>, RepositoryError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r"
            SELECT address, longitude, latitude, last_checked
            FROM location
            ORDER BY last_checked DESC, address
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    /// Forget an address so the next resolve asks the provider again.
    ///
    /// Returns whether a record existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, address: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(r"DELETE FROM location WHERE address = $1")
            .bind(address)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn find(&self, address: &str) -> Result<Option<Location>, RepositoryError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r"
            SELECT address, longitude, latitude, last_checked
            FROM location
            WHERE address = $1
            ",
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Location::from))
    }

    async fn insert_pending(
        &self,
        address: &str,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Location>, RepositoryError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r"
            INSERT INTO location (address, last_checked)
            VALUES ($1, $2)
            ON CONFLICT (address) DO NOTHING
            RETURNING address, longitude, latitude, last_checked
            ",
        )
        .bind(address)
        .bind(checked_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Location::from))
    }

    async fn save_coordinates(
        &self,
        address: &str,
        coordinates: Coordinates,
        checked_at: DateTime<Utc>,
    ) -> Result<Location, RepositoryError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r"
            INSERT INTO location (address, longitude, latitude, last_checked)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (address) DO UPDATE
            SET longitude = EXCLUDED.longitude,
                latitude = EXCLUDED.latitude,
                last_checked = EXCLUDED.last_checked
            RETURNING address, longitude, latitude, last_checked
            ",
        )
        .bind(address)
        .bind(coordinates.longitude)
        .bind(coordinates.latitude)
        .bind(checked_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
