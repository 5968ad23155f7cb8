use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use diesel::SqliteConnection;
use std::sync::Arc;

use ledger_core::prices::{NewPriceObservation, PriceObservation, PriceRepositoryTrait};
use ledger_core::Result;

use super::model::{NewPriceDailyDB, PriceDailyDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::prices_daily;
use crate::timestamps::{format_date, format_timestamp};

pub struct PriceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PriceRepository { pool, writer }
    }
}

fn to_observations(rows: Vec<PriceDailyDB>) -> Result<Vec<PriceObservation>> {
    rows.into_iter()
        .map(|row| PriceObservation::try_from(row).map_err(Into::into))
        .collect()
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl PriceRepositoryTrait for PriceRepository {
    async fn record_price(&self, observation: &NewPriceObservation) -> Result<PriceObservation> {
        let symbol = observation.symbol.clone();
        let price = observation.price;
        let asof = format_date(observation.asof);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PriceObservation> {
                // Stamped on the writer so inserted_at follows write order.
                let row = NewPriceDailyDB {
                    symbol,
                    price,
                    asof,
                    inserted_at: format_timestamp(Utc::now()),
                };
                let saved = diesel::insert_into(prices_daily::table)
                    .values(&row)
                    .returning(PriceDailyDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(PriceObservation::try_from(saved)?)
            })
            .await
    }

    fn latest_price(&self, symbol: &str) -> Result<Option<PriceObservation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = prices_daily::table
            .filter(prices_daily::symbol.eq(symbol))
            .order((
                prices_daily::asof.desc(),
                prices_daily::inserted_at.desc(),
                prices_daily::id.desc(),
            ))
            .select(PriceDailyDB::as_select())
            .first::<PriceDailyDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(PriceObservation::try_from).transpose()?)
    }

    fn price_history(&self, symbol: &str, limit: usize) -> Result<Vec<PriceObservation>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = get_connection(&self.pool)?;

        // One row per asof: the latest insert for that day.
        let rows = sql_query(
            "WITH RankedPrices AS ( \
                SELECT p.id, p.symbol, p.price, p.asof, p.inserted_at, \
                    ROW_NUMBER() OVER ( \
                        PARTITION BY p.asof ORDER BY p.inserted_at DESC, p.id DESC \
                    ) AS rn \
                FROM prices_daily p WHERE p.symbol = ? \
            ) \
            SELECT id, symbol, price, asof, inserted_at FROM RankedPrices \
            WHERE rn = 1 ORDER BY asof DESC LIMIT ?",
        )
        .bind::<Text, _>(symbol)
        .bind::<BigInt, _>(sql_limit(limit))
        .load::<PriceDailyDB>(&mut conn)
        .into_core()?;

        to_observations(rows)
    }

    fn price_observations(&self, symbol: &str) -> Result<Vec<PriceObservation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = prices_daily::table
            .filter(prices_daily::symbol.eq(symbol))
            .order((
                prices_daily::asof.desc(),
                prices_daily::inserted_at.desc(),
                prices_daily::id.desc(),
            ))
            .select(PriceDailyDB::as_select())
            .load::<PriceDailyDB>(&mut conn)
            .into_core()?;
        to_observations(rows)
    }

    fn recent_prices(&self, limit: usize) -> Result<Vec<PriceObservation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = prices_daily::table
            .order((
                prices_daily::asof.desc(),
                prices_daily::inserted_at.desc(),
                prices_daily::id.desc(),
            ))
            .limit(sql_limit(limit))
            .select(PriceDailyDB::as_select())
            .load::<PriceDailyDB>(&mut conn)
            .into_core()?;
        to_observations(rows)
    }
}
