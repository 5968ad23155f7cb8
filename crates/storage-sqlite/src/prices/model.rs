//! Database models for daily prices.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use ledger_core::prices::PriceObservation;

use crate::errors::StorageError;
use crate::timestamps::{parse_date, parse_timestamp};

/// Database model for `prices_daily` rows.
#[derive(
    Queryable,
    Identifiable,
    Selectable,
    QueryableByName,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::prices_daily)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PriceDailyDB {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub id: i64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub symbol: String,
    #[diesel(sql_type = diesel::sql_types::Double)]
    pub price: f64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub asof: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub inserted_at: String,
}

/// Database model for appending a price. `id` is assigned by SQLite.
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::prices_daily)]
#[serde(rename_all = "camelCase")]
pub struct NewPriceDailyDB {
    pub symbol: String,
    pub price: f64,
    pub asof: String,
    pub inserted_at: String,
}

impl TryFrom<PriceDailyDB> for PriceObservation {
    type Error = StorageError;

    fn try_from(db: PriceDailyDB) -> Result<Self, Self::Error> {
        Ok(Self {
            id: db.id,
            asof: parse_date(&db.asof)?,
            inserted_at: parse_timestamp(&db.inserted_at)?,
            symbol: db.symbol,
            price: db.price,
        })
    }
}
