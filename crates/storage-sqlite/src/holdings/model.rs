//! Database models for holdings.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use ledger_core::holdings::Holding;

use crate::errors::StorageError;
use crate::timestamps::parse_timestamp;

/// Database model for holdings. Used for reads, inserts and the upsert
/// changeset alike; the primary key is left out of the changeset.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::holdings)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct HoldingDB {
    pub symbol: String,
    pub quantity: f64,
    pub cost_basis: f64,
    pub currency: String,
    pub updated_at: String,
}

impl TryFrom<HoldingDB> for Holding {
    type Error = StorageError;

    fn try_from(db: HoldingDB) -> Result<Self, Self::Error> {
        Ok(Self {
            updated_at: parse_timestamp(&db.updated_at)?,
            symbol: db.symbol,
            quantity: db.quantity,
            cost_basis: db.cost_basis,
            currency: db.currency,
        })
    }
}
