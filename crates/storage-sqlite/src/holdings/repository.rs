use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use ledger_core::holdings::{Holding, HoldingRepositoryTrait, NewHolding};
use ledger_core::Result;

use super::model::HoldingDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::holdings;
use crate::timestamps::format_timestamp;

pub struct HoldingRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl HoldingRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        HoldingRepository { pool, writer }
    }
}

#[async_trait]
impl HoldingRepositoryTrait for HoldingRepository {
    async fn upsert_holding(&self, holding: &NewHolding) -> Result<Holding> {
        let holding = holding.clone();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Holding> {
                let row = HoldingDB {
                    symbol: holding.symbol,
                    quantity: holding.quantity,
                    cost_basis: holding.cost_basis,
                    currency: holding.currency,
                    updated_at: format_timestamp(Utc::now()),
                };
                let saved = diesel::insert_into(holdings::table)
                    .values(&row)
                    .on_conflict(holdings::symbol)
                    .do_update()
                    .set(&row)
                    .returning(HoldingDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Holding::try_from(saved)?)
            })
            .await
    }

    fn get_holding(&self, symbol: &str) -> Result<Option<Holding>> {
        let mut conn = get_connection(&self.pool)?;
        let row = holdings::table
            .find(symbol)
            .select(HoldingDB::as_select())
            .first::<HoldingDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Holding::try_from).transpose()?)
    }

    fn list_holdings(&self) -> Result<Vec<Holding>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = holdings::table
            .select(HoldingDB::as_select())
            .order(holdings::symbol.asc())
            .load::<HoldingDB>(&mut conn)
            .into_core()?;
        rows.into_iter()
            .map(|row| Holding::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn delete_holding(&self, symbol: &str) -> Result<bool> {
        let symbol = symbol.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let deleted = diesel::delete(holdings::table.find(symbol))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted > 0)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use tempfile::tempdir;

    fn create_test_repository() -> (HoldingRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (HoldingRepository::new(Arc::clone(&pool), writer), temp_dir)
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_replaces() {
        let (repo, _dir) = create_test_repository();

        let first = repo
            .upsert_holding(&NewHolding::new("AAPL", 10.0, 150.0, "USD"))
            .await
            .unwrap();
        let second = repo
            .upsert_holding(&NewHolding::new("AAPL", 12.0, 148.5, "CAD"))
            .await
            .unwrap();

        assert!(second.updated_at >= first.updated_at);
        let stored = repo.get_holding("AAPL").unwrap().unwrap();
        assert_eq!(stored, second);
        assert_eq!(stored.quantity, 12.0);
        assert_eq!(stored.cost_basis, 148.5);
        assert_eq!(stored.currency, "CAD");
        assert_eq!(repo.list_holdings().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_upserts_keep_last_written() {
        let (repo, _dir) = create_test_repository();
        let repo = Arc::new(repo);

        let tasks: Vec<_> = (0..100)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.upsert_holding(&NewHolding::new("AAPL", i as f64, 1.0, "USD"))
                        .await
                        .unwrap()
                })
            })
            .collect();
        let mut written = Vec::new();
        for task in tasks {
            written.push(task.await.unwrap());
        }

        let stored = repo.get_holding("AAPL").unwrap().unwrap();
        let newest = written.iter().map(|h| h.updated_at).max().unwrap();
        assert_eq!(stored.updated_at, newest);
        assert!(written
            .iter()
            .any(|h| h.updated_at == newest && h.quantity == stored.quantity));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let (repo, _dir) = create_test_repository();
        assert!(repo.get_holding("MSFT").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_symbol() {
        let (repo, _dir) = create_test_repository();
        for symbol in ["SHOP", "AAPL", "MSFT"] {
            repo.upsert_holding(&NewHolding::new(symbol, 1.0, 1.0, "USD"))
                .await
                .unwrap();
        }

        let symbols: Vec<String> = repo
            .list_holdings()
            .unwrap()
            .into_iter()
            .map(|h| h.symbol)
            .collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "SHOP"]);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let (repo, _dir) = create_test_repository();
        repo.upsert_holding(&NewHolding::new("AAPL", 1.0, 1.0, "USD"))
            .await
            .unwrap();

        assert!(repo.delete_holding("AAPL").await.unwrap());
        assert!(!repo.delete_holding("AAPL").await.unwrap());
        assert!(repo.get_holding("AAPL").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_symbol_is_rejected_by_schema() {
        let (repo, _dir) = create_test_repository();
        let err = repo
            .upsert_holding(&NewHolding::new("", 1.0, 1.0, "USD"))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }
}
