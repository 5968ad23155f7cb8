use super::{DbConnection, DbPool};
use crate::errors::StorageError;
use diesel::r2d2::R2D2Connection;
use diesel::SqliteConnection;
use ledger_core::errors::{Error, Result};
use log::{debug, error, warn};
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// A job runs against the writer's connection and returns a core Result,
// which is what callers expect.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type Reply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    // The Box<dyn Any + Send> erases the job's return type.
    tx: mpsc::Sender<(Job<Box<dyn Any + Send + 'static>>, Reply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's connection, inside an
    /// immediate transaction.
    ///
    /// Fails with `Error::StorageUnavailable` if the actor has stopped.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| Error::StorageUnavailable("database writer has stopped".to_string()))?;

        let boxed = ret_rx.await.map_err(|_| {
            Error::StorageUnavailable("database writer dropped the request".to_string())
        })??;

        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::StorageUnavailable("unexpected result type from database writer".to_string())
        })
    }
}

/// Spawns a background Tokio task that acts as the single writer to the
/// database. Jobs are processed serially on one pooled connection.
///
/// The connection is taken from the pool on the first job. If that fails the
/// job is answered with `StorageUnavailable` and the next job tries again.
/// A connection left broken by a failed job is handed back to the pool and
/// replaced on the next job.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    // Bounded; senders wait once 1024 jobs are queued.
    let (tx, mut rx) =
        mpsc::channel::<(Job<Box<dyn Any + Send + 'static>>, Reply)>(1024);

    tokio::spawn(async move {
        let mut conn: Option<DbConnection> = None;

        while let Some((job, reply_tx)) = rx.recv().await {
            if conn.is_none() {
                match pool.get() {
                    Ok(c) => conn = Some(c),
                    Err(e) => {
                        error!("Writer could not acquire a database connection: {}", e);
                        let _ = reply_tx.send(Err(StorageError::from(e).into()));
                        continue;
                    }
                }
            }
            let Some(c) = conn.as_deref_mut() else {
                continue;
            };

            let result: Result<Box<dyn Any + Send + 'static>> = c
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);

            let broken = result.is_err() && (c.is_broken() || c.ping().is_err());

            // The requester may have gone away; nothing to do then.
            let _ = reply_tx.send(result);

            if broken {
                warn!("Writer connection is broken, acquiring a new one for the next job");
                conn = None;
            }
        }

        debug!("All write handles dropped, stopping database writer");
    });

    WriteHandle { tx }
}
