//! Write helpers: BEGIN IMMEDIATE transactions and nestable savepoints.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use therapy_core::errors::StorageError;

/// Run `f` inside a BEGIN IMMEDIATE transaction.
/// The write lock is taken up front, so a busy database fails fast here
/// instead of midway through the batch.
pub fn with_immediate_transaction<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<StorageError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(StorageError::from)?;
    // Dropping `tx` on the error path rolls back.
    let result = f(&tx)?;
    tx.commit().map_err(StorageError::from)?;
    Ok(result)
}

/// Run `f` inside a named savepoint.
///
/// Works both inside and outside an open transaction. On error everything
/// `f` did is rolled back and the error is returned unchanged.
pub fn with_savepoint<F, T, E>(conn: &Connection, name: &str, f: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<StorageError>,
{
    conn.execute_batch(&format!("SAVEPOINT {name};"))
        .map_err(StorageError::from)?;
    match f(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {name};"))
                .map_err(StorageError::from)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) =
                conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name};"))
            {
                tracing::error!(savepoint = name, error = %rollback_err, "savepoint rollback failed");
            }
            Err(e)
        }
    }
}
