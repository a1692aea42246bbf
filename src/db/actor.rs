use crate::db::models::OptionRow;
use crate::db::schema::SQLITE_INIT;
use crate::error::CustodianError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum OptionStoreMessage {
    /// Fetch a single option row by name.
    Get(String, RpcReplyPort<Result<Option<OptionRow>, CustodianError>>),

    /// Create or replace an option row.
    Upsert(
        String,
        String,
        bool,
        RpcReplyPort<Result<(), CustodianError>>,
    ),

    /// Flip the autoload flag; true iff the row existed with the other value.
    SetAutoload(String, bool, RpcReplyPort<Result<bool, CustodianError>>),

    /// List every row currently flagged autoload.
    AutoloadedRows(RpcReplyPort<Result<Vec<OptionRow>, CustodianError>>),

    /// List rows whose name starts with the given literal prefix.
    RowsWithPrefix(String, RpcReplyPort<Result<Vec<OptionRow>, CustodianError>>),

    /// Delete a set of rows by exact name; returns the number removed.
    DeleteNamed(Vec<String>, RpcReplyPort<Result<u64, CustodianError>>),

    /// Delete a single row by name; true iff it existed.
    Delete(String, RpcReplyPort<Result<bool, CustodianError>>),
}

#[derive(Clone)]
pub struct OptionStoreHandle {
    actor: ActorRef<OptionStoreMessage>,
}

impl OptionStoreHandle {
    pub async fn get(&self, name: &str) -> Result<Option<OptionRow>, CustodianError> {
        ractor::call!(self.actor, OptionStoreMessage::Get, name.to_string())
            .map_err(|e| CustodianError::Ractor(format!("OptionStore Get RPC failed: {e}")))?
    }

    pub async fn upsert(
        &self,
        name: &str,
        value: &str,
        autoload: bool,
    ) -> Result<(), CustodianError> {
        ractor::call!(
            self.actor,
            OptionStoreMessage::Upsert,
            name.to_string(),
            value.to_string(),
            autoload
        )
        .map_err(|e| CustodianError::Ractor(format!("OptionStore Upsert RPC failed: {e}")))?
    }

    pub async fn set_autoload(&self, name: &str, autoload: bool) -> Result<bool, CustodianError> {
        ractor::call!(
            self.actor,
            OptionStoreMessage::SetAutoload,
            name.to_string(),
            autoload
        )
        .map_err(|e| CustodianError::Ractor(format!("OptionStore SetAutoload RPC failed: {e}")))?
    }

    pub async fn autoloaded_rows(&self) -> Result<Vec<OptionRow>, CustodianError> {
        ractor::call!(self.actor, OptionStoreMessage::AutoloadedRows).map_err(|e| {
            CustodianError::Ractor(format!("OptionStore AutoloadedRows RPC failed: {e}"))
        })?
    }

    pub async fn rows_with_prefix(&self, prefix: &str) -> Result<Vec<OptionRow>, CustodianError> {
        ractor::call!(
            self.actor,
            OptionStoreMessage::RowsWithPrefix,
            prefix.to_string()
        )
        .map_err(|e| CustodianError::Ractor(format!("OptionStore RowsWithPrefix RPC failed: {e}")))?
    }

    pub async fn delete_named(&self, names: Vec<String>) -> Result<u64, CustodianError> {
        ractor::call!(self.actor, OptionStoreMessage::DeleteNamed, names)
            .map_err(|e| CustodianError::Ractor(format!("OptionStore DeleteNamed RPC failed: {e}")))?
    }

    pub async fn delete(&self, name: &str) -> Result<bool, CustodianError> {
        ractor::call!(self.actor, OptionStoreMessage::Delete, name.to_string())
            .map_err(|e| CustodianError::Ractor(format!("OptionStore Delete RPC failed: {e}")))?
    }
}

struct OptionStoreState {
    pool: SqlitePool,
}

struct OptionStoreActor;

#[ractor::async_trait]
impl Actor for OptionStoreActor {
    type Msg = OptionStoreMessage;
    type State = OptionStoreState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("OptionStore initialized");
        Ok(OptionStoreState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            OptionStoreMessage::Get(name, reply) => {
                let res = self.get(&state.pool, &name).await;
                let _ = reply.send(res);
            }
            OptionStoreMessage::Upsert(name, value, autoload, reply) => {
                let res = self.upsert(&state.pool, &name, &value, autoload).await;
                let _ = reply.send(res);
            }
            OptionStoreMessage::SetAutoload(name, autoload, reply) => {
                let res = self.set_autoload(&state.pool, &name, autoload).await;
                let _ = reply.send(res);
            }
            OptionStoreMessage::AutoloadedRows(reply) => {
                let res = self.autoloaded_rows(&state.pool).await;
                let _ = reply.send(res);
            }
            OptionStoreMessage::RowsWithPrefix(prefix, reply) => {
                let res = self.rows_with_prefix(&state.pool, &prefix).await;
                let _ = reply.send(res);
            }
            OptionStoreMessage::DeleteNamed(names, reply) => {
                let res = self.delete_named(&state.pool, &names).await;
                let _ = reply.send(res);
            }
            OptionStoreMessage::Delete(name, reply) => {
                let res = self.delete(&state.pool, &name).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl OptionStoreActor {
    async fn get(&self, pool: &SqlitePool, name: &str) -> Result<Option<OptionRow>, CustodianError> {
        let row = sqlx::query_as::<_, OptionRow>(
            r"
        SELECT name, value, autoload
        FROM app_options
        WHERE name = ?
        ",
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn upsert(
        &self,
        pool: &SqlitePool,
        name: &str,
        value: &str,
        autoload: bool,
    ) -> Result<(), CustodianError> {
        sqlx::query(
            r"
        INSERT INTO app_options (name, value, autoload)
        VALUES (?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            value = excluded.value,
            autoload = excluded.autoload
        ",
        )
        .bind(name)
        .bind(value)
        .bind(autoload)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Single-statement conditional flip; rows already in the requested state
    /// are not counted, which keeps repeated optimizer passes no-ops.
    async fn set_autoload(
        &self,
        pool: &SqlitePool,
        name: &str,
        autoload: bool,
    ) -> Result<bool, CustodianError> {
        let res = sqlx::query(
            r"
        UPDATE app_options
        SET autoload = ?
        WHERE name = ? AND autoload != ?
        ",
        )
        .bind(autoload)
        .bind(name)
        .bind(autoload)
        .execute(pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    async fn autoloaded_rows(&self, pool: &SqlitePool) -> Result<Vec<OptionRow>, CustodianError> {
        let rows = sqlx::query_as::<_, OptionRow>(
            r"
        SELECT name, value, autoload
        FROM app_options
        WHERE autoload = 1
        ORDER BY name
        ",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn rows_with_prefix(
        &self,
        pool: &SqlitePool,
        prefix: &str,
    ) -> Result<Vec<OptionRow>, CustodianError> {
        // LIKE treats `_` as a single-character wildcard and the transient
        // prefixes are full of underscores, so every metacharacter is escaped
        // to get literal-prefix semantics.
        let pattern = format!("{}%", escape_like(prefix));

        let rows = sqlx::query_as::<_, OptionRow>(
            r"
        SELECT name, value, autoload
        FROM app_options
        WHERE name LIKE ? ESCAPE '\'
        ORDER BY name
        ",
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn delete_named(
        &self,
        pool: &SqlitePool,
        names: &[String],
    ) -> Result<u64, CustodianError> {
        if names.is_empty() {
            return Ok(0);
        }

        let mut builder = sqlx::QueryBuilder::new("DELETE FROM app_options WHERE name IN (");
        let mut separated = builder.separated(", ");
        for name in names {
            separated.push_bind(name);
        }
        builder.push(")");

        let res = builder.build().execute(pool).await?;
        Ok(res.rows_affected())
    }

    async fn delete(&self, pool: &SqlitePool, name: &str) -> Result<bool, CustodianError> {
        let res = sqlx::query("DELETE FROM app_options WHERE name = ?")
            .bind(name)
            .execute(pool)
            .await?;

        Ok(res.rows_affected() > 0)
    }
}

fn escape_like(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Spawn the option store actor and return a cloneable handle.
///
/// Registry names are sequenced so several stores (one per test, say) can
/// coexist in one process.
pub async fn spawn(database_url: &str) -> OptionStoreHandle {
    static STORE_SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
    let seq = STORE_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

    let (actor, _jh) = ractor::Actor::spawn(
        Some(format!("OptionStore-{seq}")),
        OptionStoreActor,
        database_url.to_string(),
    )
    .await
    .expect("failed to spawn OptionStore");

    OptionStoreHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), CustodianError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
