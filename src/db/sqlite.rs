use crate::db::models::{AddUserOutcome, AuthOutcome, DbUser, NewUser, render_users};
use crate::db::schema::SQLITE_INIT;
use crate::error::RegistryError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::io::Write;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url`, creating the file if it is missing.
    /// The schema is not touched; call `init_schema` afterwards.
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self, RegistryError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(connect_opts)
            .await?;
        debug!(database_url = %database_url, "user store opened");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL. Idempotent.
    pub async fn init_schema(&self) -> Result<(), RegistryError> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert unless the username is taken.
    ///
    /// Never fails: a duplicate username yields `AlreadyExists`, any other
    /// store error is logged and yields `Rejected`. Either way no row is added.
    pub async fn add_user(&self, user: NewUser) -> AddUserOutcome {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                info!(id, username = %user.username, "user stored");
                AddUserOutcome::Stored { id }
            }
            Err(e) => {
                let err: RegistryError = e.into();
                if err.is_unique_violation() {
                    info!(username = %user.username, "username already registered");
                    return AddUserOutcome::AlreadyExists;
                }
                warn!(username = %user.username, error = %err, "failed to store user");
                AddUserOutcome::Rejected
            }
        }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<DbUser>, RegistryError> {
        let user = sqlx::query_as::<_, DbUser>(
            "SELECT id, username, email, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Check a username/password pair against the stored row.
    ///
    /// Read-only. Unknown user, wrong password and store errors all report
    /// `Rejected`; only the logs tell them apart.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> AuthOutcome {
        match self.get_by_username(username).await {
            Ok(Some(user)) => {
                if bool::from(user.password.as_bytes().ct_eq(password.as_bytes())) {
                    info!(id = user.id, username = %username, "authentication succeeded");
                    AuthOutcome::Authenticated(user)
                } else {
                    debug!(username = %username, "authentication failed: wrong password");
                    AuthOutcome::Rejected
                }
            }
            Ok(None) => {
                debug!(username = %username, "authentication failed: unknown user");
                AuthOutcome::Rejected
            }
            Err(e) => {
                warn!(username = %username, error = %e, "authentication lookup failed");
                AuthOutcome::Rejected
            }
        }
    }

    /// All users in storage order.
    pub async fn list_users(&self) -> Result<Vec<DbUser>, RegistryError> {
        let users = sqlx::query_as::<_, DbUser>(
            "SELECT id, username, email, password FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Write the listing to `out`. Returns how many users were written.
    ///
    /// Rows are fetched before `out` is touched, so `out` may be a locked
    /// stdout shared with the log writer.
    pub async fn display_users<W: Write>(&self, out: &mut W) -> Result<usize, RegistryError> {
        let users = self.list_users().await?;
        write_users(&users, out)?;
        Ok(users.len())
    }

    /// Print the listing to stdout.
    pub async fn print_users(&self) -> Result<usize, RegistryError> {
        let users = self.list_users().await?;
        write_users(&users, &mut std::io::stdout().lock())?;
        Ok(users.len())
    }

    pub async fn count(&self) -> Result<i64, RegistryError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }
}

fn write_users<W: Write>(users: &[DbUser], out: &mut W) -> Result<(), RegistryError> {
    out.write_all(render_users(users).as_bytes())?;
    out.flush()?;
    Ok(())
}
