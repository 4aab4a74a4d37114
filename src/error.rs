use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Config error: {0}")]
    ConfigError(#[from] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for RegistryError {
    fn from(e: figment::Error) -> Self {
        RegistryError::ConfigError(Box::new(e))
    }
}

impl RegistryError {
    /// True when the store rejected a write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RegistryError::DatabaseError(SqlxError::Database(db_err)) => {
                db_err.is_unique_violation()
            }
            _ => false,
        }
    }
}
