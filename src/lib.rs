pub mod config;
pub mod db;
pub mod error;

pub use db::{AddUserOutcome, AuthOutcome, DbUser, NewUser, UserStorage};
pub use error::RegistryError;
