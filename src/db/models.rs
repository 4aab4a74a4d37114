use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Insert payload; `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Result of `UserStorage::add_user`. Store errors never escape that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddUserOutcome {
    Stored { id: i64 },
    AlreadyExists,
    Rejected,
}

impl AddUserOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// Unknown users and wrong passwords both end up as `Rejected`.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Authenticated(DbUser),
    Rejected,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

// Listing line. The password column is never rendered.
impl fmt::Display for DbUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}  {:<20}  {}", self.id, self.username, self.email)
    }
}

/// Render a listing, one user per line, in the order given.
pub fn render_users(users: &[DbUser]) -> String {
    users.iter().map(|u| format!("{u}\n")).collect()
}
