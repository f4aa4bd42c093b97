use serde::Serialize;

/// A registered account. The password hash never leaves this crate's API in
/// serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}
