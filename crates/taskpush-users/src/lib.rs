pub mod db;
pub mod error;
pub mod password;
pub mod store;
pub mod types;

pub use error::{Result, UserError};
pub use store::UserStore;
pub use types::User;
