pub mod admin;
pub mod auth;
pub mod chirps;
pub mod health;
pub mod users;
pub mod validation;
pub mod webhooks;

pub use admin::{admin_metrics, api_metrics, reset_metrics};
pub use auth::{login, refresh, revoke};
pub use chirps::{create_chirp, delete_chirp, get_chirp, list_chirps};
pub use health::health_check;
pub use users::{create_user, update_user};
pub use validation::{authenticate, extract_api_key, extract_bearer_token};
pub use webhooks::polka_webhook;
