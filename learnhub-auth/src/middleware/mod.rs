pub mod admin;
pub mod auth;
pub mod device_lock;

pub use admin::{admin_middleware, ensure_self_or_admin};
pub use auth::{auth_middleware, session_middleware, AuthUser};
pub use device_lock::{check_device_binding, device_lock_middleware, CurrentUser};
