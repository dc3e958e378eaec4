mod health;
mod login;
mod metrics;
mod save;

/// Largest request body the API handlers will read.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub use health::health_handler;
pub use login::login_handler;
pub use metrics::metrics_handler;
pub use save::save_handler;
