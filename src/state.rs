use std::sync::Arc;

use crate::config::{Args, ConfigError};
use crate::credentials::CredentialStore;
use crate::forward::Forwarder;
use crate::rate_limit::{FixedWindowLimiter, RateLimiter};

// app's shared state, built once at startup
pub struct AppState {
    pub credentials: CredentialStore,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub forwarder: Forwarder,
    pub max_guesses: usize, // max guesses in one submission
}

impl AppState {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let credentials = CredentialStore::load(args.credentials_file.as_deref())?;
        let rate_limiter = Arc::new(FixedWindowLimiter::new(args.rate_limit, args.rate_window()));
        Self::with_parts(args, credentials, rate_limiter)
    }

    /// Same as `from_args` but with the credential table and limiter supplied by the caller.
    pub fn with_parts(
        args: &Args,
        credentials: CredentialStore,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            credentials,
            rate_limiter,
            forwarder: Forwarder::new(args.apps_script_url.clone(), args.forward_timeout())?,
            max_guesses: args.max_guesses,
        })
    }
}
