use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};


lazy_static! {
    pub static ref LOGIN_SUCCESS: Counter =
        register_counter!("bolao_login_success_total", "Successful logins").unwrap();
    pub static ref LOGIN_FAILURE: Counter =
        register_counter!("bolao_login_failure_total", "Rejected logins").unwrap();
    pub static ref SAVES_TOTAL: Counter =
        register_counter!("bolao_saves_total", "Guess submissions forwarded").unwrap();
    pub static ref GUESSES_FORWARDED: Counter =
        register_counter!("bolao_guesses_forwarded_total", "Individual guesses forwarded").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("bolao_rate_limited_total", "Save requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("bolao_upstream_failures_total", "Failed calls to the Apps Script").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "bolao_upstream_latency_seconds",
        "Apps Script call latency in seconds"
    )
    .unwrap();
}
