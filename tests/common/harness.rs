//! tests/common/harness.rs
use reactive_dcc::{ChannelLoad, Config, StateMachine};
use std::sync::Once;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| "reactive_dcc=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// A configuration that feeds raw loads straight into the history window.
pub fn unsmoothed_config() -> Config {
    let mut config = Config::default();
    config.smoothing.alpha = 0.0;
    config
}

/// Creates a state machine without smoothing, with tracing initialized.
pub fn unsmoothed_machine() -> StateMachine {
    init_tracing();
    StateMachine::new(unsmoothed_config()).unwrap()
}

/// A linear ramp of `steps` loads from `from` to `to`, both inclusive.
pub fn ramp(from: f64, to: f64, steps: usize) -> Vec<ChannelLoad> {
    let last = steps.saturating_sub(1).max(1) as f64;
    (0..steps)
        .map(|i| ChannelLoad::from_fraction(from + (to - from) * i as f64 / last))
        .collect()
}

/// `times` copies of the same load.
pub fn constant(load: f64, times: usize) -> Vec<ChannelLoad> {
    vec![ChannelLoad::from_fraction(load); times]
}
