//! Prometheus metrics for the A721 Bridge Relayer.
//!
//! Exposed on the /metrics endpoint for scraping.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Gauge, GaugeVec,
};

lazy_static! {
    /// 1 while the relayer is serving.
    pub static ref UP: Gauge = register_gauge!(
        "relayer_up",
        "Whether the relayer is running"
    ).unwrap();

    pub static ref SWAPS_OBSERVED: CounterVec = register_counter_vec!(
        "relayer_swaps_observed_total",
        "Total number of SwapInitialized events observed",
        &["chain"]
    ).unwrap();

    pub static ref REDEEMS_SUBMITTED: CounterVec = register_counter_vec!(
        "relayer_redeems_submitted_total",
        "Total number of redeem submissions",
        &["chain", "status"]
    ).unwrap();

    pub static ref ERRORS: CounterVec = register_counter_vec!(
        "relayer_errors_total",
        "Total number of errors",
        &["chain", "type"]
    ).unwrap();

    pub static ref WATCHER_CURSOR: GaugeVec = register_gauge_vec!(
        "relayer_watcher_cursor",
        "Next event log position each watcher will read",
        &["chain"]
    ).unwrap();
}
