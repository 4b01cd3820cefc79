use metrics::{counter, gauge};

/// Pre-register the engine's metrics so they appear on the embedding
/// application's recorder before the first event. The engine only uses
/// the `metrics` facade; installing an exporter is the host's job.
pub fn register() {
    counter!("evaluations_total").absolute(0);
    counter!("notifications_published").absolute(0);
    counter!("market_poll_failures").absolute(0);

    gauge!("open_positions").set(0.0);
}
