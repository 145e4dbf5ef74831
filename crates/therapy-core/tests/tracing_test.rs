//! Tracing setup installs one global subscriber and tolerates repeat calls.

use therapy_core::tracing::init_tracing;

#[test]
fn init_installs_global_subscriber_once() {
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());

    // A second call must not try to install another subscriber.
    init_tracing();
    tracing::info!(target: "therapy_core", "tracing initialized");
}
