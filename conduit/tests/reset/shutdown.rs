use std::sync::Arc;
use std::time::Duration;

use conduit::{MIN_POLL_INTERVAL, ResetPhase, ResetSupervisor};
use conduit_core::{ConduitError, ResetConfig, ResetProvider};
use conduit_mock::ScriptedReset;

const POLL: Duration = Duration::from_millis(250);

fn supervise(provider: &Arc<ScriptedReset>) -> ResetSupervisor {
    let target: Arc<dyn ResetProvider> = provider.clone();
    ResetSupervisor::spawn(
        target,
        ResetConfig {
            poll_interval: POLL,
        },
    )
}

async fn wait_for_phase(sup: &ResetSupervisor, phase: ResetPhase) {
    while sup.phase() != phase {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn idle_worker_stops_within_one_poll_interval() {
    let provider = Arc::new(ScriptedReset::new());
    let sup = supervise(&provider);
    // let the worker settle into its idle wait
    tokio::time::sleep(POLL * 3).await;

    let start = tokio::time::Instant::now();
    sup.shutdown().await.expect("clean exit");
    assert!(start.elapsed() <= POLL, "{:?}", start.elapsed());
    assert_eq!(provider.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn request_after_shutdown_is_rejected() {
    let provider = Arc::new(ScriptedReset::new());
    let sup = supervise(&provider);

    sup.signal_shutdown();
    wait_for_phase(&sup, ResetPhase::Terminated).await;

    assert_eq!(
        sup.request_reset().await,
        Err(ConduitError::SupervisorStopped)
    );
    assert_eq!(provider.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn running_reset_is_not_aborted_by_shutdown() {
    let provider = Arc::new(ScriptedReset::new().with_delay(Duration::from_secs(2)));
    let sup = Arc::new(supervise(&provider));

    let caller = {
        let sup = Arc::clone(&sup);
        tokio::spawn(async move { sup.request_reset().await })
    };
    wait_for_phase(&sup, ResetPhase::Resetting).await;

    sup.signal_shutdown();
    wait_for_phase(&sup, ResetPhase::Stopping).await;

    caller.await.expect("join").expect("reset finished");
    wait_for_phase(&sup, ResetPhase::Terminated).await;
    assert_eq!(provider.runs(), 1);
    assert_eq!(sup.completed_resets(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_worker() {
    let provider = Arc::new(ScriptedReset::new());
    let sup = supervise(&provider);
    assert_eq!(Arc::strong_count(&provider), 2);

    drop(sup);
    tokio::time::sleep(POLL * 2).await;

    // the exited worker released its reference to the target
    assert_eq!(Arc::strong_count(&provider), 1);
    assert_eq!(provider.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_poll_interval_is_raised_to_the_minimum() {
    let provider = Arc::new(ScriptedReset::new());
    let target: Arc<dyn ResetProvider> = provider.clone();
    let sup = ResetSupervisor::spawn(
        target,
        ResetConfig {
            poll_interval: Duration::ZERO,
        },
    );
    assert_eq!(sup.poll_interval(), MIN_POLL_INTERVAL);

    sup.request_reset().await.expect("reset");
    assert_eq!(provider.runs(), 1);
    tokio::time::timeout(Duration::from_secs(1), sup.shutdown())
        .await
        .expect("worker exits")
        .expect("clean join");
}

#[tokio::test]
async fn configured_poll_interval_is_kept() {
    let provider = Arc::new(ScriptedReset::new());
    let sup = supervise(&provider);
    assert_eq!(sup.poll_interval(), POLL);
}
