//! Integration test: the launch loop against a scripted provider.
//!
//! Runs on paused tokio time so backoff waits complete instantly while the
//! recorded wait durations stay exact.

mod common;

use std::time::Duration;

use common::scripted_provider::{capacity, instance, request, ScriptedProvider};
use ocilaunch_core::launch::render_dry_run;
use ocilaunch_core::retry::{run_launch, CapacityPatterns, LaunchOutcome, ProviderError, RetryPolicy};
use tokio_util::sync::CancellationToken;

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

#[tokio::test(start_paused = true)]
async fn capacity_twice_then_success() {
    let provider = ScriptedProvider::new(vec![
        Err(capacity()),
        Err(ProviderError::new("Out of host capacity.")),
        Ok(instance("ocid1.instance.oc1..ok")),
    ]);
    let policy = RetryPolicy::new(3, 5.0, 300.0, 2.0).unwrap();
    let start = tokio::time::Instant::now();

    let report = run_launch(
        &request(),
        &provider,
        &policy,
        &CapacityPatterns::default(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(report.outcome, LaunchOutcome::Succeeded(instance("ocid1.instance.oc1..ok")));
    assert_eq!(provider.calls(), 3);
    assert_eq!(report.attempts, 3);
    assert_eq!(report.waits, vec![secs(5.0), secs(10.0)]);
    assert!(start.elapsed() >= secs(15.0));
}

#[tokio::test(start_paused = true)]
async fn auth_error_is_immediately_fatal() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::new(
        "Authorization failed or requested resource not found.",
    )
    .with_code("NotAuthorizedOrNotFound")
    .with_status(404))]);
    let policy = RetryPolicy::new(5, 5.0, 300.0, 2.0).unwrap();

    let report = run_launch(
        &request(),
        &provider,
        &policy,
        &CapacityPatterns::default(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(
        report.outcome,
        LaunchOutcome::FailedFatal {
            reason: "Authorization failed or requested resource not found.".to_string(),
            code: Some("NotAuthorizedOrNotFound".to_string()),
        }
    );
    assert_eq!(provider.calls(), 1);
    assert!(report.waits.is_empty());
}

#[tokio::test(start_paused = true)]
async fn exhaustion_after_one_wait() {
    let provider = ScriptedProvider::always(Err(ProviderError::new("insufficient capacity")));
    let policy = RetryPolicy::new(2, 5.0, 300.0, 2.0).unwrap();

    let report = run_launch(
        &request(),
        &provider,
        &policy,
        &CapacityPatterns::default(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(
        report.outcome,
        LaunchOutcome::FailedExhausted {
            last_reason: "insufficient capacity".to_string(),
            attempts: 2,
        }
    );
    assert_eq!(provider.calls(), 2);
    assert_eq!(report.waits, vec![secs(5.0)]);
}

#[tokio::test(start_paused = true)]
async fn single_attempt_budget_never_waits() {
    let provider = ScriptedProvider::always(Err(capacity()));
    let policy = RetryPolicy::new(1, 5.0, 300.0, 2.0).unwrap();

    let report = run_launch(
        &request(),
        &provider,
        &policy,
        &CapacityPatterns::default(),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(report.outcome, LaunchOutcome::FailedExhausted { attempts: 1, .. }));
    assert!(report.waits.is_empty());
}

#[tokio::test(start_paused = true)]
async fn waits_follow_capped_schedule() {
    let provider = ScriptedProvider::always(Err(capacity()));
    let policy = RetryPolicy::new(6, 5.0, 12.0, 1.5).unwrap();

    let report = run_launch(
        &request(),
        &provider,
        &policy,
        &CapacityPatterns::default(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(
        report.waits,
        vec![secs(5.0), secs(7.5), secs(11.25), secs(12.0), secs(12.0)]
    );
    assert_eq!(provider.calls(), 6);
}

#[tokio::test(start_paused = true)]
async fn call_count_is_min_of_first_terminal_and_budget() {
    for max_attempts in 1..=4u32 {
        for k in 1..=5u32 {
            for terminal_ok in [true, false] {
                let mut script: Vec<_> = (1..k).map(|_| Err(capacity())).collect();
                script.push(if terminal_ok {
                    Ok(instance("i"))
                } else {
                    Err(ProviderError::new("InvalidParameter").with_code("InvalidParameter"))
                });
                let provider = ScriptedProvider::new(script);
                let policy = RetryPolicy::new(max_attempts, 1.0, 4.0, 2.0).unwrap();
                let report = run_launch(
                    &request(),
                    &provider,
                    &policy,
                    &CapacityPatterns::default(),
                    &CancellationToken::new(),
                )
                .await;
                assert_eq!(provider.calls(), k.min(max_attempts), "k={k} max={max_attempts}");
                assert_eq!(report.attempts, provider.calls());
                assert_eq!(report.waits.len() as u32, provider.calls() - 1);
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn cancel_during_backoff_stops_without_more_calls() {
    let provider = ScriptedProvider::always(Err(capacity()));
    let policy = RetryPolicy::new(10, 5.0, 300.0, 2.0).unwrap();
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let report = run_launch(&request(), &provider, &policy, &CapacityPatterns::default(), &token).await;

    assert_eq!(report.outcome, LaunchOutcome::Cancelled { attempts: 1 });
    assert_eq!(provider.calls(), 1);
    assert!(report.waits.is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_before_first_attempt_makes_no_calls() {
    let provider = ScriptedProvider::always(Ok(instance("never")));
    let policy = RetryPolicy::new(3, 5.0, 300.0, 2.0).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let report = run_launch(&request(), &provider, &policy, &CapacityPatterns::default(), &token).await;

    assert_eq!(report.outcome, LaunchOutcome::Cancelled { attempts: 0 });
    assert_eq!(provider.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn substituted_patterns_change_retry_behaviour() {
    let provider = ScriptedProvider::new(vec![
        Err(ProviderError::new("TooManyRequests").with_status(429)),
        Ok(instance("ocid1.instance.oc1..ok")),
    ]);
    let policy = RetryPolicy::new(3, 2.0, 10.0, 2.0).unwrap();
    let patterns = CapacityPatterns::new(["toomanyrequests"]);

    let report = run_launch(&request(), &provider, &policy, &patterns, &CancellationToken::new()).await;

    assert!(report.outcome.is_success());
    assert_eq!(report.waits, vec![secs(2.0)]);
}

#[tokio::test]
async fn dry_run_never_calls_provider() {
    let provider = ScriptedProvider::always(Ok(instance("never")));
    let out = render_dry_run(&request()).unwrap();
    assert!(out.contains("\"compartmentId\""));
    assert_eq!(provider.calls(), 0);
}
