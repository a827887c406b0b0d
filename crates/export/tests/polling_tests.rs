//! Poll scheduler tests.
//!
//! # Invariants
//! - One status query per interval tick while the job is active
//! - No further queries once a terminal status is stored
//! - A failed query stops polling and keeps the last good snapshot
//! - Slow responses are neither coalesced nor reordered

mod common;

use std::time::Duration;

use common::*;
use coverage_client::{ExportFilters, ExportStatus};

#[tokio::test(start_paused = true)]
async fn test_one_query_per_tick_until_completed() {
    let h = harness();
    h.api.on_create(job("exp-1", ExportStatus::Pending, 0));
    h.api
        .on_status("exp-1", job("exp-1", ExportStatus::Processing, 40))
        .on_status("exp-1", job("exp-1", ExportStatus::Processing, 75))
        .on_status("exp-1", completed_job("exp-1", "repositories_export_2024-03-01.xlsx"));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();

    sleep(Duration::from_millis(1900)).await;
    assert_eq!(h.api.status_calls("exp-1"), 0);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(h.api.status_calls("exp-1"), 1);
    assert_eq!(h.manager.job("exp-1").unwrap().progress, 40);

    sleep(INTERVAL).await;
    assert_eq!(h.api.status_calls("exp-1"), 2);
    assert_eq!(h.manager.job("exp-1").unwrap().progress, 75);

    sleep(INTERVAL).await;
    assert_eq!(h.api.status_calls("exp-1"), 3);
    let finished = h.manager.job("exp-1").unwrap();
    assert_eq!(finished.status, ExportStatus::Completed);
    assert_eq!(finished.progress, 100);
    assert!(!h.manager.is_polling("exp-1"));

    sleep(INTERVAL * 10).await;
    assert_eq!(h.api.status_calls("exp-1"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_replaces_previous_entry() {
    let h = harness();
    let mut first = job("exp-1", ExportStatus::Processing, 20);
    first.total_records = Some(1000);
    first.processed_records = Some(200);
    first.message = Some("Writing rows".to_string());
    h.api.on_create(job("exp-1", ExportStatus::Pending, 0));
    h.api
        .on_status("exp-1", first)
        .on_status("exp-1", job("exp-1", ExportStatus::Processing, 30));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();
    sleep(ONE_TICK).await;
    assert_eq!(h.manager.job("exp-1").unwrap().total_records, Some(1000));

    sleep(INTERVAL).await;
    let replaced = h.manager.job("exp-1").unwrap();
    assert_eq!(replaced.progress, 30);
    assert_eq!(replaced.total_records, None);
    assert_eq!(replaced.message, None);
}

#[tokio::test(start_paused = true)]
async fn test_progress_regression_is_stored_as_reported() {
    let h = harness();
    h.api.on_create(job("exp-1", ExportStatus::Pending, 0));
    h.api
        .on_status("exp-1", job("exp-1", ExportStatus::Processing, 60))
        .on_status("exp-1", job("exp-1", ExportStatus::Processing, 45));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();
    sleep(ONE_TICK + INTERVAL).await;

    assert_eq!(h.manager.job("exp-1").unwrap().progress, 45);
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_stops_polling_and_keeps_reason() {
    let h = harness();
    h.api.on_create(job("exp-1", ExportStatus::Processing, 0));
    h.api
        .on_status("exp-1", failed_job("exp-1", "Query exceeded the export row limit"));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();
    sleep(ONE_TICK).await;

    let failed = h.manager.job("exp-1").unwrap();
    assert_eq!(failed.status, ExportStatus::Failed);
    assert_eq!(
        failed.failure_reason(),
        Some("Query exceeded the export row limit")
    );

    sleep(INTERVAL * 5).await;
    assert_eq!(h.api.status_calls("exp-1"), 1);
    assert!(!h.manager.is_exporting());
}

#[tokio::test(start_paused = true)]
async fn test_poll_failure_keeps_last_good_snapshot_and_stops() {
    let h = harness();
    h.api.on_create(job("exp-1", ExportStatus::Pending, 0));
    h.api
        .on_status("exp-1", job("exp-1", ExportStatus::Processing, 40))
        .on_status_failure("exp-1", ScriptedFailure::new(502, "Bad gateway"))
        .on_status("exp-1", completed_job("exp-1", "never-seen.xlsx"));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();
    sleep(ONE_TICK + INTERVAL).await;

    let kept = h.manager.job("exp-1").unwrap();
    assert_eq!(kept.status, ExportStatus::Processing);
    assert_eq!(kept.progress, 40);
    assert!(!h.manager.is_polling("exp-1"));
    assert!(!h.manager.is_exporting());

    sleep(INTERVAL * 10).await;
    assert_eq!(h.api.status_calls("exp-1"), 2);
    assert_eq!(h.manager.job("exp-1").unwrap(), kept);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_job_during_polling_stops_silently() {
    let h = harness();
    h.api.on_create(job("exp-1", ExportStatus::Pending, 0));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();
    sleep(ONE_TICK).await;

    assert_eq!(
        h.manager.job("exp-1").unwrap().status,
        ExportStatus::Pending
    );
    assert!(!h.manager.is_polling("exp-1"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_responses_overlap_and_apply_in_arrival_order() {
    let h = harness();
    h.api.on_create(job("exp-1", ExportStatus::Pending, 0));
    h.api
        .on_status_after(
            "exp-1",
            Duration::from_millis(5000),
            job("exp-1", ExportStatus::Processing, 10),
        )
        .on_status("exp-1", job("exp-1", ExportStatus::Processing, 50));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();

    // Ticks at 2s (slow, lands at 7s), 4s and 6s.
    sleep(Duration::from_millis(6100)).await;
    assert_eq!(h.api.status_calls("exp-1"), 3);
    assert_eq!(h.manager.job("exp-1").unwrap().progress, 50);

    // The stale response from the 2s tick lands last and wins.
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(h.manager.job("exp-1").unwrap().progress, 10);

    sleep(Duration::from_millis(1000)).await;
    assert_eq!(h.api.status_calls("exp-1"), 4);
    assert_eq!(h.manager.job("exp-1").unwrap().progress, 50);
}

#[tokio::test(start_paused = true)]
async fn test_jobs_poll_independently() {
    let h = harness();
    h.api
        .on_create(job("a", ExportStatus::Pending, 0))
        .on_create(job("b", ExportStatus::Pending, 0));
    h.api.on_status("a", completed_job("a", "a.csv"));
    h.api.on_status("b", job("b", ExportStatus::Processing, 20));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();
    sleep(Duration::from_millis(1000)).await;
    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();

    // a ticks at 2s, b at 3s, 5s, 7s.
    sleep(ONE_TICK).await;
    assert_eq!(h.api.status_calls("a"), 1);
    assert_eq!(h.api.status_calls("b"), 1);
    assert_eq!(h.manager.active_pollers(), 1);

    sleep(INTERVAL * 2).await;
    assert_eq!(h.api.status_calls("a"), 1);
    assert_eq!(h.api.status_calls("b"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_wait_until_settled_returns_final_snapshot() {
    let h = harness();
    h.api.on_create(job("exp-1", ExportStatus::Pending, 0));
    h.api
        .on_status("exp-1", job("exp-1", ExportStatus::Processing, 50))
        .on_status("exp-1", completed_job("exp-1", "done.json"));

    h.manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();
    let settled = h.manager.wait_until_settled("exp-1").await.unwrap();

    assert_eq!(settled.status, ExportStatus::Completed);
    assert_eq!(settled.filename.as_deref(), Some("done.json"));
    assert!(h.manager.wait_until_settled("missing").await.is_none());
}
