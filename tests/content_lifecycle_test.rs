// Content request lifecycle scenario tests: submission debits, worker
// write-backs, cancellation filtering, resubmission and regeneration

mod common;

use common::{harness, signup};
use draftdesk_backend::models::content::{ContentParams, RequestStatus};
use draftdesk_backend::utils::service_error::ServiceError;

fn social() -> ContentParams {
    ContentParams::Social {
        platform: "linkedin".to_string(),
    }
}

fn blog(word_count: u32) -> ContentParams {
    ContentParams::Blog {
        keywords: vec!["rust".to_string()],
        word_count,
    }
}

#[tokio::test]
async fn test_submit_debits_and_creates_requested_record() {
    let h = harness();
    let user = signup(&h.store, "writer@example.com").await;

    let record = h
        .content
        .submit(&user.id, "announcement post".to_string(), social())
        .await
        .expect("submit");

    assert_eq!(record.status, RequestStatus::Requested);
    assert_eq!(record.output, None);

    // Social post costs 2: 10 - 2 = 8
    assert_eq!(h.store.raw_user(&user.id).await.unwrap().tokens, 8);
    assert_eq!(h.dispatcher.dispatch_count().await, 1);
}

#[tokio::test]
async fn test_word_count_pricing_on_submission() {
    let h = harness();
    let user = signup(&h.store, "blogger@example.com").await;

    h.content
        .submit(&user.id, "long read".to_string(), blog(1200))
        .await
        .expect("submit");

    // 1200 words = 2 whole 500-word units
    assert_eq!(h.store.raw_user(&user.id).await.unwrap().tokens, 8);
}

#[tokio::test]
async fn test_worker_completion_does_not_touch_balance() {
    let h = harness();
    let user = signup(&h.store, "complete@example.com").await;

    let record = h
        .content
        .submit(&user.id, "post".to_string(), social())
        .await
        .expect("submit");

    // External worker writes back out of band
    h.store
        .worker_write_back(&record.id, RequestStatus::Completed, Some("X".to_string()))
        .await;

    let fetched = h.content.get(&user, &record.id).await.expect("get");
    assert_eq!(fetched.status, RequestStatus::Completed);
    assert_eq!(fetched.output.as_deref(), Some("X"));

    // Already debited at creation
    assert_eq!(h.store.raw_user(&user.id).await.unwrap().tokens, 8);
}

#[tokio::test]
async fn test_cancelled_items_excluded_from_default_listing() {
    let h = harness();
    let user = signup(&h.store, "lists@example.com").await;

    let keep = h
        .content
        .submit(&user.id, "keep".to_string(), social())
        .await
        .expect("submit");
    let discarded = h
        .content
        .submit(&user.id, "drop".to_string(), social())
        .await
        .expect("submit");

    let cancelled = h
        .content
        .cancel(&user, &discarded.id)
        .await
        .expect("cancel");
    assert_eq!(cancelled.status, RequestStatus::Cancelled);

    // Default listing hides Cancelled
    let visible = h.content.list(&user, None).await.expect("list");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, keep.id);

    // An explicit filter still reaches them
    let cancelled_only = h
        .content
        .list(&user, Some(RequestStatus::Cancelled))
        .await
        .expect("list");
    assert_eq!(cancelled_only.len(), 1);
    assert_eq!(cancelled_only[0].id, discarded.id);
}

#[tokio::test]
async fn test_cancel_allowed_only_before_delivery() {
    let h = harness();
    let user = signup(&h.store, "cancel@example.com").await;

    let record = h
        .content
        .submit(&user.id, "post".to_string(), social())
        .await
        .expect("submit");

    // In Progress can still be cancelled
    h.store
        .worker_write_back(&record.id, RequestStatus::InProgress, None)
        .await;
    h.content.cancel(&user, &record.id).await.expect("cancel");

    // Completed cannot
    let done = h
        .content
        .submit(&user.id, "another".to_string(), social())
        .await
        .expect("submit");
    h.store
        .worker_write_back(&done.id, RequestStatus::Completed, Some("out".to_string()))
        .await;

    let result = h.content.cancel(&user, &done.id).await;
    assert!(matches!(
        result,
        Err(ServiceError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_resubmit_clears_output_and_preserves_edits_without_new_debit() {
    let h = harness();
    let user = signup(&h.store, "resubmit@example.com").await;

    let record = h
        .content
        .submit(&user.id, "first draft".to_string(), social())
        .await
        .expect("submit");
    let balance_after_submit = h.store.raw_user(&user.id).await.unwrap().tokens;

    h.store
        .worker_write_back(
            &record.id,
            RequestStatus::Failed,
            Some("partial garbage".to_string()),
        )
        .await;

    let resubmitted = h
        .content
        .resubmit(
            &user,
            &record.id,
            Some("second draft".to_string()),
            None,
        )
        .await
        .expect("resubmit");

    assert_eq!(resubmitted.status, RequestStatus::Requested);
    assert_eq!(resubmitted.output, None);
    assert_eq!(resubmitted.details, "second draft");

    // The original debit paid for undelivered work; no second charge
    assert_eq!(
        h.store.raw_user(&user.id).await.unwrap().tokens,
        balance_after_submit
    );
    assert_eq!(h.dispatcher.dispatch_count().await, 2);
}

#[tokio::test]
async fn test_resubmit_rejected_unless_failed() {
    let h = harness();
    let user = signup(&h.store, "resubmit2@example.com").await;

    let record = h
        .content
        .submit(&user.id, "post".to_string(), social())
        .await
        .expect("submit");

    let result = h.content.resubmit(&user, &record.id, None, None).await;
    assert!(matches!(
        result,
        Err(ServiceError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_save_changes_edits_in_place_without_status_change() {
    let h = harness();
    let user = signup(&h.store, "editor@example.com").await;

    let record = h
        .content
        .submit(&user.id, "post".to_string(), social())
        .await
        .expect("submit");
    h.store
        .worker_write_back(&record.id, RequestStatus::Completed, Some("v1".to_string()))
        .await;

    let edited = h
        .content
        .save_changes(
            &user,
            &record.id,
            None,
            Some("v1 with fixes".to_string()),
        )
        .await
        .expect("save changes");

    assert_eq!(edited.status, RequestStatus::Completed);
    assert_eq!(edited.output.as_deref(), Some("v1 with fixes"));
    // No tokens involved in an in-place edit
    assert_eq!(h.store.raw_user(&user.id).await.unwrap().tokens, 8);
}

#[tokio::test]
async fn test_regenerate_debits_again_and_reenters_pipeline() {
    let h = harness();
    let user = signup(&h.store, "regen@example.com").await;

    let record = h
        .content
        .submit(&user.id, "post".to_string(), social())
        .await
        .expect("submit");
    h.store
        .worker_write_back(&record.id, RequestStatus::Completed, Some("v1".to_string()))
        .await;

    let regenerated = h
        .content
        .regenerate(&user.id, &record.id, None, None)
        .await
        .expect("regenerate");

    assert_eq!(regenerated.status, RequestStatus::Requested);
    assert_eq!(regenerated.output, None);

    // 10 - 2 (submit) - 2 (regenerate) = 6
    assert_eq!(h.store.raw_user(&user.id).await.unwrap().tokens, 6);
    assert_eq!(h.dispatcher.dispatch_count().await, 2);
}

#[tokio::test]
async fn test_insufficient_tokens_rejects_before_any_record_exists() {
    let h = harness();
    let user = signup(&h.store, "broke@example.com").await;

    // Drain the balance with an expensive article: 5000 words = 10 tokens
    h.content
        .submit(&user.id, "everything".to_string(), blog(5000))
        .await
        .expect("submit");

    let result = h
        .content
        .submit(&user.id, "one more".to_string(), social())
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::InsufficientTokens { required: 2, available: 0 })
    ));

    // Only the first record exists and the balance is unchanged by the
    // rejected attempt
    assert_eq!(h.content.list(&user, None).await.unwrap().len(), 1);
    assert_eq!(h.store.raw_user(&user.id).await.unwrap().tokens, 0);
}

#[tokio::test]
async fn test_dispatch_failure_leaves_debit_and_requested_record() {
    let h = harness();
    let user = signup(&h.store, "orphan@example.com").await;

    h.dispatcher.set_failing(true);
    let result = h
        .content
        .submit(&user.id, "post".to_string(), social())
        .await;
    assert!(matches!(result, Err(ServiceError::DispatchFailed)));

    // Accepted inconsistency: the debit and the orphaned Requested record
    // both remain, surfaced to the user as a failure
    assert_eq!(h.store.raw_user(&user.id).await.unwrap().tokens, 8);
    let records = h.content.list(&user, None).await.expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, RequestStatus::Requested);
}

#[tokio::test]
async fn test_foreign_records_read_as_missing() {
    let h = harness();
    let owner = signup(&h.store, "owner@example.com").await;
    let other = signup(&h.store, "other@example.com").await;

    let record = h
        .content
        .submit(&owner.id, "private".to_string(), social())
        .await
        .expect("submit");

    let result = h.content.get(&other, &record.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound)));
}
