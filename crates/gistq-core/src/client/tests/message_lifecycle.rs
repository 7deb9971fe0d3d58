use super::*;
use crate::error::QueueError;
use crate::models::MessageStatus;

fn queue_with_messages(names: &[&str]) -> (GistQueue, QueueRef, Vec<String>) {
    let (queue, _store) = memory_queue();
    queue.create_queue(Some("jobs"), false).expect("create queue");
    let queue_ref = QueueRef::name("jobs");
    let ids = names
        .iter()
        .map(|name| {
            queue
                .create_message(&queue_ref, serde_json::json!({ "task": name }))
                .expect("create message")
                .id
        })
        .collect();
    (queue, queue_ref, ids)
}

#[test]
fn created_message_is_pending_and_unclaimed() {
    let (queue, queue_ref, ids) = queue_with_messages(&["resize"]);
    let messages = queue.queue_content(&queue_ref).expect("content");

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, ids[0]);
    assert_eq!(messages[0].status, MessageStatus::Pending);
    assert!(messages[0].process.is_none());
    assert_eq!(messages[0].content, serde_json::json!({ "task": "resize" }));
}

#[test]
fn list_messages_filters_by_exact_status() {
    let (queue, queue_ref, ids) = queue_with_messages(&["a", "b", "c"]);
    queue
        .update_message(&queue_ref, &ids[1], None, Some(MessageStatus::Complete))
        .expect("complete b");

    let pending = queue
        .list_messages(&queue_ref, Some(MessageStatus::Pending))
        .expect("pending");
    assert_eq!(pending.len(), 2);

    let complete = queue
        .list_messages(&queue_ref, Some(MessageStatus::Complete))
        .expect("complete");
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].id, ids[1]);

    let all = queue.list_messages(&queue_ref, None).expect("all");
    assert_eq!(all.len(), 3);
}

#[test]
fn claim_takes_first_pending_by_position() {
    let (queue, queue_ref, ids) = queue_with_messages(&["a", "b"]);

    let claimed = queue
        .next_message(&queue_ref)
        .expect("claim")
        .expect("message available");
    assert_eq!(claimed.id, ids[0]);
    assert_eq!(claimed.status, MessageStatus::InProgress);
    assert_eq!(claimed.process.as_deref(), Some(queue.worker_id()));

    let messages = queue.queue_content(&queue_ref).expect("content");
    assert_eq!(messages[0].status, MessageStatus::InProgress);
    assert_eq!(messages[1].status, MessageStatus::Pending);
    assert!(messages[1].process.is_none());
}

#[test]
fn claims_drain_the_queue_in_order() {
    let (queue, queue_ref, ids) = queue_with_messages(&["a", "b"]);

    let first = queue.next_message(&queue_ref).expect("claim a");
    let second = queue.next_message(&queue_ref).expect("claim b");
    let third = queue.next_message(&queue_ref).expect("claim empty");

    assert_eq!(first.expect("a").id, ids[0]);
    assert_eq!(second.expect("b").id, ids[1]);
    assert!(third.is_none());
}

#[test]
fn claim_on_queue_without_pending_is_none_not_error() {
    let (queue, queue_ref, ids) = queue_with_messages(&["only"]);
    queue
        .update_message(&queue_ref, &ids[0], None, Some(MessageStatus::Failed))
        .expect("fail message");

    assert!(queue.next_message(&queue_ref).expect("claim").is_none());
}

#[test]
fn update_message_content_only_keeps_status_datetime() {
    let (queue, queue_ref, ids) = queue_with_messages(&["a"]);
    let before = queue.queue_content(&queue_ref).expect("content")[0]
        .status_datetime
        .clone();

    let updated = queue
        .update_message(
            &queue_ref,
            &ids[0],
            Some(serde_json::json!({ "task": "rotated" })),
            None,
        )
        .expect("update");

    assert_eq!(updated.content, serde_json::json!({ "task": "rotated" }));
    assert_eq!(updated.status, MessageStatus::Pending);
    assert_eq!(updated.status_datetime, before);
}

#[test]
fn update_message_status_bumps_status_datetime() {
    let (queue, queue_ref, ids) = queue_with_messages(&["a"]);
    let before = queue.queue_content(&queue_ref).expect("content")[0]
        .status_datetime
        .clone();

    let updated = queue
        .update_message(&queue_ref, &ids[0], None, Some(MessageStatus::Complete))
        .expect("update");

    assert_eq!(updated.status, MessageStatus::Complete);
    assert!(updated.status_datetime >= before);
    assert_ne!(updated.status_datetime, before);
}

#[test]
fn terminal_messages_cannot_return_to_an_active_status() {
    let (queue, queue_ref, ids) = queue_with_messages(&["a"]);
    queue
        .update_message(&queue_ref, &ids[0], None, Some(MessageStatus::Complete))
        .expect("complete");

    for active in [MessageStatus::Pending, MessageStatus::InProgress] {
        let err = queue
            .update_message(&queue_ref, &ids[0], None, Some(active))
            .expect_err("terminal transition must be rejected");
        assert!(matches!(err, QueueError::Validation(_)));
    }

    // Moving between terminal statuses stays allowed.
    queue
        .update_message(&queue_ref, &ids[0], None, Some(MessageStatus::Failed))
        .expect("terminal to terminal");
}

#[test]
fn update_of_unknown_message_is_not_found() {
    let (queue, queue_ref, _ids) = queue_with_messages(&["a"]);
    let err = queue
        .update_message(&queue_ref, "missing-id", None, Some(MessageStatus::Complete))
        .expect_err("must fail");
    assert!(matches!(err, QueueError::NotFound(_)));
}

#[test]
fn unchecked_claim_matches_checked_semantics_for_a_single_writer() {
    let (queue, queue_ref, ids) = queue_with_messages(&["a", "b"]);

    let claimed = queue
        .claim_next_unchecked(&queue_ref)
        .expect("claim")
        .expect("message available");
    assert_eq!(claimed.id, ids[0]);
    assert_eq!(claimed.status, MessageStatus::InProgress);
    assert_eq!(claimed.process.as_deref(), Some(queue.worker_id()));

    queue
        .update_message_unchecked(&queue_ref, &ids[0], None, Some(MessageStatus::Complete))
        .expect("complete");
    queue.claim_next_unchecked(&queue_ref).expect("claim b");
    assert!(queue.claim_next_unchecked(&queue_ref).expect("claim empty").is_none());
}

#[test]
fn purge_removes_only_old_complete_messages() {
    let (queue, queue_ref, ids) = queue_with_messages(&["old-done", "new-done", "old-failed", "work"]);
    queue
        .update_message(&queue_ref, &ids[0], None, Some(MessageStatus::Complete))
        .expect("complete old");
    queue
        .update_message(&queue_ref, &ids[1], None, Some(MessageStatus::Complete))
        .expect("complete new");
    queue
        .update_message(&queue_ref, &ids[2], None, Some(MessageStatus::Failed))
        .expect("fail old");

    let two_days_ago = "2026-08-04T00:00:00.000000Z";
    set_status_datetime(&queue, &queue_ref, &ids[0], two_days_ago);
    set_status_datetime(&queue, &queue_ref, &ids[2], two_days_ago);

    let removed = queue.purge_completed(&queue_ref, 1).expect("purge");
    assert_eq!(removed, 1);

    let remaining = queue
        .queue_content(&queue_ref)
        .expect("content")
        .into_iter()
        .map(|message| message.id)
        .collect::<Vec<_>>();
    assert_eq!(remaining, vec![ids[1].clone(), ids[2].clone(), ids[3].clone()]);
}

#[test]
fn purge_with_nothing_to_remove_returns_zero() {
    let (queue, queue_ref, ids) = queue_with_messages(&["fresh"]);
    queue
        .update_message(&queue_ref, &ids[0], None, Some(MessageStatus::Complete))
        .expect("complete");

    assert_eq!(queue.purge_completed(&queue_ref, 1).expect("purge"), 0);
    assert_eq!(queue.queue_content(&queue_ref).expect("content").len(), 1);
}
