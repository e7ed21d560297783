use super::*;
use crate::errors::ApiError;
use crate::test_utils::setup_test_db;
use chrono::TimeZone;

fn incoming(message_id: &str, in_reply_to: Option<&str>, references: Option<&str>, minute: u32) -> IngestMessageDto {
    IngestMessageDto {
        message_id: message_id.to_string(),
        in_reply_to: in_reply_to.map(str::to_string),
        references: references.map(str::to_string),
        from: "resident@example.org".to_string(),
        to: vec!["board@committee.example".to_string()],
        cc: vec![],
        subject: "Broken washing machine".to_string(),
        body_text: "It leaks again.".to_string(),
        body_html: None,
        sent_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, minute, 0).unwrap(),
        direction: None,
    }
}

#[tokio::test]
async fn test_ingest_starts_thread() {
    let pool = setup_test_db();

    let message = ingest_message(&pool, incoming("<root@example.org>", None, None, 0)).await.unwrap();

    assert_eq!(message.get_message_id(), "root@example.org");
    assert_eq!(message.get_thread_id(), "root@example.org");
    assert_eq!(message.get_direction(), MailDirection::Inbound);
    assert!(!message.get_is_read());
}

#[tokio::test]
async fn test_ingest_is_idempotent() {
    let pool = setup_test_db();

    let first = ingest_message(&pool, incoming("<dup@example.org>", None, None, 0)).await.unwrap();
    let second = ingest_message(&pool, incoming("dup@example.org", None, None, 5)).await.unwrap();

    assert_eq!(first.get_id(), second.get_id());
    assert_eq!(list_threads(&pool).unwrap()[0].message_count, 1);
}

#[tokio::test]
async fn test_ingest_rejects_empty_message_id() {
    let pool = setup_test_db();
    let err = ingest_message(&pool, incoming(" <> ", None, None, 0)).await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Validation(_)));
}

#[tokio::test]
async fn test_replies_join_parent_thread() {
    let pool = setup_test_db();

    ingest_message(&pool, incoming("<a@x>", None, None, 0)).await.unwrap();
    let b = ingest_message(&pool, incoming("<b@x>", Some("<a@x>"), Some("<a@x>"), 1)).await.unwrap();
    let c = ingest_message(&pool, incoming("<c@x>", Some("<b@x>"), Some("<a@x> <b@x>"), 2)).await.unwrap();

    assert_eq!(b.get_thread_id(), "a@x");
    assert_eq!(c.get_thread_id(), "a@x");
    assert_eq!(c.get_references(), &["a@x".to_string(), "b@x".to_string()]);

    let thread = get_thread(&pool, "a@x").unwrap();
    let ids: Vec<String> = thread.iter().map(MailMessage::get_message_id).collect();
    assert_eq!(ids, vec!["a@x", "b@x", "c@x"]);
}

#[tokio::test]
async fn test_out_of_order_reply_uses_root_reference() {
    let pool = setup_test_db();

    // The reply arrives before its root; both must end up in one thread
    let reply = ingest_message(&pool, incoming("<r2@x>", Some("<r1@x>"), Some("<r1@x>"), 5)).await.unwrap();
    let root = ingest_message(&pool, incoming("<r1@x>", None, None, 0)).await.unwrap();

    assert_eq!(reply.get_thread_id(), "r1@x");
    assert_eq!(root.get_thread_id(), "r1@x");
}

#[tokio::test]
async fn test_list_threads_summary() {
    let pool = setup_test_db();

    ingest_message(&pool, incoming("<old@x>", None, None, 0)).await.unwrap();
    let mut reply = incoming("<old-reply@x>", Some("<old@x>"), None, 30);
    reply.subject = "Re: Broken washing machine".to_string();
    let reply = ingest_message(&pool, reply).await.unwrap();
    let mut other = incoming("<new@x>", None, None, 10);
    other.subject = "Party".to_string();
    ingest_message(&pool, other).await.unwrap();

    set_message_read(&pool, &reply.get_id(), true).await.unwrap();

    let threads = list_threads(&pool).unwrap();
    assert_eq!(threads.len(), 2);
    // The washing machine thread had the latest activity
    assert_eq!(threads[0].thread_id, "old@x");
    assert_eq!(threads[0].subject, "Broken washing machine");
    assert_eq!(threads[0].message_count, 2);
    assert_eq!(threads[0].unread_count, 1);
    assert_eq!(threads[0].last_message_at, Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap());
    assert_eq!(threads[1].subject, "Party");
}

#[tokio::test]
async fn test_get_unknown_thread() {
    let pool = setup_test_db();
    let err = get_thread(&pool, "nothing@x").unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::NotFound("Thread")));
}

#[tokio::test]
async fn test_reply_draft_is_prefilled() {
    let pool = setup_test_db();
    let parent = ingest_message(&pool, incoming("<p@x>", None, None, 0)).await.unwrap();

    let dto = CreateDraftDto {
        reply_to_message_id: Some(parent.get_id()),
        body_text: "We will send someone.".to_string(),
        ..Default::default()
    };
    let draft = create_draft(&pool, dto).await.unwrap();

    assert_eq!(draft.get_to_addresses(), &["resident@example.org".to_string()]);
    assert_eq!(draft.get_subject(), "Re: Broken washing machine");
    assert_eq!(draft.get_thread_id().as_deref(), Some("p@x"));
}

#[tokio::test]
async fn test_draft_crud() {
    let pool = setup_test_db();

    let draft = create_draft(&pool, CreateDraftDto { subject: "Agenda".to_string(), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(list_drafts(&pool).unwrap().len(), 1);

    let dto = UpdateDraftDto { to: Some(vec!["all@example.org".to_string()]), ..Default::default() };
    let updated = update_draft(&pool, &draft.get_id(), dto).await.unwrap();
    assert_eq!(updated.get_to_addresses(), &["all@example.org".to_string()]);
    assert_eq!(updated.get_subject(), "Agenda");

    delete_draft(&pool, &draft.get_id()).await.unwrap();
    assert!(get_draft(&pool, &draft.get_id()).unwrap().is_none());
    assert!(delete_draft(&pool, &draft.get_id()).await.is_err());
}

#[tokio::test]
async fn test_send_draft_requires_recipient_and_subject() {
    let pool = setup_test_db();

    let no_recipient = create_draft(&pool, CreateDraftDto { subject: "Hi".to_string(), ..Default::default() })
        .await
        .unwrap();
    let err = send_draft(&pool, &no_recipient.get_id(), "board@x", "committee.example").await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Validation(_)));

    let no_subject = create_draft(&pool, CreateDraftDto { to: vec!["a@x".to_string()], ..Default::default() })
        .await
        .unwrap();
    assert!(send_draft(&pool, &no_subject.get_id(), "board@x", "committee.example").await.is_err());

    // Failed sends keep the drafts
    assert_eq!(list_drafts(&pool).unwrap().len(), 2);
}

#[tokio::test]
async fn test_send_reply_draft() {
    let pool = setup_test_db();
    ingest_message(&pool, incoming("<root@x>", None, None, 0)).await.unwrap();
    let parent = ingest_message(&pool, incoming("<second@x>", Some("<root@x>"), Some("<root@x>"), 1)).await.unwrap();

    let draft = create_draft(&pool, CreateDraftDto {
        reply_to_message_id: Some(parent.get_id()),
        body_text: "Fixed tomorrow.".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();

    let sent = send_draft(&pool, &draft.get_id(), "board@committee.example", "committee.example").await.unwrap();

    assert_eq!(sent.get_direction(), MailDirection::Outbound);
    assert!(sent.get_is_read());
    assert!(sent.get_message_id().ends_with("@committee.example"));
    assert_eq!(sent.get_in_reply_to().as_deref(), Some("second@x"));
    assert_eq!(sent.get_references(), &["root@x".to_string(), "second@x".to_string()]);
    assert_eq!(sent.get_thread_id(), "root@x");

    assert!(get_draft(&pool, &draft.get_id()).unwrap().is_none());
    assert_eq!(get_thread(&pool, "root@x").unwrap().len(), 3);
}

#[tokio::test]
async fn test_send_new_draft_starts_thread() {
    let pool = setup_test_db();
    let draft = create_draft(&pool, CreateDraftDto {
        to: vec!["members@x".to_string()],
        subject: "General assembly".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();

    let sent = send_draft(&pool, &draft.get_id(), "board@x", "committee.example").await.unwrap();

    assert_eq!(sent.get_thread_id(), sent.get_message_id());
    assert!(sent.get_in_reply_to().is_none());
    assert!(sent.get_references().is_empty());
}
