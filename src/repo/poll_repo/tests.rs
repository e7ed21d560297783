use super::*;
use crate::errors::ApiError;
use crate::models::Role;
use crate::test_utils::{create_test_user, setup_test_db};
use chrono::Duration;

fn poll_dto(options: &[&str], allow_multiple: bool) -> CreatePollDto {
    CreatePollDto {
        title: "Next movie night".to_string(),
        description: None,
        allow_multiple,
        deadline: None,
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

async fn open_test_poll(pool: &DbPool, options: &[&str], allow_multiple: bool) -> PollDetails {
    let details = create_poll(pool, poll_dto(options, allow_multiple)).await.unwrap();
    open_poll(pool, &details.poll.get_id()).await.unwrap();
    details
}

fn option_ids(details: &PollDetails) -> Vec<String> {
    details.options.iter().map(PollOption::get_id).collect()
}

#[tokio::test]
async fn test_create_poll_keeps_option_order() {
    let pool = setup_test_db();

    let details = create_poll(&pool, poll_dto(&["Friday", " Saturday ", "Sunday"], false)).await.unwrap();

    assert_eq!(details.poll.get_status(), PollStatus::Draft);
    let labels: Vec<String> = details.options.iter().map(PollOption::get_label).collect();
    assert_eq!(labels, vec!["Friday", "Saturday", "Sunday"]);

    let stored = get_poll(&pool, &details.poll.get_id()).unwrap().unwrap();
    assert_eq!(stored.options, details.options);
}

#[tokio::test]
async fn test_create_poll_validation() {
    let pool = setup_test_db();
    assert!(create_poll(&pool, poll_dto(&["Only one"], false)).await.is_err());
    assert!(create_poll(&pool, poll_dto(&["Yes", "  "], false)).await.is_err());
}

#[tokio::test]
async fn test_status_lifecycle() {
    let pool = setup_test_db();
    let details = create_poll(&pool, poll_dto(&["Yes", "No"], false)).await.unwrap();
    let id = details.poll.get_id();

    assert!(close_poll(&pool, &id).await.is_err());
    assert_eq!(open_poll(&pool, &id).await.unwrap().get_status(), PollStatus::Open);
    assert!(open_poll(&pool, &id).await.is_err());
    assert_eq!(close_poll(&pool, &id).await.unwrap().get_status(), PollStatus::Closed);

    assert_eq!(list_polls(&pool, Some(PollStatus::Closed)).unwrap().len(), 1);
    assert!(list_polls(&pool, Some(PollStatus::Open)).unwrap().is_empty());

    let err = open_poll(&pool, "missing").await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::NotFound("Poll")));
}

#[tokio::test]
async fn test_vote_replaces_previous_ballot() {
    let pool = setup_test_db();
    let voter = create_test_user(&pool, Role::Member).await;
    let details = open_test_poll(&pool, &["Pizza", "Sushi"], false).await;
    let poll_id = details.poll.get_id();
    let ids = option_ids(&details);

    cast_vote(&pool, &poll_id, &voter, vec![ids[0].clone()]).await.unwrap();
    cast_vote(&pool, &poll_id, &voter, vec![ids[1].clone()]).await.unwrap();

    let results = get_poll_results(&pool, &poll_id).unwrap();
    assert_eq!(results.total_voters, 1);
    assert_eq!(results.options[0].votes, 0);
    assert_eq!(results.options[1].votes, 1);
}

#[tokio::test]
async fn test_single_choice_poll_takes_one_option() {
    let pool = setup_test_db();
    let voter = create_test_user(&pool, Role::Member).await;
    let details = open_test_poll(&pool, &["A", "B"], false).await;

    let err = cast_vote(&pool, &details.poll.get_id(), &voter, option_ids(&details)).await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Validation(_)));
}

#[tokio::test]
async fn test_ballot_validation() {
    let pool = setup_test_db();
    let voter = create_test_user(&pool, Role::Member).await;
    let details = open_test_poll(&pool, &["A", "B", "C"], true).await;
    let other = open_test_poll(&pool, &["X", "Y"], true).await;
    let poll_id = details.poll.get_id();
    let ids = option_ids(&details);

    assert!(cast_vote(&pool, &poll_id, &voter, vec![]).await.is_err());
    assert!(cast_vote(&pool, &poll_id, &voter, vec![ids[0].clone(), ids[0].clone()]).await.is_err());
    assert!(cast_vote(&pool, &poll_id, &voter, vec![option_ids(&other)[0].clone()]).await.is_err());

    let votes = cast_vote(&pool, &poll_id, &voter, vec![ids[0].clone(), ids[2].clone()]).await.unwrap();
    assert_eq!(votes.len(), 2);
}

#[tokio::test]
async fn test_votes_refused_unless_open() {
    let pool = setup_test_db();
    let voter = create_test_user(&pool, Role::Member).await;

    let draft = create_poll(&pool, poll_dto(&["A", "B"], false)).await.unwrap();
    let first = option_ids(&draft)[0].clone();
    assert!(cast_vote(&pool, &draft.poll.get_id(), &voter, vec![first.clone()]).await.is_err());

    open_poll(&pool, &draft.poll.get_id()).await.unwrap();
    close_poll(&pool, &draft.poll.get_id()).await.unwrap();
    assert!(cast_vote(&pool, &draft.poll.get_id(), &voter, vec![first]).await.is_err());
}

#[tokio::test]
async fn test_votes_refused_after_deadline() {
    let pool = setup_test_db();
    let voter = create_test_user(&pool, Role::Member).await;

    let mut dto = poll_dto(&["A", "B"], false);
    dto.deadline = Some(Utc::now() - Duration::hours(1));
    let details = create_poll(&pool, dto).await.unwrap();
    open_poll(&pool, &details.poll.get_id()).await.unwrap();

    let err = cast_vote(&pool, &details.poll.get_id(), &voter, vec![option_ids(&details)[0].clone()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not accepting votes"));
}

#[tokio::test]
async fn test_results_count_distinct_voters() {
    let pool = setup_test_db();
    let details = open_test_poll(&pool, &["Mon", "Tue", "Wed"], true).await;
    let poll_id = details.poll.get_id();
    let ids = option_ids(&details);

    let ann = create_test_user(&pool, Role::Member).await;
    let ben = create_test_user(&pool, Role::Board).await;
    cast_vote(&pool, &poll_id, &ann, vec![ids[0].clone(), ids[1].clone()]).await.unwrap();
    cast_vote(&pool, &poll_id, &ben, vec![ids[1].clone()]).await.unwrap();

    let results = get_poll_results(&pool, &poll_id).unwrap();
    assert_eq!(results.total_voters, 2);
    let counts: Vec<(String, i64)> = results.options.iter().map(|o| (o.label.clone(), o.votes)).collect();
    assert_eq!(counts, vec![("Mon".to_string(), 1), ("Tue".to_string(), 2), ("Wed".to_string(), 0)]);
}

#[tokio::test]
async fn test_delete_poll_removes_votes() {
    let pool = setup_test_db();
    let voter = create_test_user(&pool, Role::Member).await;
    let details = open_test_poll(&pool, &["A", "B"], false).await;
    cast_vote(&pool, &details.poll.get_id(), &voter, vec![option_ids(&details)[0].clone()]).await.unwrap();

    delete_poll(&pool, &details.poll.get_id()).await.unwrap();

    assert!(get_poll(&pool, &details.poll.get_id()).unwrap().is_none());
    assert!(get_poll_results(&pool, &details.poll.get_id()).is_err());
    assert!(delete_poll(&pool, &details.poll.get_id()).await.is_err());
}
