use super::*;
use crate::test_utils::setup_test_db;

fn faq_dto(question: &str, sort_order: Option<i32>) -> CreateFaqDto {
    CreateFaqDto {
        question: question.to_string(),
        answer: "Ask the board.".to_string(),
        sort_order,
    }
}

#[tokio::test]
async fn test_sort_order_defaults_to_end() {
    let pool = setup_test_db();

    let first = create_faq(&pool, faq_dto("Where is the key?", None)).await.unwrap();
    assert_eq!(first.get_sort_order(), 0);

    create_faq(&pool, faq_dto("When is the meeting?", Some(10))).await.unwrap();
    let last = create_faq(&pool, faq_dto("Who pays the rent?", None)).await.unwrap();
    assert_eq!(last.get_sort_order(), 11);
}

#[tokio::test]
async fn test_sort_order_after_maximum_is_rejected() {
    let pool = setup_test_db();
    create_faq(&pool, faq_dto("Last possible", Some(i32::MAX))).await.unwrap();

    let err = create_faq(&pool, faq_dto("One more", None)).await.unwrap_err();

    assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::Invalid(_))));
    assert_eq!(list_faqs(&pool).unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_orders_by_sort_order() {
    let pool = setup_test_db();

    create_faq(&pool, faq_dto("B", Some(2))).await.unwrap();
    create_faq(&pool, faq_dto("A", Some(1))).await.unwrap();
    create_faq(&pool, faq_dto("C", Some(2))).await.unwrap();

    let questions: Vec<String> = list_faqs(&pool).unwrap().iter().map(Faq::get_question).collect();
    assert_eq!(questions, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_blank_fields_are_rejected() {
    let pool = setup_test_db();

    assert!(create_faq(&pool, faq_dto("  ", None)).await.is_err());

    let faq = create_faq(&pool, faq_dto("Question", None)).await.unwrap();
    let dto = UpdateFaqDto { answer: Some(String::new()), ..Default::default() };
    assert!(update_faq(&pool, &faq.get_id(), dto).await.is_err());
}

#[tokio::test]
async fn test_update_and_delete_faq() {
    let pool = setup_test_db();
    let faq = create_faq(&pool, faq_dto("Old question", None)).await.unwrap();

    let dto = UpdateFaqDto { question: Some("New question".to_string()), sort_order: Some(5), ..Default::default() };
    let updated = update_faq(&pool, &faq.get_id(), dto).await.unwrap();
    assert_eq!(updated.get_question(), "New question");
    assert_eq!(updated.get_answer(), "Ask the board.");
    assert_eq!(updated.get_sort_order(), 5);

    delete_faq(&pool, &faq.get_id()).await.unwrap();
    assert!(get_faq(&pool, &faq.get_id()).unwrap().is_none());
    assert!(delete_faq(&pool, &faq.get_id()).await.is_err());
}
