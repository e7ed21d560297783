use super::*;
use crate::errors::ApiError;
use crate::models::Role;
use crate::test_utils::setup_test_db;

fn user_dto(name: &str, email: &str, role: Role) -> CreateUserDto {
    CreateUserDto { name: name.to_string(), email: email.to_string(), role }
}

#[tokio::test]
async fn test_create_and_get_user() {
    let pool = setup_test_db();

    let user = create_user(&pool, user_dto("Sam", " Sam@Example.org ", Role::Board)).await.unwrap();
    assert_eq!(user.get_email(), "sam@example.org");

    let stored = get_user(&pool, &user.get_id()).unwrap().unwrap();
    assert_eq!(stored.get_role(), Role::Board);
    assert!(get_user(&pool, "nobody").unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let pool = setup_test_db();
    create_user(&pool, user_dto("Sam", "sam@example.org", Role::Member)).await.unwrap();

    let err = create_user(&pool, user_dto("Other Sam", "SAM@example.org", Role::Guest)).await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_user_fields() {
    let pool = setup_test_db();
    assert!(create_user(&pool, user_dto("", "a@b", Role::Guest)).await.is_err());
    assert!(create_user(&pool, user_dto("Kim", "not-an-address", Role::Guest)).await.is_err());
}

#[tokio::test]
async fn test_list_users_by_name() {
    let pool = setup_test_db();
    create_user(&pool, user_dto("Zoe", "zoe@x.org", Role::Member)).await.unwrap();
    create_user(&pool, user_dto("Ada", "ada@x.org", Role::Admin)).await.unwrap();

    let names: Vec<String> = list_users(&pool).unwrap().iter().map(User::get_name).collect();
    assert_eq!(names, vec!["Ada", "Zoe"]);
}
