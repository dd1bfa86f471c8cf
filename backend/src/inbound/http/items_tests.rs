//! Tests for the item HTTP handlers.

use super::*;
use crate::domain::Item;
use crate::domain::ports::{
    FixtureItemsCommand, FixtureItemsQuery, ItemsCommand, ItemsQuery, MockItemsCommand,
    MockItemsQuery,
};
use actix_web::http::{Method, StatusCode};
use actix_web::{App, test as actix_test};
use chrono::Utc;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

fn test_app(
    items: Arc<dyn ItemsCommand>,
    items_query: Arc<dyn ItemsQuery>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(items, items_query)))
        .configure(configure)
        .default_service(web::to(route_not_found))
}

async fn send(
    items: Arc<dyn ItemsCommand>,
    items_query: Arc<dyn ItemsQuery>,
    method: Method,
    uri: &str,
) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(items, items_query)).await;
    let request = actix_test::TestRequest::default()
        .method(method)
        .uri(uri)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let status = response.status();
    let body: Value = actix_test::read_body_json(response).await;
    (status, body)
}

fn stored_item(owner: &str, title: &str) -> Item {
    Item::from_new(
        NewItem {
            owner_id: OwnerId::new(owner).expect("owner"),
            title: ItemTitle::new(title).expect("title"),
            description: ItemDescription::new("d").expect("description"),
            cost: Cost::from_cents(1000).expect("cost"),
        },
        ItemId::random(),
        Utc::now(),
    )
}

#[fixture]
fn untouched_command() -> Arc<dyn ItemsCommand> {
    let mut command = MockItemsCommand::new();
    command.expect_insert_item().never();
    command.expect_delete_item().never();
    Arc::new(command)
}

#[rstest]
#[case(Method::GET)]
#[case(Method::POST)]
#[actix_web::test]
async fn insert_parses_parameters_and_returns_item(#[case] method: Method) {
    let mut command = MockItemsCommand::new();
    command
        .expect_insert_item()
        .withf(|item| {
            item.owner_id.as_str() == "u1"
                && item.title.as_str() == "Red Book"
                && item.description.as_str() == "d"
                && item.cost.cents() == 1050
        })
        .times(1)
        .returning(|item| Ok(Item::from_new(item, ItemId::random(), Utc::now())));

    let (status, body) = send(
        Arc::new(command),
        Arc::new(FixtureItemsQuery),
        method,
        "/items/insert/u1/Red%20Book/d/10.5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["item"]["ownerId"], "u1");
    assert_eq!(body["item"]["title"], "Red Book");
    assert_eq!(body["item"]["description"], "d");
    assert_eq!(body["item"]["cost"], "10.50");
    assert!(body["item"]["id"].as_str().is_some());
    assert!(body["item"]["createdAt"].as_str().is_some());
}

#[rstest]
#[case("/items/insert", json!(["ownerId", "title", "description", "cost"]))]
#[case("/items/insert/", json!(["ownerId", "title", "description", "cost"]))]
#[case("/items/insert/u1/Book/d", json!(["cost"]))]
#[case("/items/insert/u1//d/10", json!(["title"]))]
#[case("/items/insert/u1/%20/d/10", json!(["title"]))]
#[actix_web::test]
async fn insert_rejects_missing_parameters(
    untouched_command: Arc<dyn ItemsCommand>,
    #[case] uri: &str,
    #[case] missing: Value,
) {
    let (status, body) = send(
        untouched_command,
        Arc::new(FixtureItemsQuery),
        Method::GET,
        uri,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body["message"], "Missed Parameter(s)");
    assert_eq!(body["details"]["missing"], missing);
}

#[rstest]
#[case("/items/insert/u1/Book/d/ten", "cost")]
#[case("/items/insert/u1/Book/d/-1", "cost")]
#[case("/items/insert/u1/Book/d/1.234", "cost")]
#[case("/items/insert/u1/Book/d/1e3", "cost")]
#[actix_web::test]
async fn insert_rejects_malformed_parameters(
    untouched_command: Arc<dyn ItemsCommand>,
    #[case] uri: &str,
    #[case] field: &str,
) {
    let (status, body) = send(
        untouched_command,
        Arc::new(FixtureItemsQuery),
        Method::GET,
        uri,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body["message"], "Invalid Parameter(s)");
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[case(Method::GET)]
#[case(Method::DELETE)]
#[actix_web::test]
async fn delete_passes_parsed_id(#[case] method: Method) {
    let id = ItemId::random();
    let mut command = MockItemsCommand::new();
    command
        .expect_delete_item()
        .withf(move |candidate| *candidate == id)
        .times(1)
        .returning(|_| Ok(()));

    let (status, body) = send(
        Arc::new(command),
        Arc::new(FixtureItemsQuery),
        method,
        &format!("/items/delete/{id}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK", "message": ITEM_DELETED_MESSAGE}));
}

#[rstest]
#[case("/items/delete", "Missed Parameter")]
#[case("/items/delete/", "Missed Parameter")]
#[case("/items/delete/not-a-uuid", "Invalid Parameter")]
#[actix_web::test]
async fn delete_rejects_missing_or_invalid_id(
    untouched_command: Arc<dyn ItemsCommand>,
    #[case] uri: &str,
    #[case] message: &str,
) {
    let (status, body) = send(
        untouched_command,
        Arc::new(FixtureItemsQuery),
        Method::DELETE,
        uri,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body["message"], message);
}

#[rstest]
#[actix_web::test]
async fn list_all_returns_every_item() {
    let first = stored_item("u1", "a");
    let second = stored_item("u2", "b");
    let listed = vec![first.clone(), second.clone()];
    let mut query = MockItemsQuery::new();
    query
        .expect_list_all()
        .times(1)
        .returning(move || Ok(listed.clone()));

    let (status, body) = send(
        Arc::new(FixtureItemsCommand),
        Arc::new(query),
        Method::GET,
        "/items/all",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    let ids: Vec<&str> = body["items"]
        .as_array()
        .expect("items array")
        .iter()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert_eq!(ids, vec![first.id.to_string(), second.id.to_string()]);
}

#[rstest]
#[case("/items/Jane%20Doe", "Jane Doe")]
#[case("/items/u1/", "u1")]
#[actix_web::test]
async fn list_by_owner_decodes_owner(#[case] uri: &str, #[case] owner: &'static str) {
    let mut query = MockItemsQuery::new();
    query
        .expect_list_by_owner()
        .withf(move |candidate| candidate.as_str() == owner)
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let (status, body) = send(
        Arc::new(FixtureItemsCommand),
        Arc::new(query),
        Method::GET,
        uri,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK", "items": []}));
}

#[rstest]
#[case("/items")]
#[case("/items/")]
#[actix_web::test]
async fn list_by_owner_requires_owner(#[case] uri: &str) {
    let mut query = MockItemsQuery::new();
    query.expect_list_by_owner().never();

    let (status, body) = send(
        Arc::new(FixtureItemsCommand),
        Arc::new(query),
        Method::GET,
        uri,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body["message"], "Missed Parameter");
}

#[rstest]
#[case(Method::GET, "/nope")]
#[case(Method::POST, "/")]
#[case(Method::POST, "/items/all")]
#[case(Method::PUT, "/items/u1")]
#[case(Method::PATCH, "/items/insert/u1/Book/d/10")]
#[case(Method::POST, "/items/delete/00000000-0000-0000-0000-000000000000")]
#[case(Method::GET, "/items/u1/extra")]
#[case(Method::GET, "/items/all/extra")]
#[case(Method::GET, "/items/insert/u1/Book/d/10/extra")]
#[case(Method::GET, "/items/delete/00000000-0000-0000-0000-000000000000/extra")]
#[actix_web::test]
async fn unmatched_routes_return_bad_request_message(
    untouched_command: Arc<dyn ItemsCommand>,
    #[case] method: Method,
    #[case] uri: &str,
) {
    let mut query = MockItemsQuery::new();
    query.expect_list_all().never();
    query.expect_list_by_owner().never();

    let (status, body) = send(untouched_command, Arc::new(query), method, uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Bad request"}));
}

#[rstest]
#[case(
    Error::service_unavailable("item store unavailable"),
    StatusCode::SERVICE_UNAVAILABLE,
    "item store unavailable"
)]
#[case(
    Error::internal("item store error: boom"),
    StatusCode::INTERNAL_SERVER_ERROR,
    "Internal server error"
)]
#[actix_web::test]
async fn store_failures_use_failed_envelope(
    #[case] error: Error,
    #[case] expected_status: StatusCode,
    #[case] expected_message: &str,
) {
    let mut query = MockItemsQuery::new();
    query
        .expect_list_all()
        .times(1)
        .returning(move || Err(error.clone()));

    let (status, body) = send(
        Arc::new(FixtureItemsCommand),
        Arc::new(query),
        Method::GET,
        "/items/all",
    )
    .await;

    assert_eq!(status, expected_status);
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body["message"], expected_message);
}
