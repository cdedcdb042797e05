mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_client_normalizes_and_defaults() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/clients",
            json!({
                "name": "  Maria Santos ",
                "email": "Maria.Santos@Email.com",
                "document": "987.654.321-02",
                "phone": "",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let client = &body["data"];
    assert_eq!(client["name"], "Maria Santos");
    assert_eq!(client["email"], "maria.santos@email.com");
    assert_eq!(client["status"], "active");
    assert!(client["phone"].is_null());
}

#[tokio::test]
async fn duplicate_email_or_document_conflicts() {
    let app = TestApp::new().await;
    app.create_client("joao").await;

    let (status, body) = app
        .post(
            "/api/clients",
            json!({"name": "Other", "email": "joao@example.com", "document": "NEW-DOC"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .post(
            "/api/clients",
            json!({"name": "Other", "email": "other@example.com", "document": "DOC-joao"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/clients",
            json!({"name": "Pedro", "email": "not-an-email", "document": "X1"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn list_searches_and_paginates() {
    let app = TestApp::new().await;
    for tag in ["ana", "bruno", "carla", "diego", "elisa"] {
        app.create_client(tag).await;
    }

    let (status, body) = app.get("/api/clients?limit=2&page=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/clients?search=carla").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["email"], "carla@example.com");

    let (_, body) = app.get("/api/clients?search=DOC-e").await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get("/api/clients?search=%25").await;
    assert_eq!(body["total"], 0);
    let (_, body) = app.get("/api/clients?search=DOC_e").await;
    assert_eq!(body["total"], 0);

    let (status, body) = app.get("/api/clients?page=9223372036854775807").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn students_route_is_an_alias() {
    let app = TestApp::new().await;
    let client = app.create_client("ana").await;
    let id = client["id"].as_str().unwrap();

    let (status, body) = app.get(&format!("/api/students/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ana@example.com");

    let (_, body) = app.get("/api/students").await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn update_and_delete_client() {
    let app = TestApp::new().await;
    let client = app.create_client("ana").await;
    let id = client["id"].as_str().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/clients/{id}"),
            json!({"status": "inactive", "address": "Rua D, 10"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["address"], "Rua D, 10");
    assert_eq!(body["data"]["name"], "Client ana");

    let (status, _) = app.delete(&format!("/api/clients/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/clients/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn client_with_rentals_cannot_be_deleted() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let client = app.create_client("ana").await;
    let (status, _) = app
        .create_rental(&locker, &client, "2024-01-01", "2024-03-01")
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = client["id"].as_str().unwrap();
    let (status, body) = app.delete(&format!("/api/clients/{id}")).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = app.get(&format!("/api/clients/{id}/rentals")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["locker"]["number"], "A-1");

    let (status, _) = app
        .get("/api/clients/00000000-0000-0000-0000-000000000000/rentals")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
