mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn create_and_fetch_locker() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300.00").await;

    assert_eq!(locker["number"], "A-1");
    assert_eq!(locker["status"], "available");
    assert_eq!(locker["size"], "medium");
    assert_eq!(decimal(&locker["monthlyPrice"]), dec!(300));

    let id = locker["id"].as_str().unwrap();
    let (status, body) = app.get(&format!("/api/lockers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], locker["id"]);
}

#[tokio::test]
async fn prices_keep_two_decimal_places() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "199.90").await;
    assert_eq!(locker["monthlyPrice"], "199.90");

    let id = locker["id"].as_str().unwrap();
    let (_, body) = app.get(&format!("/api/lockers/{id}")).await;
    assert_eq!(body["data"]["monthlyPrice"], "199.90");

    let (_, body) = app.get("/api/lockers").await;
    assert_eq!(body["data"][0]["monthlyPrice"], "199.90");

    for price in ["12345678901234.123456789", "100000000", "0.005"] {
        let (status, body) = app
            .post(
                "/api/lockers",
                json!({"number": "A-2", "location": "Bloco A", "size": "small", "monthlyPrice": price}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price {price}: {body}");
    }

    let (status, _) = app
        .put(&format!("/api/lockers/{id}"), json!({"monthlyPrice": "1.999"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/lockers").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["monthlyPrice"], "199.90");
}

#[tokio::test]
async fn duplicate_number_is_a_conflict() {
    let app = TestApp::new().await;
    app.create_locker("A-1", "300").await;

    let (status, body) = app
        .post(
            "/api/lockers",
            json!({"number": "A-1", "location": "Elsewhere", "size": "small", "monthlyPrice": "100"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("A-1"));
}

#[tokio::test]
async fn invalid_payloads_are_rejected_with_the_envelope() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/lockers",
            json!({"number": "", "location": "Bloco A", "size": "small", "monthlyPrice": "100"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .post(
            "/api/lockers",
            json!({"number": "A-9", "location": "Bloco A", "size": "huge", "monthlyPrice": "100"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/lockers",
            json!({"number": "A-9", "location": "Bloco A", "size": "small", "monthlyPrice": "-1"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/lockers",
            json!({"number": "A-9", "location": "Bloco A", "size": "small", "monthlyPrice": "1", "status": "rented"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get("/api/lockers/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/lockers/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/lockers/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_and_orders_by_number() {
    let app = TestApp::new().await;
    for number in ["B-2", "A-1", "A-3", "B-1"] {
        app.create_locker(number, "250").await;
    }
    let maintenance = app.create_locker("C-1", "250").await;
    let id = maintenance["id"].as_str().unwrap();
    let (status, _) = app
        .put(&format!("/api/lockers/{id}"), json!({"status": "maintenance"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/lockers").await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["A-1", "A-3", "B-1", "B-2", "C-1"]);
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["totalPages"], 1);

    let (_, body) = app.get("/api/lockers?status=maintenance").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["number"], "C-1");

    let (_, body) = app.get("/api/lockers?search=B-").await;
    assert_eq!(body["total"], 2);

    let (status, _) = app.get("/api/lockers?status=broken").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // LIKE wildcards in the search term are matched literally
    for term in ["%25", "_", "A_1"] {
        let (status, body) = app.get(&format!("/api/lockers?search={term}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0, "search {term}");
    }

    let (status, body) = app
        .get("/api/lockers?page=9223372036854775807&limit=10")
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total"], 5);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (_, body) = app.get("/api/lockers/available").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    let (_, body) = app.get("/api/lockers/stats").await;
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["available"], 4);
    assert_eq!(body["data"]["maintenance"], 1);
    assert_eq!(body["data"]["rented"], 0);
}

#[tokio::test]
async fn update_is_partial_and_repeatable() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let id = locker["id"].as_str().unwrap();
    let patch = json!({"location": "Bloco Z", "monthlyPrice": "320.50"});

    let (status, first) = app.put(&format!("/api/lockers/{id}"), patch.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = app.put(&format!("/api/lockers/{id}"), patch).await;
    assert_eq!(status, StatusCode::OK);

    for body in [&first, &second] {
        assert_eq!(body["data"]["number"], "A-1");
        assert_eq!(body["data"]["location"], "Bloco Z");
        assert_eq!(decimal(&body["data"]["monthlyPrice"]), dec!(320.50));
        assert_eq!(body["data"]["status"], "available");
    }
}

#[tokio::test]
async fn rented_status_is_reserved_for_rentals() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let id = locker["id"].as_str().unwrap();

    let (status, body) = app
        .put(&format!("/api/lockers/{id}"), json!({"status": "rented"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(app.locker_status(&locker["id"]).await, "available");
}

#[tokio::test]
async fn locker_with_active_rental_keeps_its_status_and_cannot_be_deleted() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let client = app.create_client("ana").await;
    let (status, _) = app
        .create_rental(&locker, &client, "2024-01-01", "2024-02-01")
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = locker["id"].as_str().unwrap();
    let (status, _) = app
        .put(&format!("/api/lockers/{id}"), json!({"status": "maintenance"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.locker_status(&locker["id"]).await, "rented");

    let (status, _) = app.delete(&format!("/api/lockers/{id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.get(&format!("/api/lockers/{id}/rentals")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_removes_an_unreferenced_locker() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let id = locker["id"].as_str().unwrap();

    let (status, body) = app.delete(&format!("/api/lockers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.get(&format!("/api/lockers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/lockers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/lockers",
            Some(json!(["not", "an", "object"])),
            Some(app.token()),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
