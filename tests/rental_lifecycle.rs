mod common;

use axum::http::StatusCode;
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn id_of(value: &Value) -> &str {
    value["id"].as_str().expect("id string")
}

#[tokio::test]
async fn end_to_end_rental_flow() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let client = app.create_client("joao").await;

    let (status, body) = app
        .create_rental(&locker, &client, "2024-01-01", "2024-04-01")
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let rental = &body["data"];
    assert_eq!(rental["status"], "active");
    assert_eq!(rental["paymentStatus"], "pending");
    assert_eq!(rental["totalAmount"], "1200.00");
    assert_eq!(rental["monthlyPrice"], "300.00");
    assert_eq!(rental["locker"]["number"], "A-1");
    assert_eq!(rental["client"]["email"], "joao@example.com");

    assert_eq!(app.locker_status(&locker["id"]).await, "rented");

    let (status, _) = app.delete(&format!("/api/rentals/{}", id_of(rental))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.locker_status(&locker["id"]).await, "available");

    let (status, _) = app.get(&format!("/api/rentals/{}", id_of(rental))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_follows_the_month_rule() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get("/api/rentals/quote?startDate=2024-01-15&endDate=2024-03-15&monthlyPrice=100")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["months"], 3);
    assert_eq!(decimal(&body["data"]["totalAmount"]), dec!(300));

    let (_, body) = app
        .get("/api/rentals/quote?startDate=2024-01-15&endDate=2024-03-14&monthlyPrice=100")
        .await;
    assert_eq!(body["data"]["months"], 2);

    let (_, body) = app
        .get("/api/rentals/quote?startDate=2024-05-01&endDate=2024-05-01&monthlyPrice=100")
        .await;
    assert_eq!(body["data"]["months"], 0);
    assert_eq!(decimal(&body["data"]["totalAmount"]), dec!(0));

    let (status, _) = app
        .get("/api/rentals/quote?startDate=2024-05-01&endDate=2024-04-01&monthlyPrice=100")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/rentals/quote?startDate=2024-05-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_rejects_prices_the_ledger_cannot_store() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get("/api/rentals/quote?startDate=2024-01-15&endDate=2024-03-15&monthlyPrice=199.90")
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["totalAmount"], "599.70");

    for price in ["79228162514264337593543950335", "100000000", "10.001"] {
        let (status, body) = app
            .get(&format!(
                "/api/rentals/quote?startDate=2024-01-01&endDate=2030-01-01&monthlyPrice={price}"
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price {price}: {body}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn unknown_references_write_nothing() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let client = app.create_client("ana").await;
    let missing = "00000000-0000-0000-0000-000000000000";

    for (locker_id, client_id) in [
        (missing, id_of(&client)),
        (id_of(&locker), missing),
    ] {
        let (status, body) = app
            .post(
                "/api/rentals",
                json!({
                    "lockerId": locker_id,
                    "clientId": client_id,
                    "startDate": "2024-01-01",
                    "endDate": "2024-02-01",
                    "monthlyPrice": "300",
                    "totalAmount": "300",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["success"], false);
    }

    let (_, body) = app.get("/api/rentals").await;
    assert_eq!(body["total"], 0);
    assert_eq!(app.locker_status(&locker["id"]).await, "available");
}

#[tokio::test]
async fn invalid_rental_payloads_are_rejected() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let client = app.create_client("ana").await;

    let base = json!({
        "lockerId": locker["id"],
        "clientId": client["id"],
        "startDate": "2024-03-01",
        "endDate": "2024-04-01",
        "monthlyPrice": "300",
        "totalAmount": "300",
    });

    let cases = [
        ("endDate", json!("2024-02-01")),
        ("monthlyPrice", json!("0")),
        ("totalAmount", json!("-5")),
        ("status", json!("completed")),
        ("startDate", json!("yesterday")),
    ];
    for (field, value) in cases {
        let mut payload = base.clone();
        payload[field] = value;
        let (status, body) = app.post("/api/rentals", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}: {body}");
    }

    let mut missing = base.clone();
    missing.as_object_mut().unwrap().remove("totalAmount");
    let (status, _) = app.post("/api/rentals", missing).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.locker_status(&locker["id"]).await, "available");
}

#[tokio::test]
async fn second_active_rental_on_a_locker_conflicts() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let ana = app.create_client("ana").await;
    let bia = app.create_client("bia").await;

    let (status, _) = app
        .create_rental(&locker, &ana, "2024-01-01", "2024-02-01")
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .create_rental(&locker, &bia, "2024-01-01", "2024-02-01")
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (_, body) = app.get("/api/rentals").await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn maintenance_locker_cannot_be_rented() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let client = app.create_client("ana").await;
    let (status, _) = app
        .put(
            &format!("/api/lockers/{}", id_of(&locker)),
            json!({"status": "maintenance"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .create_rental(&locker, &client, "2024-01-01", "2024-02-01")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.locker_status(&locker["id"]).await, "maintenance");
}

#[tokio::test]
async fn leaving_and_reentering_active_moves_the_locker() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let ana = app.create_client("ana").await;
    let bia = app.create_client("bia").await;

    let (_, body) = app
        .create_rental(&locker, &ana, "2024-01-01", "2024-02-01")
        .await;
    let first = body["data"].clone();
    let first_uri = format!("/api/rentals/{}", id_of(&first));

    let (status, body) = app.put(&first_uri, json!({"status": "completed"})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(app.locker_status(&locker["id"]).await, "available");

    let (status, body) = app
        .create_rental(&locker, &bia, "2024-02-01", "2024-03-01")
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    // the locker is taken again, so the old rental cannot come back
    let (status, _) = app.put(&first_uri, json!({"status": "active"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.locker_status(&locker["id"]).await, "rented");

    // deleting the completed rental leaves the newer one in charge
    let (status, _) = app.delete(&first_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.locker_status(&locker["id"]).await, "rented");
}

#[tokio::test]
async fn moving_an_active_rental_swaps_lockers() {
    let app = TestApp::new().await;
    let a1 = app.create_locker("A-1", "300").await;
    let a2 = app.create_locker("A-2", "300").await;
    let client = app.create_client("ana").await;

    let (_, body) = app
        .create_rental(&a1, &client, "2024-01-01", "2024-02-01")
        .await;
    let uri = format!("/api/rentals/{}", id_of(&body["data"]));

    let (status, body) = app.put(&uri, json!({"lockerId": a2["id"]})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["locker"]["number"], "A-2");
    assert_eq!(app.locker_status(&a1["id"]).await, "available");
    assert_eq!(app.locker_status(&a2["id"]).await, "rented");
}

#[tokio::test]
async fn repeated_update_yields_the_same_state() {
    let app = TestApp::new().await;
    let locker = app.create_locker("A-1", "300").await;
    let client = app.create_client("ana").await;
    let (_, body) = app
        .create_rental(&locker, &client, "2024-01-01", "2024-02-01")
        .await;
    let uri = format!("/api/rentals/{}", id_of(&body["data"]));

    let patch = json!({"paymentStatus": "paid", "notes": "paid in cash", "endDate": "2024-03-01"});
    let (status, first) = app.put(&uri, patch.clone()).await;
    assert_eq!(status, StatusCode::OK, "{first}");
    let (status, second) = app.put(&uri, patch).await;
    assert_eq!(status, StatusCode::OK);

    let strip = |v: &Value| {
        let mut data = v["data"].clone();
        let obj = data.as_object_mut().unwrap();
        obj.remove("updatedAt");
        obj.remove("locker");
        data
    };
    assert_eq!(strip(&first), strip(&second));
    assert_eq!(second["data"]["paymentStatus"], "paid");
    assert_eq!(second["data"]["endDate"], "2024-03-01");
    assert_eq!(app.locker_status(&locker["id"]).await, "rented");
}

#[tokio::test]
async fn listing_respects_page_bounds() {
    let app = TestApp::new().await;
    let client = app.create_client("ana").await;
    for n in 0..7 {
        let locker = app.create_locker(&format!("L-{n}"), "100").await;
        let (status, _) = app
            .create_rental(&locker, &client, "2024-01-01", "2024-02-01")
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    for limit in 1..=8u64 {
        let (_, body) = app.get(&format!("/api/rentals?limit={limit}")).await;
        let total = body["total"].as_u64().unwrap();
        assert_eq!(total, 7);
        assert_eq!(body["totalPages"].as_u64().unwrap(), total.div_ceil(limit));
        assert!(body["data"].as_array().unwrap().len() as u64 <= limit);
    }

    // lenient coercion of bad paging values
    let (status, body) = app.get("/api/rentals?page=0&limit=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 1);

    let (_, body) = app.get("/api/rentals?page=abc&limit=xyz").await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);

    let (_, body) = app.get("/api/rentals?page=99").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, body) = app.get("/api/rentals?page=9223372036854775807").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total"], 7);
    assert_eq!(body["page"].as_u64(), Some(9223372036854775807));
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn list_filters_and_search() {
    let app = TestApp::new().await;
    let a1 = app.create_locker("A-1", "300").await;
    let b7 = app.create_locker("B-7", "300").await;
    let ana = app.create_client("ana").await;
    let bia = app.create_client("bia").await;

    let (_, first) = app.create_rental(&a1, &ana, "2024-01-01", "2024-02-01").await;
    app.create_rental(&b7, &bia, "2024-01-01", "2024-02-01").await;
    app.put(
        &format!("/api/rentals/{}", id_of(&first["data"])),
        json!({"status": "overdue", "notes": "late again"}),
    )
    .await;

    let (_, body) = app.get("/api/rentals?status=overdue").await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get("/api/rentals?search=B-7").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["client"]["name"], "Client bia");

    let (_, body) = app.get("/api/rentals?search=late").await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get("/api/rentals?search=Client%20ana").await;
    assert_eq!(body["total"], 1);

    let (_, body) = app
        .get(&format!("/api/rentals?clientId={}", id_of(&bia)))
        .await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get("/api/rentals/stats").await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["active"], 1);
    assert_eq!(body["data"]["overdue"], 1);
}
