mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};

use common::{TestApp, spawn_app};

async fn invoiced_order(t: &TestApp, po: &str, po_date: &str, amount: f64) -> i64 {
    let id = t
        .create_order(json!({ "po_number": po, "po_date": po_date, "total_amount": amount }))
        .await["id"]
        .as_i64()
        .unwrap();
    let (status, _) = t.call("POST", &format!("/api/orders/{id}/invoice"), None).await;
    assert_eq!(status, StatusCode::OK);
    id
}

#[tokio::test]
async fn preview_carries_unpaid_balance_forward() {
    let t = spawn_app().await;
    invoiced_order(&t, "JAN", "2026-01-10", 100.0).await;
    let paid = invoiced_order(&t, "JAN-PAID", "2026-01-11", 40.0).await;
    t.call("POST", &format!("/api/orders/{paid}/payment"), None).await;
    invoiced_order(&t, "FEB", "2026-02-05", 200.0).await;
    // never invoiced, so never on a statement
    t.create_order(json!({ "po_number": "DRAFT", "po_date": "2026-02-06", "total_amount": 7.0 }))
        .await;

    let (status, preview) = t
        .call("GET", "/api/statements/preview?start=2026-02-01&end=2026-02-28", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let pos: Vec<&Value> = preview["orders"].as_array().unwrap().iter().map(|o| &o["po_number"]).collect();
    assert_eq!(pos, vec![&json!("FEB")]);
    assert_eq!(preview["previous_outstanding"], 100.0);
    assert_eq!(preview["period_total"], 200.0);
    assert!(preview["last_statement"].is_null());
    assert_eq!(preview["next_statement_number"], 1);

    let (status, _) = t
        .call("GET", "/api/statements/preview?start=2026-02-28&end=2026-02-01", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generating_statements_chains_numbers() {
    let t = spawn_app().await;
    invoiced_order(&t, "JAN", "2026-01-10", 100.0).await;
    let feb_a = invoiced_order(&t, "FEB-A", "2026-02-05", 200.0).await;
    invoiced_order(&t, "FEB-B", "2026-02-07", 50.0).await;

    let (status, first) = t
        .call(
            "POST",
            "/api/statements",
            Some(json!({ "start_date": "2026-01-01", "end_date": "2026-01-31", "issued_on": "2026-02-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["statement_number"], 1);
    assert_eq!(first["total_amount"], 100.0);
    assert_eq!(first["previous_balance"], 0.0);

    let (status, second) = t
        .call(
            "POST",
            "/api/statements",
            Some(json!({
                "start_date": "2026-02-01",
                "end_date": "2026-02-28",
                "issued_on": "2026-03-01",
                "order_ids": [feb_a]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{second}");
    assert_eq!(second["statement_number"], 2);
    assert_eq!(second["previous_statement_number"], "1");
    assert_eq!(second["previous_balance"], 100.0);
    assert_eq!(second["total_amount"], 300.0);
    assert_eq!(second["order_ids"], json!([feb_a]));

    let id = second["id"].as_i64().unwrap();
    let req = Request::builder()
        .uri(format!("/api/statements/{id}/document"))
        .header("x-office-key", common::OFFICE_KEY)
        .body(Body::empty())
        .expect("failed to build request");
    let (status, body) = t.raw(req).await;
    assert_eq!(status, StatusCode::OK);
    let svg = String::from_utf8(body).expect("svg was not utf-8");
    assert!(svg.contains("Outstanding From Previous Statement 0001/26"));
    assert!(svg.contains("PO: FEB-A"));
    assert!(!svg.contains("PO: FEB-B"));
    assert!(svg.contains("MVR 300.00"));

    let (_, list) = t.call("GET", "/api/statements?year=2026", None).await;
    assert_eq!(list["years"], json!(["2026"]));
    assert_eq!(list["statements"][0]["statement_number"], 2);
}

#[tokio::test]
async fn selection_outside_the_period_is_rejected() {
    let t = spawn_app().await;
    let jan = invoiced_order(&t, "JAN", "2026-01-10", 100.0).await;
    invoiced_order(&t, "FEB", "2026-02-05", 200.0).await;

    let (status, body) = t
        .call(
            "POST",
            "/api/statements",
            Some(json!({ "start_date": "2026-02-01", "end_date": "2026-02-28", "order_ids": [jan] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let (_, counters) = t.call("GET", "/api/settings/counters", None).await;
    assert_eq!(counters["next_statement_number"], 1);
}

#[tokio::test]
async fn duplicate_statement_number_is_refused() {
    let t = spawn_app().await;
    invoiced_order(&t, "JAN", "2026-01-10", 100.0).await;
    let body = json!({ "start_date": "2026-01-01", "end_date": "2026-01-31", "issued_on": "2026-02-01" });

    let (status, _) = t.call("POST", "/api/statements", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = t
        .call("PUT", "/api/settings/counters/next_statement_number", Some(json!({ "value": 1 })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) = t.call("POST", "/api/statements", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let message = err["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Statement #0001/26 already exists."), "{message}");

    // the refused attempt must not consume a number
    let (_, counters) = t.call("GET", "/api/settings/counters", None).await;
    assert_eq!(counters["next_statement_number"], 1);

    // a different year does not collide
    let (status, _) = t
        .call(
            "POST",
            "/api/statements",
            Some(json!({ "start_date": "2026-01-01", "end_date": "2026-01-31", "issued_on": "2027-01-02" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, synced) = t.call("POST", "/api/settings/counters/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(synced["next_statement_number"], 2);
}

#[tokio::test]
async fn counters_reject_values_below_one() {
    let t = spawn_app().await;
    let (status, _) = t
        .call("PUT", "/api/settings/counters/next_invoice_number", Some(json!({ "value": 0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = t
        .call("PUT", "/api/settings/counters/bogus", Some(json!({ "value": 4 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleted_statement_is_gone() {
    let t = spawn_app().await;
    invoiced_order(&t, "JAN", "2026-01-10", 100.0).await;
    let (_, stmt) = t
        .call(
            "POST",
            "/api/statements",
            Some(json!({ "start_date": "2026-01-01", "end_date": "2026-01-31" })),
        )
        .await;
    let id = stmt["id"].as_i64().unwrap();
    let (status, _) = t.call("DELETE", &format!("/api/statements/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = t.call("GET", &format!("/api/statements/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
