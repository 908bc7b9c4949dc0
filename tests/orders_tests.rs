mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tradebook::service::digest::business_today;

use common::{spawn_app, spawn_app_with};

#[tokio::test]
async fn api_requires_office_key() {
    let t = spawn_app().await;

    let (status, body) = t
        .raw(
            Request::builder()
                .uri("/api/orders/recent")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body = std::str::from_utf8(&body).expect("response body was not utf-8");
    assert!(body.contains(r#""code":"UNAUTHORIZED""#));

    let (status, _) = t
        .raw(
            Request::builder()
                .uri("/api/orders/recent?key=pwd")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .raw(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn new_orders_get_defaults() {
    let t = spawn_app().await;
    let order = t
        .create_order(json!({
            "po_number": " PO-100 ",
            "po_date": "2026-03-02",
            "weight_kg": 10.0
        }))
        .await;

    assert_eq!(order["po_number"], "PO-100");
    assert_eq!(order["delivery_date"], "2026-03-02");
    assert_eq!(order["currency"], "MVR");
    assert_eq!(order["total_amount"], 1696.2);
    assert_eq!(order["payment_status"], "Unpaid");
    assert_eq!(order["delivery_status"], "Pending");
    assert!(order["invoice_number"].is_null());

    let (status, body) = t
        .call(
            "POST",
            "/api/orders",
            Some(json!({ "po_number": "PO-101", "po_date": "2026-03-02", "currency": "EUR" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn delivery_and_invoice_numbers_are_sequential() {
    let t = spawn_app().await;
    let a = t
        .create_order(json!({ "po_number": "A", "po_date": "2026-01-05", "weight_kg": 1.0 }))
        .await;
    let b = t
        .create_order(json!({ "po_number": "B", "po_date": "2026-01-06", "weight_kg": 2.0 }))
        .await;
    let (a, b) = (a["id"].as_i64().unwrap(), b["id"].as_i64().unwrap());

    let (status, delivered) = t.call("POST", &format!("/api/orders/{a}/deliver"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["delivery_status"], "Delivered");
    assert_eq!(delivered["delivery_note_number"], 1);
    assert_eq!(
        delivered["delivery_date"],
        business_today(t.config.digest.utc_offset_hours).to_string()
    );

    // delivering twice changes nothing
    let (_, again) = t.call("POST", &format!("/api/orders/{a}/deliver"), None).await;
    assert_eq!(again["delivery_note_number"], 1);

    let (_, delivered_b) = t.call("POST", &format!("/api/orders/{b}/deliver"), None).await;
    assert_eq!(delivered_b["delivery_note_number"], 2);

    let (status, invoiced) = t.call("POST", &format!("/api/orders/{b}/invoice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoiced["invoice_number"], 1);
    assert_eq!(invoiced["invoice_date"], invoiced["delivery_date"]);

    let (status, body) = t.call("POST", &format!("/api/orders/{b}/invoice"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (_, counters) = t.call("GET", "/api/settings/counters", None).await;
    assert_eq!(counters["next_delivery_note"], 3);
    assert_eq!(counters["next_invoice_number"], 2);
    assert_eq!(counters["next_statement_number"], 1);
}

#[tokio::test]
async fn payment_toggle_needs_an_invoice() {
    let t = spawn_app().await;
    let order = t
        .create_order(json!({ "po_number": "P", "po_date": "2026-02-01", "total_amount": 500.0 }))
        .await;
    let id = order["id"].as_i64().unwrap();

    let (status, body) = t.call("POST", &format!("/api/orders/{id}/payment"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Generate an invoice first!");

    t.call("POST", &format!("/api/orders/{id}/invoice"), None).await;
    let (_, paid) = t.call("POST", &format!("/api/orders/{id}/payment"), None).await;
    assert_eq!(paid["payment_status"], "Paid");
    let (_, unpaid) = t.call("POST", &format!("/api/orders/{id}/payment"), None).await;
    assert_eq!(unpaid["payment_status"], "Unpaid");
}

#[tokio::test]
async fn deleting_the_latest_order_frees_its_numbers() {
    let t = spawn_app().await;
    let a = t
        .create_order(json!({ "po_number": "A", "po_date": "2026-01-05" }))
        .await["id"]
        .as_i64()
        .unwrap();
    let b = t
        .create_order(json!({ "po_number": "B", "po_date": "2026-01-06" }))
        .await["id"]
        .as_i64()
        .unwrap();
    for id in [a, b] {
        t.call("POST", &format!("/api/orders/{id}/deliver"), None).await;
        t.call("POST", &format!("/api/orders/{id}/invoice"), None).await;
    }

    let (status, _) = t.call("DELETE", &format!("/api/orders/{b}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, counters) = t.call("GET", "/api/settings/counters", None).await;
    assert_eq!(counters["next_invoice_number"], 2);
    assert_eq!(counters["next_delivery_note"], 2);

    let (status, _) = t.call("GET", &format!("/api/orders/{b}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_filters_and_sums() {
    let t = spawn_app().await;
    t.create_order(json!({ "po_number": "M1", "po_date": "2026-01-10", "total_amount": 100.0, "weight_kg": 5.0 }))
        .await;
    let usd = t
        .create_order(json!({ "po_number": "U1", "po_date": "2026-01-20", "currency": "usd", "total_amount": 220.0 }))
        .await;
    t.create_order(json!({ "po_number": "OLD", "po_date": "2025-12-31", "total_amount": 999.0 }))
        .await;

    let id = usd["id"].as_i64().unwrap();
    t.call("POST", &format!("/api/orders/{id}/invoice"), None).await;
    t.call("POST", &format!("/api/orders/{id}/payment"), None).await;

    let (status, view) = t.call("GET", "/api/dashboard?year=2026&month=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = view["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["po_number"], "U1");
    assert_eq!(view["stats"]["pending_mvr"], 100.0);
    assert_eq!(view["stats"]["earned_usd"], 220.0);
    assert_eq!(view["stats"]["weight_kg"], 25.0);

    let (_, years) = t.call("GET", "/api/orders/years", None).await;
    assert_eq!(years, json!(["2026", "2025"]));
}

#[tokio::test]
async fn invoice_tabs_split_pending_and_history() {
    let t = spawn_app().await;
    let a = t
        .create_order(json!({ "po_number": "A", "po_date": "2026-04-01" }))
        .await["id"]
        .as_i64()
        .unwrap();
    let b = t
        .create_order(json!({ "po_number": "B", "po_date": "2026-04-02" }))
        .await["id"]
        .as_i64()
        .unwrap();
    t.create_order(json!({ "po_number": "C", "po_date": "2026-04-03" }))
        .await;
    t.call("POST", &format!("/api/orders/{a}/deliver"), None).await;
    t.call("POST", &format!("/api/orders/{b}/deliver"), None).await;
    t.call("POST", &format!("/api/orders/{b}/invoice"), None).await;

    let (_, pending) = t.call("GET", "/api/invoices?tab=pending", None).await;
    let pending: Vec<_> = pending.as_array().unwrap().iter().map(|o| o["po_number"].clone()).collect();
    assert_eq!(pending, vec![json!("A")]);

    let (_, history) = t.call("GET", "/api/invoices?tab=history&year=2026", None).await;
    let history: Vec<_> = history.as_array().unwrap().iter().map(|o| o["po_number"].clone()).collect();
    assert_eq!(history, vec![json!("B")]);
}

#[tokio::test]
async fn order_documents_render_as_svg() {
    let t = spawn_app().await;
    let id = t
        .create_order(json!({ "po_number": "PO<&>", "po_date": "2026-06-01", "weight_kg": 3.0 }))
        .await["id"]
        .as_i64()
        .unwrap();
    t.call("POST", &format!("/api/orders/{id}/deliver"), None).await;
    t.call("POST", &format!("/api/orders/{id}/invoice"), None).await;

    let resp_req = Request::builder()
        .uri(format!("/api/orders/{id}/documents/invoice"))
        .header("x-office-key", common::OFFICE_KEY)
        .body(Body::empty())
        .expect("failed to build request");
    let (status, body) = t.raw(resp_req).await;
    assert_eq!(status, StatusCode::OK);
    let svg = String::from_utf8(body).expect("svg was not utf-8");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("PO&lt;&amp;&gt;"));
    assert!(svg.contains("0001/"));

    let req = Request::builder()
        .uri(format!("/api/orders/{id}/documents/delivery-note"))
        .header("x-office-key", common::OFFICE_KEY)
        .body(Body::empty())
        .expect("failed to build request");
    let (status, body) = t.raw(req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("DELIVERY NOTE"));
}

#[tokio::test]
async fn unset_office_key_locks_the_api() {
    let t = spawn_app_with(|cfg| cfg.basic.office_key = None).await;
    for key in ["change-me", "", "pwd"] {
        let (status, body) = t
            .raw(
                Request::builder()
                    .uri("/api/orders/recent")
                    .header("x-office-key", key)
                    .body(Body::empty())
                    .expect("failed to build request"),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "key {key:?} got through");
        let body = std::str::from_utf8(&body).expect("response body was not utf-8");
        assert!(body.contains(r#""code":"UNAUTHORIZED""#));
    }

    let (status, _) = t
        .raw(
            Request::builder()
                .uri("/api/orders/recent?key=")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_requests_use_the_error_envelope() {
    let t = spawn_app().await;

    let (status, body) = t
        .call("POST", "/api/orders", Some(json!({ "po_date": "2026-01-05" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("po_number"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header("x-office-key", common::OFFICE_KEY)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("failed to build request");
    let (status, bytes) = t.raw(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("error body was not json");
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let (status, body) = t.call("GET", "/api/orders/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let (status, body) = t.call("GET", "/api/orders/recent?limit=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn editing_an_order_keeps_its_workflow_state() {
    let t = spawn_app().await;
    let id = t
        .create_order(json!({ "po_number": "E1", "po_date": "2026-02-01", "total_amount": 100.0 }))
        .await["id"]
        .as_i64()
        .unwrap();
    t.call("POST", &format!("/api/orders/{id}/deliver"), None).await;
    t.call("POST", &format!("/api/orders/{id}/invoice"), None).await;
    let (_, before) = t.call("POST", &format!("/api/orders/{id}/payment"), None).await;
    assert_eq!(before["payment_status"], "Paid");

    let (status, edited) = t
        .call(
            "PUT",
            &format!("/api/orders/{id}"),
            Some(json!({
                "po_number": "E1-REV",
                "po_date": "2026-02-03",
                "total_amount": 250.0,
                "description": "revised"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{edited}");
    assert_eq!(edited["po_number"], "E1-REV");
    assert_eq!(edited["total_amount"], 250.0);
    assert_eq!(edited["description"], "revised");
    for field in [
        "payment_status",
        "delivery_status",
        "delivery_note_number",
        "invoice_number",
        "invoice_date",
    ] {
        assert_eq!(edited[field], before[field], "{field} changed on edit");
    }

    let (status, _) = t
        .call("PUT", "/api/orders/999", Some(json!({ "po_number": "X", "po_date": "2026-02-03" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recent_orders_default_to_five_newest() {
    let t = spawn_app().await;
    for n in 1..=7 {
        t.create_order(json!({ "po_number": format!("R{n}"), "po_date": "2026-03-01" }))
            .await;
    }

    let (status, recent) = t.call("GET", "/api/orders/recent", None).await;
    assert_eq!(status, StatusCode::OK);
    let pos: Vec<_> = recent.as_array().unwrap().iter().map(|o| o["po_number"].clone()).collect();
    assert_eq!(pos, vec![json!("R7"), json!("R6"), json!("R5"), json!("R4"), json!("R3")]);

    let (_, two) = t.call("GET", "/api/orders/recent?limit=2", None).await;
    assert_eq!(two.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn years_list_newest_first_without_duplicates() {
    let t = spawn_app().await;
    for (po, date) in [("A", "2024-05-01"), ("B", "2026-01-01"), ("C", "2025-07-07"), ("D", "2026-09-09")] {
        t.create_order(json!({ "po_number": po, "po_date": date })).await;
    }
    let (status, years) = t.call("GET", "/api/orders/years", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(years, json!(["2026", "2025", "2024"]));
}

#[tokio::test]
async fn counter_sync_follows_issued_numbers() {
    let t = spawn_app().await;
    for po in ["S1", "S2"] {
        let id = t
            .create_order(json!({ "po_number": po, "po_date": "2026-01-05" }))
            .await["id"]
            .as_i64()
            .unwrap();
        t.call("POST", &format!("/api/orders/{id}/deliver"), None).await;
        t.call("POST", &format!("/api/orders/{id}/invoice"), None).await;
    }
    for key in ["next_invoice_number", "next_delivery_note"] {
        let (status, _) = t
            .call("PUT", &format!("/api/settings/counters/{key}"), Some(json!({ "value": 40 })))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, synced) = t.call("POST", "/api/settings/counters/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(synced["next_invoice_number"], 3);
    assert_eq!(synced["next_delivery_note"], 3);
    assert_eq!(synced["next_statement_number"], 1);
}
