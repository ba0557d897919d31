use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use chandler_api::{app, AppState};
use chandler_core::supplier::{OnboardingStatus, SupplierProfile, SupplierTier};
use chandler_store::BusinessRules;

async fn seed_supplier(state: &AppState, organization_id: Uuid, legal_name: &str) {
    state
        .suppliers
        .save_profile(SupplierProfile {
            organization_id,
            legal_name: legal_name.to_string(),
            tier: SupplierTier::Verified,
            onboarding_status: OnboardingStatus::Approved,
            kyc_documents: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        })
        .await
        .unwrap();
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    organization_id: Uuid,
    role: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-organization-id", organization_id.to_string())
        .header("x-actor-role", role);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn dec(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .unwrap()
}

fn id(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}

/// Drive an RFQ through bidding to an awarded vendor order with the delivery
/// leg already dispatched. Returns (order id, vendor order id, delivery json).
struct AwardedContext {
    order_id: Uuid,
    vendor_order_id: Uuid,
    delivery: Value,
}

async fn provision_dispatched_delivery(
    router: &Router,
    buyer: Uuid,
    supplier: Uuid,
) -> AwardedContext {
    let (status, rfq) = send(
        router,
        "POST",
        "/v1/rfqs",
        buyer,
        "BUYER",
        Some(json!({
            "title": "Lube oil replenishment",
            "currency": "USD",
            "vessel_name": "MV Paloma",
            "delivery_port": "SGSIN",
            "bidding_deadline": (chrono::Utc::now() + chrono::Duration::days(2)).to_rfc3339()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let rfq_id = id(&rfq);

    let (status, _line) = send(
        router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/line-items"),
        buyer,
        "BUYER",
        Some(json!({
            "description": "Lube oil SAE 40",
            "quantity": "10",
            "unit_of_measure": "drum"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(router, "POST", &format!("/v1/rfqs/{rfq_id}/publish"), buyer, "BUYER", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/invitations"),
        buyer,
        "BUYER",
        Some(json!({ "supplier_organization_id": supplier })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/invitations/respond"),
        supplier,
        "SUPPLIER",
        Some(json!({ "accept": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/open-bidding"),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, rfq) = send(router, "GET", &format!("/v1/rfqs/{rfq_id}"), buyer, "BUYER", None).await;
    assert_eq!(status, StatusCode::OK);
    let line_id = rfq["line_items"][0]["id"].as_str().unwrap();

    let (status, quote) = send(
        router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/quotes"),
        supplier,
        "SUPPLIER",
        Some(json!({
            "line_items": [{
                "rfq_line_item_id": line_id,
                "quantity": "10",
                "unit_price": "50.00",
                "total_price": "500.00"
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let quote_id = id(&quote);

    for action in ["close-bidding", "start-evaluation"] {
        let (status, _) = send(
            router,
            "POST",
            &format!("/v1/rfqs/{rfq_id}/{action}"),
            buyer,
            "BUYER",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, order) = send(
        router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/award"),
        buyer,
        "BUYER",
        Some(json!({ "quote_id": quote_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = id(&order);

    let (status, vendor_orders) = send(
        router,
        "GET",
        &format!("/v1/orders/{order_id}/vendor-orders"),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let vendor_order_id = id(&vendor_orders["items"][0]);

    for action in ["confirm", "start-processing", "ship"] {
        let (status, _) = send(
            router,
            "POST",
            &format!("/v1/vendor-orders/{vendor_order_id}/{action}"),
            supplier,
            "SUPPLIER",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, delivery) = send(
        router,
        "POST",
        &format!("/v1/vendor-orders/{vendor_order_id}/deliveries"),
        supplier,
        "SUPPLIER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let delivery_id = id(&delivery);

    let (status, delivery) = send(
        router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/dispatch"),
        supplier,
        "SUPPLIER",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    AwardedContext {
        order_id,
        vendor_order_id,
        delivery,
    }
}

fn record_body(delivery: &Value, delivered: &str) -> Value {
    let items: Vec<Value> = delivery["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            json!({
                "order_line_item_id": item["order_line_item_id"],
                "quantity_delivered": delivered
            })
        })
        .collect();
    json!({
        "items": items,
        "proof_of_delivery": {
            "gps_latitude": 1.2643,
            "gps_longitude": 103.8406,
            "receiver_name": "C/O Ramos",
            "receiver_designation": "Chief Officer"
        }
    })
}

fn accept_body(delivery: &Value, accepted: &str) -> Value {
    let items: Vec<Value> = delivery["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            json!({
                "order_line_item_id": item["order_line_item_id"],
                "quantity_accepted": accepted
            })
        })
        .collect();
    json!({ "items": items })
}

#[tokio::test]
async fn test_full_procurement_flow_from_rfq_to_settlement() {
    let state = AppState::in_memory(BusinessRules {
        tax_rate: 0.07,
        ..BusinessRules::default()
    });
    let buyer = Uuid::new_v4();
    let supplier_a = Uuid::new_v4();
    let supplier_b = Uuid::new_v4();
    seed_supplier(&state, supplier_a, "Harbour Stores Pte Ltd").await;
    seed_supplier(&state, supplier_b, "Mar del Norte Chandlery S.A.").await;
    let router = app(state);

    let (status, rfq) = send(
        &router,
        "POST",
        "/v1/rfqs",
        buyer,
        "BUYER",
        Some(json!({
            "title": "Deck stores, MV Paloma",
            "currency": "USD",
            "vessel_name": "MV Paloma",
            "delivery_port": "SGSIN",
            "bidding_deadline": (chrono::Utc::now() + chrono::Duration::days(2)).to_rfc3339()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rfq["status"], "DRAFT");
    let rfq_id = id(&rfq);

    let mut line_ids = Vec::new();
    for (description, quantity, unit) in [("Fresh water", "10", "t"), ("Mooring rope", "5", "m")] {
        let (status, line) = send(
            &router,
            "POST",
            &format!("/v1/rfqs/{rfq_id}/line-items"),
            buyer,
            "BUYER",
            Some(json!({
                "description": description,
                "quantity": quantity,
                "unit_of_measure": unit
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        line_ids.push(id(&line));
    }

    let (status, _) = send(&router, "POST", &format!("/v1/rfqs/{rfq_id}/publish"), buyer, "BUYER", None).await;
    assert_eq!(status, StatusCode::OK);

    for supplier in [supplier_a, supplier_b] {
        let (status, _) = send(
            &router,
            "POST",
            &format!("/v1/rfqs/{rfq_id}/invitations"),
            buyer,
            "BUYER",
            Some(json!({ "supplier_organization_id": supplier })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, invitation) = send(
            &router,
            "POST",
            &format!("/v1/rfqs/{rfq_id}/invitations/respond"),
            supplier,
            "SUPPLIER",
            Some(json!({ "accept": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(invitation["status"], "ACCEPTED");
    }

    let (status, _) = send(&router, "POST", &format!("/v1/rfqs/{rfq_id}/open-bidding"), buyer, "BUYER", None).await;
    assert_eq!(status, StatusCode::OK);

    // Supplier A quotes 100.00 in total, supplier B 120.00.
    let quote_lines = |unit_a: &str, total_a: &str, unit_b: &str, total_b: &str| {
        json!({
            "line_items": [
                {
                    "rfq_line_item_id": line_ids[0],
                    "quantity": "10",
                    "unit_price": unit_a,
                    "total_price": total_a
                },
                {
                    "rfq_line_item_id": line_ids[1],
                    "quantity": "5",
                    "unit_price": unit_b,
                    "total_price": total_b
                }
            ]
        })
    };
    let (status, quote_a) = send(
        &router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/quotes"),
        supplier_a,
        "SUPPLIER",
        Some(quote_lines("6.50", "65.00", "7.00", "35.00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&quote_a["total_amount"]), Decimal::new(10000, 2));

    // A revision pinned to a stale version is rejected.
    let stale = quote_a["version"].as_i64().unwrap() - 1;
    let mut revision = quote_lines("6.40", "64.00", "7.00", "35.00");
    revision["version"] = json!(stale);
    let (status, error) = send(
        &router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/quotes"),
        supplier_a,
        "SUPPLIER",
        Some(revision),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"]["code"], "CONFLICT_ERROR");

    let (status, _quote_b) = send(
        &router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/quotes"),
        supplier_b,
        "SUPPLIER",
        Some(quote_lines("8.00", "80.00", "8.00", "40.00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Sealed bids: the buyer cannot read the quote set while bidding is open.
    let (status, error) = send(&router, "GET", &format!("/v1/rfqs/{rfq_id}/quotes"), buyer, "BUYER", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"]["code"], "AUTHORIZATION_ERROR");

    // Each supplier only ever sees their own quote.
    let (status, visible) = send(
        &router,
        "GET",
        &format!("/v1/rfqs/{rfq_id}/quotes"),
        supplier_a,
        "SUPPLIER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visible.as_array().unwrap().len(), 1);

    for action in ["close-bidding", "start-evaluation"] {
        let (status, _) = send(&router, "POST", &format!("/v1/rfqs/{rfq_id}/{action}"), buyer, "BUYER", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, quotes) = send(&router, "GET", &format!("/v1/rfqs/{rfq_id}/quotes"), buyer, "BUYER", None).await;
    assert_eq!(status, StatusCode::OK);
    let quotes = quotes.as_array().unwrap();
    assert_eq!(quotes.len(), 2);
    let winner = quotes
        .iter()
        .find(|q| dec(&q["total_amount"]) == Decimal::new(10000, 2))
        .unwrap();
    assert_eq!(winner["price_rank"], 1);

    let (status, order) = send(
        &router,
        "POST",
        &format!("/v1/rfqs/{rfq_id}/award"),
        buyer,
        "BUYER",
        Some(json!({ "quote_id": winner["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "PENDING");
    assert_eq!(dec(&order["total_amount"]), Decimal::new(10000, 2));
    let order_id = id(&order);

    let (_, rfq) = send(&router, "GET", &format!("/v1/rfqs/{rfq_id}"), buyer, "BUYER", None).await;
    assert_eq!(rfq["status"], "AWARDED");

    // The losing supplier's quote is settled as rejected.
    let (_, quotes) = send(&router, "GET", "/v1/quotes", supplier_b, "SUPPLIER", None).await;
    assert_eq!(quotes["total"], 1);
    assert_eq!(quotes["items"][0]["status"], "REJECTED");

    let (status, vendor_orders) = send(
        &router,
        "GET",
        &format!("/v1/orders/{order_id}/vendor-orders"),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let vendor_orders = vendor_orders["items"].as_array().unwrap();
    assert_eq!(vendor_orders.len(), 1);
    assert_eq!(
        vendor_orders[0]["supplier_organization_id"].as_str().unwrap(),
        supplier_a.to_string()
    );
    assert_eq!(vendor_orders[0]["line_items"].as_array().unwrap().len(), 2);
    let vendor_order_id = id(&vendor_orders[0]);

    for (action, expected) in [
        ("confirm", "CONFIRMED"),
        ("start-processing", "PROCESSING"),
        ("ship", "SHIPPED"),
    ] {
        let (status, vendor_order) = send(
            &router,
            "POST",
            &format!("/v1/vendor-orders/{vendor_order_id}/{action}"),
            supplier_a,
            "SUPPLIER",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(vendor_order["status"], expected);
    }

    let (_, order) = send(&router, "GET", &format!("/v1/orders/{order_id}"), buyer, "BUYER", None).await;
    assert_eq!(order["status"], "IN_PROGRESS");

    let (status, delivery) = send(
        &router,
        "POST",
        &format!("/v1/vendor-orders/{vendor_order_id}/deliveries"),
        supplier_a,
        "SUPPLIER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(delivery["items"].as_array().unwrap().len(), 2);
    let delivery_id = id(&delivery);

    let (status, _) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/dispatch"),
        supplier_a,
        "SUPPLIER",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let items: Vec<Value> = delivery["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            json!({
                "order_line_item_id": item["order_line_item_id"],
                "quantity_delivered": item["quantity_ordered"]
            })
        })
        .collect();
    let (status, delivery) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/record"),
        supplier_a,
        "SUPPLIER",
        Some(json!({
            "items": items,
            "proof_of_delivery": {
                "gps_latitude": 1.2643,
                "gps_longitude": 103.8406,
                "receiver_name": "C/O Ramos",
                "receiver_designation": "Chief Officer",
                "photo_refs": ["pod/paloma-1.jpg"]
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivery["status"], "DELIVERED");
    assert_eq!(delivery["proof_of_delivery"]["receiver_name"], "C/O Ramos");

    let (_, vendor_order) = send(
        &router,
        "GET",
        &format!("/v1/vendor-orders/{vendor_order_id}"),
        supplier_a,
        "SUPPLIER",
        None,
    )
    .await;
    assert_eq!(vendor_order["status"], "DELIVERED");

    let accepted: Vec<Value> = delivery["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            json!({
                "order_line_item_id": item["order_line_item_id"],
                "quantity_accepted": item["quantity_delivered"]
            })
        })
        .collect();
    let (status, delivery) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/accept"),
        buyer,
        "BUYER",
        Some(json!({ "items": accepted, "note": "all received in good order" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivery["status"], "ACCEPTED");

    let (status, vendor_order) = send(
        &router,
        "POST",
        &format!("/v1/vendor-orders/{vendor_order_id}/complete"),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vendor_order["status"], "COMPLETED");

    let (_, order) = send(&router, "GET", &format!("/v1/orders/{order_id}"), buyer, "BUYER", None).await;
    assert_eq!(order["status"], "COMPLETED");

    let (status, rfq) = send(&router, "POST", &format!("/v1/rfqs/{rfq_id}/complete"), buyer, "BUYER", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rfq["status"], "COMPLETED");

    let (status, statement) = send(
        &router,
        "GET",
        &format!("/v1/vendor-orders/{vendor_order_id}/settlement"),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(statement["currency"], "USD");
    assert_eq!(statement["lines"].as_array().unwrap().len(), 2);
    assert_eq!(dec(&statement["subtotal"]), Decimal::new(10000, 2));
    assert_eq!(dec(&statement["tax"]), Decimal::new(700, 2));
    assert_eq!(dec(&statement["total"]), Decimal::new(10700, 2));
    assert!(statement["credit_adjustments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_short_acceptance_dispute_shows_credit_memo_in_settlement() {
    let state = AppState::in_memory(BusinessRules::default());
    let buyer = Uuid::new_v4();
    let supplier = Uuid::new_v4();
    let reviewer = Uuid::new_v4();
    seed_supplier(&state, supplier, "Harbour Stores Pte Ltd").await;
    let router = app(state);

    let ctx = provision_dispatched_delivery(&router, buyer, supplier).await;
    let delivery_id = id(&ctx.delivery);

    // All 10 drums arrive; the buyer accepts 8 and disputes the 2 damaged.
    let (status, delivery) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/record"),
        supplier,
        "SUPPLIER",
        Some(record_body(&ctx.delivery, "10")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, delivery) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/accept"),
        buyer,
        "BUYER",
        Some(accept_body(&delivery, "8")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivery["status"], "ACCEPTED");

    let (status, dispute) = send(
        &router,
        "POST",
        "/v1/disputes",
        buyer,
        "BUYER",
        Some(json!({
            "order_id": ctx.order_id,
            "delivery_id": delivery_id,
            "dispute_type": "DAMAGE",
            "description": "2 drums arrived dented and leaking"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dispute["status"], "OPEN");
    let dispute_id = id(&dispute);

    // Reviewer workflow: assign, resolve, close.
    let (status, dispute) = send(
        &router,
        "POST",
        &format!("/v1/disputes/{dispute_id}/assign"),
        reviewer,
        "REVIEWER",
        Some(json!({ "reviewer_id": reviewer })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dispute["status"], "UNDER_REVIEW");
    let (status, dispute) = send(
        &router,
        "POST",
        &format!("/v1/disputes/{dispute_id}/resolve"),
        reviewer,
        "REVIEWER",
        Some(json!({ "resolution": "credit 2 drums at quoted price" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dispute["status"], "RESOLVED");
    let (status, dispute) = send(
        &router,
        "POST",
        &format!("/v1/disputes/{dispute_id}/close"),
        reviewer,
        "REVIEWER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dispute["status"], "CLOSED");

    // Settlement bills the accepted 8 and carries the shortfall as a memo.
    let (status, statement) = send(
        &router,
        "GET",
        &format!("/v1/vendor-orders/{}/settlement", ctx.vendor_order_id),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&statement["subtotal"]), Decimal::new(40000, 2));
    assert_eq!(dec(&statement["total"]), Decimal::new(40000, 2));
    let credits = statement["credit_adjustments"].as_array().unwrap();
    assert_eq!(credits.len(), 1);
    assert_eq!(dec(&credits[0]["quantity_short"]), Decimal::from(2));
    assert_eq!(dec(&credits[0]["amount"]), Decimal::new(10000, 2));
    assert_eq!(credits[0]["dispute_id"].as_str().unwrap(), dispute_id.to_string());
}

#[tokio::test]
async fn test_supplier_cannot_drive_another_suppliers_delivery() {
    let state = AppState::in_memory(BusinessRules::default());
    let buyer = Uuid::new_v4();
    let supplier = Uuid::new_v4();
    let other_supplier = Uuid::new_v4();
    seed_supplier(&state, supplier, "Harbour Stores Pte Ltd").await;
    seed_supplier(&state, other_supplier, "Mar del Norte Chandlery S.A.").await;
    let router = app(state);

    let ctx = provision_dispatched_delivery(&router, buyer, supplier).await;
    let delivery_id = id(&ctx.delivery);

    // Another supplier cannot move the delivery along or record receipt
    // against it.
    let (status, error) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/in-transit"),
        other_supplier,
        "SUPPLIER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"]["code"], "AUTHORIZATION_ERROR");

    let (status, error) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/record"),
        other_supplier,
        "SUPPLIER",
        Some(record_body(&ctx.delivery, "10")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"]["code"], "AUTHORIZATION_ERROR");

    let (_, delivery) = send(
        &router,
        "GET",
        &format!("/v1/deliveries/{delivery_id}"),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(delivery["status"], "DISPATCHED");

    // The owning supplier is unaffected.
    let (status, delivery) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/record"),
        supplier,
        "SUPPLIER",
        Some(record_body(&ctx.delivery, "10")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivery["status"], "DELIVERED");
}

#[tokio::test]
async fn test_disputing_a_delivery_marks_it_and_opens_the_case() {
    let state = AppState::in_memory(BusinessRules::default());
    let buyer = Uuid::new_v4();
    let supplier = Uuid::new_v4();
    seed_supplier(&state, supplier, "Harbour Stores Pte Ltd").await;
    let router = app(state);

    let ctx = provision_dispatched_delivery(&router, buyer, supplier).await;
    let delivery_id = id(&ctx.delivery);

    let (status, _) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/record"),
        supplier,
        "SUPPLIER",
        Some(record_body(&ctx.delivery, "4")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, dispute) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/dispute"),
        buyer,
        "BUYER",
        Some(json!({
            "reason": "6 of 10 drums missing from the barge",
            "dispute_type": "QUANTITY_MISMATCH"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dispute["status"], "OPEN");
    assert_eq!(dispute["delivery_id"].as_str().unwrap(), delivery_id.to_string());

    let (_, delivery) = send(
        &router,
        "GET",
        &format!("/v1/deliveries/{delivery_id}"),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(delivery["status"], "DISPUTED");

    // A disputed, unreviewed delivery contributes nothing to settlement.
    let (status, statement) = send(
        &router,
        "GET",
        &format!("/v1/vendor-orders/{}/settlement", ctx.vendor_order_id),
        buyer,
        "BUYER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&statement["subtotal"]), Decimal::ZERO);

    // The supplier cannot review their own delivery.
    let (status, error) = send(
        &router,
        "POST",
        &format!("/v1/deliveries/{delivery_id}/reject"),
        supplier,
        "SUPPLIER",
        Some(json!({ "reason": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"]["code"], "AUTHORIZATION_ERROR");
}
