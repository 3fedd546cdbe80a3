//! Checkout through the hosted payment widget, with the gateway's REST API
//! stood in for by `wiremock` and the widget answered from a UI task.

use std::time::Duration;

use ambre_core::PaymentStatus;
use ambre_integration_tests::{product, shipping_form, signed_in_store};
use ambre_storefront::checkout::{CheckoutOutcome, CheckoutWorkflow};
use ambre_storefront::config::PaymentConfig;
use ambre_storefront::content::{ContentStore, MemoryContentStore};
use ambre_storefront::payment::{HostedCheckout, WidgetBridge, WidgetResponse};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn hosted_gateway(server: &MockServer) -> (HostedCheckout, WidgetBridge) {
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(basic_auth("rzp_test_ambre", "hosted-secret"))
        .and(body_partial_json(json!({ "amount": 100_000, "currency": "INR" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_gw_42",
            "amount": 100_000,
            "currency": "INR",
            "status": "created"
        })))
        .mount(server)
        .await;

    HostedCheckout::new(&PaymentConfig {
        key_id: Some("rzp_test_ambre".to_string()),
        key_secret: Some(SecretString::from("hosted-secret".to_string())),
        base_url: server.uri(),
        theme_color: "#C9A96E".to_string(),
        mock_delay: Duration::ZERO,
    })
    .unwrap()
}

#[tokio::test]
async fn test_widget_success_marks_order_paid() {
    let server = MockServer::start().await;
    let (gateway, mut bridge) = hosted_gateway(&server).await;

    let ui = tokio::spawn(async move {
        let launch = bridge.next_launch().await.unwrap();
        let options = launch.options().clone();
        assert_eq!(options.amount, 100_000);
        assert_eq!(options.prefill.email, "meera@example.in");
        assert!(options.description.starts_with("Order ORD-"));

        let response: WidgetResponse = serde_json::from_value(json!({
            "razorpay_payment_id": "pay_42",
            "razorpay_order_id": "order_gw_42",
            "razorpay_signature": "sig_42"
        }))
        .unwrap();
        launch.succeed(response);
    });

    let content = MemoryContentStore::new();
    let workflow = CheckoutWorkflow::new(content.clone(), gateway, "#C9A96E");
    let mut store = signed_in_store();
    store.add_to_cart(&product(0, 500), 2, None);

    let outcome = workflow.submit(&mut store, &shipping_form()).await.unwrap();
    ui.await.unwrap();

    assert!(matches!(outcome, CheckoutOutcome::Completed { recorded: true, .. }));
    assert!(store.is_cart_empty());

    let order = content.fetch_order(outcome.order_id()).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    let receipt = order.receipt.unwrap();
    assert_eq!(receipt.payment_id, "pay_42");
    assert_eq!(receipt.gateway_order_id, "order_gw_42");
}

#[tokio::test]
async fn test_widget_dismissed_keeps_cart() {
    let server = MockServer::start().await;
    let (gateway, mut bridge) = hosted_gateway(&server).await;

    let ui = tokio::spawn(async move {
        bridge.next_launch().await.unwrap().dismiss();
    });

    let content = MemoryContentStore::new();
    let workflow = CheckoutWorkflow::new(content.clone(), gateway, "#C9A96E");
    let mut store = signed_in_store();
    store.add_to_cart(&product(0, 500), 2, None);

    let outcome = workflow.submit(&mut store, &shipping_form()).await.unwrap();
    ui.await.unwrap();

    assert!(matches!(outcome, CheckoutOutcome::Cancelled { .. }));
    assert_eq!(store.count(), 2);
    let order = content.fetch_order(outcome.order_id()).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}
