mod common;

use axum::http::StatusCode;
use common::{payload, post_predict, stub_router};
use diabetes_risk_service::models::SchemaRevision;
use diabetes_risk_service::services::init_metrics;
use tower::ServiceExt;

async fn scrape(router: axum::Router) -> String {
    let response = router
        .oneshot(
            axum::http::Request::builder()
                .uri("/metrics")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// Single test: the recorder is process-global, so counts stay exact.
#[tokio::test]
async fn predictions_show_up_in_metrics() {
    init_metrics();

    let request = payload(SchemaRevision::V2);
    for probability in [0.8, 0.8, 0.2] {
        let (status, _) = post_predict(stub_router(SchemaRevision::V2, probability), &request).await;
        assert_eq!(status, StatusCode::OK);
    }

    let rendered = scrape(stub_router(SchemaRevision::V2, 0.8)).await;

    assert!(
        rendered.contains(r#"predictions_total{revision="v2",risk="Alta"} 2"#),
        "{}",
        rendered
    );
    assert!(
        rendered.contains(r#"predictions_total{revision="v2",risk="Baja"} 1"#),
        "{}",
        rendered
    );
    assert!(rendered.contains("model_inference_duration_seconds"));
    assert!(rendered.contains("http_requests_total"));
}
