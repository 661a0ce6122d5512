use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{api, AppState};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(api::health_check))
        // Calculator
        .route("/api/metrics", post(api::post_metrics))
        // Forecast
        .route("/api/forecast", post(api::post_forecast))
        .route("/api/forecast/demo", get(api::get_demo_forecast))
        // Stakeholder insights
        .route("/api/insights", get(api::get_insights))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Yield API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Yield API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt; // for `oneshot`

    fn app() -> Router {
        router(AppState::new(AppConfig::default()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_works() {
        let (status, body) = send(get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn metrics_for_reference_campaign() {
        let (status, body) = send(post_json(
            "/api/metrics",
            json!({"impressions": 10000, "clicks": 500, "conversions": 50, "cost": 800}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ctr"], "0.05");
        assert_eq!(body["cvr"], "0.1");
        assert_eq!(body["ecpm"], "80");
        assert_eq!(body["cpa"], "16");
    }

    #[tokio::test]
    async fn metrics_with_zero_impressions_is_bad_request() {
        let (status, body) = send(post_json(
            "/api/metrics",
            json!({"impressions": 0, "clicks": 5, "conversions": 1, "cost": 10}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("impressions"));
    }

    #[tokio::test]
    async fn metrics_with_negative_counter_is_bad_request() {
        let (status, body) = send(post_json(
            "/api/metrics",
            json!({"impressions": 1000, "clicks": -5, "conversions": 1, "cost": 10}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("clicks"));
    }

    #[tokio::test]
    async fn metrics_with_oversized_cost_is_bad_request() {
        let (status, body) = send(post_json(
            "/api/metrics",
            json!({"impressions": 1, "clicks": 0, "conversions": 0, "cost": "100000000000000000000000000"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("cost"));
    }

    #[tokio::test]
    async fn demo_forecast_returns_seven_days() {
        let (status, body) = send(get("/api/forecast/demo")).await;
        assert_eq!(status, StatusCode::OK);

        let points = body["points"].as_array().unwrap();
        assert_eq!(points.len(), 7);
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point["day"], i as u64 + 1);
        }
        assert_eq!(body["params"]["order"]["p"], 1);
        assert_eq!(points[0]["value"], "17.82");
        assert_eq!(points[6]["value"], "17.18");
    }

    #[tokio::test]
    async fn demo_forecast_matches_empty_post() {
        let (_, demo) = send(get("/api/forecast/demo")).await;
        let (status, posted) = send(post_json("/api/forecast", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(demo, posted);
    }

    #[tokio::test]
    async fn forecast_of_supplied_history() {
        let history: Vec<f64> = (0..20).map(|t| 10.0 + 0.5 * t as f64).collect();
        let (status, body) = send(post_json(
            "/api/forecast",
            json!({"history": history, "horizon": 3}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points"].as_array().unwrap().len(), 3);
        assert_eq!(body["points"][0]["value"], "20");
    }

    #[tokio::test]
    async fn forecast_horizon_above_cap_is_bad_request() {
        let (status, body) = send(post_json("/api/forecast", json!({"horizon": 1_000_000_000u64}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("horizon"));
    }

    #[tokio::test]
    async fn forecast_rejects_seed_with_history() {
        let (status, body) = send(post_json(
            "/api/forecast",
            json!({"history": [10.0, 11.0, 12.0, 13.0, 14.0], "seed": 7}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("seed"));
    }

    #[tokio::test]
    async fn forecast_of_short_history_is_unprocessable() {
        let (status, body) = send(post_json("/api/forecast", json!({"history": [1.0, 2.0, 3.0]}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("Model fitting"));
    }

    #[tokio::test]
    async fn insights_endpoint_returns_text() {
        let (status, body) = send(get("/api/insights")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["insights"].as_str().unwrap().contains("Media Buyers"));
    }
}
