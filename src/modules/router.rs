use crate::types::Context;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;

use super::{auth, otp};

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/health", get(health))
        .nest("/otp", otp::routes::get_router())
        .nest("/auth", auth::routes::get_router())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        modules::{
            notification::service::sms::testing::{FakeSmsGateway, Reply},
            otp::{repository::memory::MemoryOtpStore, service::OtpManager},
        },
        types::testing::context,
    };
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> (Router, Arc<FakeSmsGateway>) {
        let gateway = Arc::new(FakeSmsGateway::new(Reply::Delivered("abc")));
        let ctx = context(OtpManager::new(
            Arc::new(MemoryOtpStore::new()),
            gateway.clone(),
        ));
        (Router::new().nest("/api", get_router()).with_state(ctx), gateway)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (router, _) = router();

        let res = router
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value =
            serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn auth_namespace_sends_otps_too() {
        let (router, gateway) = router();

        let res = router
            .oneshot(
                Request::post("/api/auth/otp/send")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"phone":"+91 98765 43210"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(gateway.sent()[0].0, "919876543210");
    }
}
