use crate::{
    jobs::JobHandle,
    modules,
    types::{AppContext, AppEnvironment, Context},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors, trace};

pub struct App {
    ctx: Arc<Context>,
    router: Router,
}

impl App {
    pub fn new(ctx: Arc<Context>) -> Self {
        let router = Router::new()
            .nest("/api", modules::get_router())
            .with_state(ctx.clone())
            .layer(DefaultBodyLimit::max(1024 * 64))
            .layer(trace::TraceLayer::new_for_http())
            .layer(cors_layer(&ctx.app));

        Self { ctx, router }
    }

    pub async fn serve<S>(self, shutdown: S) -> std::io::Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let listener =
            TcpListener::bind(format!("{}:{}", self.ctx.app.host, self.ctx.app.port)).await?;

        tracing::info!(
            "App is running on {}:{} ({}, {:?})",
            self.ctx.app.host,
            self.ctx.app.port,
            self.ctx.app.url,
            self.ctx.app.environment
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Serves until `shutdown` resolves, then stops `jobs`, also when serving fails.
    pub async fn run<S>(self, jobs: JobHandle, shutdown: S) -> std::io::Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let served = self.serve(shutdown).await;
        if let Err(err) = &served {
            tracing::error!("Server stopped unexpectedly: {}", err);
        }

        jobs.shutdown().await;

        served
    }
}

/// Any origin in development. In production only the origin the app is served from.
fn cors_layer(app: &AppContext) -> cors::CorsLayer {
    let origin = match app.environment {
        AppEnvironment::Development => cors::AllowOrigin::any(),
        AppEnvironment::Production => match HeaderValue::from_str(app.url.trim_end_matches('/')) {
            Ok(origin) => cors::AllowOrigin::list([origin]),
            Err(err) => {
                tracing::warn!(
                    "URL {} is not a valid origin, cross-origin requests are refused: {}",
                    app.url,
                    err
                );
                cors::AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        },
    };

    cors::CorsLayer::new()
        .allow_methods([Method::OPTIONS, Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(origin)
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
