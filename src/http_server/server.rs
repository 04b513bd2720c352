//! # HTTP Server
//!
//! Combines the student, auth and health routers behind one CORS layer and
//! serves them until Ctrl+C or SIGTERM.

use std::io;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::auth_routes::auth_routes;
use super::config::HttpServerConfig;
use super::health_routes::health_routes;
use super::student_routes::student_routes;
use crate::auth::AuthService;
use crate::observability::{Event, Logger};
use crate::student::StudentService;

pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, students: StudentService, auth: AuthService) -> Self {
        let router = Self::build_router(&config, students, auth);
        Self { config, router }
    }

    fn build_router(
        config: &HttpServerConfig,
        students: StudentService,
        auth: AuthService,
    ) -> Router {
        let metrics = students.metrics().clone();

        Router::new()
            .merge(health_routes(metrics))
            .merge(student_routes(students))
            .merge(auth_routes(auth))
            .layer(cors_layer(&config.cors_origins))
    }

    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        self.config.bind_addr()
    }

    /// The assembled router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serves until a shutdown signal arrives and in-flight requests finish.
    pub async fn start(self) -> io::Result<()> {
        let listener = TcpListener::bind(self.bind_addr()?).await?;
        let bound = listener.local_addr()?.to_string();
        Logger::event(Event::Serving, &[("addr", bound.as_str())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    Logger::event(Event::ShutdownStart, &[]);
}
