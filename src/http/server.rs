//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router from the route table
//! - Wire up middleware (request ID, tracing, timeout, body limit,
//!   nonce, security headers, rate limit, CSRF)
//! - Bind server to listener and shut down gracefully

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, http::StatusCode, middleware, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SiteConfig;
use crate::handlers::pages::PAGE_TEMPLATES;
use crate::notify::email::{ADMIN_TEMPLATE, CONFIRMATION_TEMPLATE};
use crate::notify::{EmailNotifier, Notifier, NotifyError};
use crate::render::Renderer;
use crate::routing;
use crate::security::{
    csrf::csrf_middleware, headers::security_headers_middleware, nonce::nonce_middleware,
    rate_limit::rate_limit_middleware, CsrfGuard, RateLimiter,
};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<Renderer>,
    pub notifier: Arc<dyn Notifier>,
    pub site_name: Arc<str>,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to load templates: {0}")]
    Templates(#[from] tera::Error),

    #[error("Template '{template}' not found in {dir}")]
    MissingTemplate { template: &'static str, dir: String },

    #[error("Failed to configure email: {0}")]
    Email(#[from] NotifyError),
}

/// HTTP server for the site.
pub struct HttpServer {
    router: Router,
    config: SiteConfig,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl HttpServer {
    /// Create a server that delivers notifications over SMTP (or logs them
    /// when email is disabled).
    pub fn new(config: SiteConfig) -> Result<Self, ServerError> {
        let renderer = load_renderer(&config)?;
        let notifier = EmailNotifier::new(&config.email, renderer.clone())?;
        tracing::info!(
            enabled = notifier.is_enabled(),
            admin = %config.email.admin_address(),
            "Email notifier ready"
        );
        let notifier = Arc::new(notifier);
        Ok(Self::assemble(config, renderer, notifier))
    }

    /// Create a server with a caller-supplied notifier.
    pub fn with_notifier(config: SiteConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ServerError> {
        let renderer = load_renderer(&config)?;
        Ok(Self::assemble(config, renderer, notifier))
    }

    fn assemble(config: SiteConfig, renderer: Arc<Renderer>, notifier: Arc<dyn Notifier>) -> Self {
        let state = AppState {
            renderer,
            notifier,
            site_name: Arc::from(config.site.name.as_str()),
        };

        let rate_limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::from_config(&config.rate_limit)));
        let csrf = Arc::new(CsrfGuard::new(config.security.trusted_origins.clone()));

        let router = Self::build_router(&config, state, rate_limiter.clone(), csrf);
        Self {
            router,
            config,
            rate_limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers added later wrap earlier ones, so requests meet them bottom-up:
    /// request ID → trace → timeout → body limit → nonce → security headers
    /// → rate limit → CSRF → handler.
    fn build_router(
        config: &SiteConfig,
        state: AppState,
        rate_limiter: Option<Arc<RateLimiter>>,
        csrf: Arc<CsrfGuard>,
    ) -> Router {
        let router = routing::register(Router::new(), routing::route_table())
            .nest_service("/static", ServeDir::new(&config.site.static_dir))
            .with_state(state)
            .layer(middleware::from_fn_with_state(csrf, csrf_middleware));

        let router = match rate_limiter {
            Some(limiter) => router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware)),
            None => router,
        };

        router
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(middleware::from_fn(nonce_middleware))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            site = %self.config.site.name,
            rate_limit = ?self.rate_limiter.as_ref().map(|l| l.max_requests()),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The rate limiter, when enabled.
    pub fn rate_limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.rate_limiter.as_ref()
    }
}

/// Load templates and fail early if a page or email template is missing.
fn load_renderer(config: &SiteConfig) -> Result<Arc<Renderer>, ServerError> {
    let dir = &config.site.templates_dir;
    let renderer = Renderer::from_dir(dir)?;

    let required = PAGE_TEMPLATES
        .into_iter()
        .chain([CONFIRMATION_TEMPLATE, ADMIN_TEMPLATE]);
    for template in required {
        if !renderer.has_template(template) {
            return Err(ServerError::MissingTemplate {
                template,
                dir: dir.clone(),
            });
        }
    }
    Ok(Arc::new(renderer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::validation::CleanedSchedule;

    struct SilentNotifier;

    #[async_trait]
    impl Notifier for SilentNotifier {
        async fn send_confirmation(&self, _: &CleanedSchedule) -> Result<(), NotifyError> {
            Ok(())
        }

        async fn notify_admin(&self, _: &CleanedSchedule) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn server(max_requests: usize) -> HttpServer {
        let mut config = SiteConfig::default();
        config.rate_limit.max_requests = max_requests;
        HttpServer::with_notifier(config, Arc::new(SilentNotifier)).unwrap()
    }

    fn csp_nonce(response: &axum::response::Response) -> String {
        let csp = response.headers()[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
        let start = csp.find("'nonce-").unwrap() + "'nonce-".len();
        let end = start + csp[start..].find('\'').unwrap();
        csp[start..end].to_string()
    }

    #[tokio::test]
    async fn test_page_nonce_matches_header() {
        let response = server(10)
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let nonce = csp_nonce(&response);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(&format!("nonce=\"{}\"", nonce)));
    }

    #[tokio::test]
    async fn test_rejection_still_gets_security_headers() {
        let response = server(10)
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/schedule-trial")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_rate_limit_runs_before_csrf() {
        let server = server(1);
        let router = server.router();

        let first = router
            .clone()
            .oneshot(Request::get("/colors/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        // Over the limit: rejected with 429 even though the Origin is bad too.
        let second = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/schedule-trial")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(server.rate_limiter().unwrap().in_window("unknown"), 1);
    }

    #[test]
    fn test_missing_page_template_fails_startup() {
        let mut config = SiteConfig::default();
        config.site.templates_dir = "templates/emails".to_string();

        let err = HttpServer::with_notifier(config, Arc::new(SilentNotifier))
            .err()
            .expect("page templates live outside templates/emails");
        assert!(matches!(err, ServerError::MissingTemplate { template: "home.html", .. }));
    }

    #[tokio::test]
    async fn test_disabled_rate_limit_has_no_limiter() {
        let mut config = SiteConfig::default();
        config.rate_limit.enabled = false;
        let server = HttpServer::with_notifier(config, Arc::new(SilentNotifier)).unwrap();
        assert!(server.rate_limiter().is_none());
    }
}
