//! Route table.
//!
//! Every page and endpoint is registered here as method + path → handler.
//! `/static` is mounted separately by the server.

use axum::{
    handler::Handler,
    http::Method,
    routing::{get, post, MethodRouter},
    Router,
};

use crate::handlers::{pages, schedule};
use crate::http::server::AppState;

pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub handler: MethodRouter<AppState>,
}

impl Route {
    pub fn get<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            method: Method::GET,
            path,
            handler: get(handler),
        }
    }

    pub fn post<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            method: Method::POST,
            path,
            handler: post(handler),
        }
    }
}

/// The site's routes.
pub fn route_table() -> Vec<Route> {
    vec![
        Route::get("/", pages::home),
        Route::get("/colors/", pages::colors),
        Route::get("/institucional/", pages::institutional),
        Route::post("/schedule-trial", schedule::schedule_trial),
    ]
}

/// Add every route in `table` to `router`.
pub fn register(router: Router<AppState>, table: Vec<Route>) -> Router<AppState> {
    table.into_iter().fold(router, |router, route| {
        tracing::debug!(method = %route.method, path = route.path, "Registering route");
        router.route(route.path, route.handler)
    })
}
