//! Server-rendered pages.

use axum::{extract::State, response::Html, Extension};

use crate::error::SiteError;
use crate::http::server::AppState;
use crate::security::CspNonce;

pub const HOME_TEMPLATE: &str = "home.html";
pub const COLORS_TEMPLATE: &str = "colors.html";
pub const INSTITUTIONAL_TEMPLATE: &str = "institucional.html";

/// Templates the page routes render.
pub const PAGE_TEMPLATES: [&str; 3] = [HOME_TEMPLATE, COLORS_TEMPLATE, INSTITUTIONAL_TEMPLATE];

fn render(state: &AppState, template: &str, title: &str, nonce: &CspNonce) -> Result<Html<String>, SiteError> {
    let html = state.renderer.render_page(template, title, nonce.value())?;
    Ok(Html(html))
}

pub async fn home(
    State(state): State<AppState>,
    Extension(nonce): Extension<CspNonce>,
) -> Result<Html<String>, SiteError> {
    render(&state, HOME_TEMPLATE, &state.site_name, &nonce)
}

pub async fn colors(
    State(state): State<AppState>,
    Extension(nonce): Extension<CspNonce>,
) -> Result<Html<String>, SiteError> {
    render(&state, COLORS_TEMPLATE, "Palettes", &nonce)
}

pub async fn institutional(
    State(state): State<AppState>,
    Extension(nonce): Extension<CspNonce>,
) -> Result<Html<String>, SiteError> {
    render(&state, INSTITUTIONAL_TEMPLATE, "Institucional", &nonce)
}
