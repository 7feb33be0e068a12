//! Trial-class booking endpoint.

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::error::SiteError;
use crate::http::response::{ApiResponse, Popup};
use crate::http::server::AppState;
use crate::notify;
use crate::observability::metrics;
use crate::validation::{validate, ScheduleSubmission};

/// `POST /schedule-trial`
///
/// The booking succeeds once validated; emails go out afterwards and their
/// failures never reach the client.
pub async fn schedule_trial(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, SiteError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected booking with malformed JSON");
        metrics::record_submission("malformed");
        SiteError::MalformedPayload(e.to_string())
    })?;

    let submission = ScheduleSubmission::from_value(value).ok_or_else(|| {
        tracing::warn!("Rejected booking whose body is not a JSON object");
        metrics::record_submission("malformed");
        SiteError::MalformedPayload("expected a JSON object".to_string())
    })?;

    let booking = validate(&submission).map_err(|errors| {
        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        tracing::info!(fields = ?fields, "Booking failed validation");
        metrics::record_submission("invalid");
        SiteError::Validation(errors)
    })?;

    tracing::info!(
        name = %booking.name,
        date = %booking.date,
        timeslot = %booking.timeslot,
        "Booking validated"
    );
    metrics::record_submission("accepted");

    let message = format!(
        "{}, recebemos seu agendamento. Você receberá um e-mail de confirmação em breve.",
        booking.name
    );
    notify::dispatch(state.notifier.clone(), booking);

    Ok(Json(ApiResponse::ok(Popup::success("Agendamento recebido", message))))
}
