use crate::{
    api::handlers::{navigation_event, NavigationQuery},
    gate::{Decision, Exchange, SsoGate},
};
use axum::{
    extract::{Extension, Query},
    http::{header::CACHE_CONTROL, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Perform the navigation: `303` to the original link, or the auto-submitting
/// SSO form.
pub async fn navigate<E: Exchange + 'static>(
    gate: Extension<Arc<SsoGate<E>>>,
    headers: HeaderMap,
    Query(query): Query<NavigationQuery>,
) -> Response {
    let event = match navigation_event(gate.0.as_ref(), query, &headers) {
        Ok(event) => event,
        Err(rejection) => return rejection.into_response(),
    };

    match gate.resolve(&event).await {
        Decision::Passthrough { href } => Redirect::to(href.as_str()).into_response(),
        Decision::Redirect(form) => {
            ([(CACHE_CONTROL, "no-store")], Html(form.to_html())).into_response()
        }
    }
}
