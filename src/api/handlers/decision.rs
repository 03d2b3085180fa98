use crate::{
    api::handlers::{navigation_event, NavigationQuery},
    gate::{Decision, Exchange, RedirectForm, SsoGate},
};
use axum::{
    extract::{Extension, Query},
    http::{header::CACHE_CONTROL, HeaderMap},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize, Debug)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum DecisionBody<'a> {
    Passthrough { cancel: bool, href: &'a str },
    Redirect { cancel: bool, form: &'a RedirectForm },
}

impl<'a> From<&'a Decision> for DecisionBody<'a> {
    fn from(decision: &'a Decision) -> Self {
        let cancel = decision.cancels_navigation();

        match decision {
            Decision::Passthrough { href } => Self::Passthrough {
                cancel,
                href: href.as_str(),
            },
            Decision::Redirect(form) => Self::Redirect { cancel, form },
        }
    }
}

/// Resolve a navigation and return the decision for front-end code to act on.
pub async fn decision<E: Exchange + 'static>(
    gate: Extension<Arc<SsoGate<E>>>,
    headers: HeaderMap,
    Query(query): Query<NavigationQuery>,
) -> Response {
    let event = match navigation_event(gate.0.as_ref(), query, &headers) {
        Ok(event) => event,
        Err(rejection) => return rejection.into_response(),
    };

    let decision = gate.resolve(&event).await;

    (
        [(CACHE_CONTROL, "no-store")],
        Json(DecisionBody::from(&decision)),
    )
        .into_response()
}
