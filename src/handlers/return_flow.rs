//! The return handler: one linear pass from callback validation to a
//! terminal redirect, with a single failure boundary that itself always
//! ends in a redirect.

use axum::{
    extract::{RawQuery, State},
    response::Redirect,
};
use url::Url;

use crate::db::AppState;
use crate::error::{ReturnError, Result};
use crate::gateway::GATEWAY_ID;
use crate::orders::{self, OrderService};
use crate::reconcile::{self, ReconcileOutcome};

/// Read-only view over the callback's query parameters.
///
/// Parsed by hand from the raw query string so that a malformed callback
/// still reaches the validator (and therefore the failure redirect) instead
/// of being rejected at the extractor layer.
#[derive(Debug, Default)]
pub struct ReturnParams {
    pub order_id: Option<String>,
    pub token: Option<String>,
}

impl ReturnParams {
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "orderId" if params.order_id.is_none() => {
                    params.order_id = Some(value.into_owned());
                }
                "token" if params.token.is_none() => params.token = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Syntactic validation only: the referenced payment is not checked for
/// existence here.
fn validate(params: &ReturnParams) -> Result<(&str, &str)> {
    let order_id = params
        .order_id
        .as_deref()
        .ok_or(ReturnError::Validation("orderId"))?;
    let token = params
        .token
        .as_deref()
        .ok_or(ReturnError::Validation("token"))?;
    Ok((order_id, token))
}

/// Entry point for the provider's return redirect.
///
/// Always answers with a redirect: the happy path ends at the gateway's
/// order-received page, every failure is caught here exactly once, logged,
/// and converted into a safe failure redirect.
pub async fn payment_return(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Redirect {
    let params = ReturnParams::parse(query.as_deref().unwrap_or(""));
    let mut resolved: Option<OrderService> = None;

    match process(&state, &params, &mut resolved).await {
        Ok(redirect) => redirect,
        Err(err) => handle_failure(&state, &params, resolved, err),
    }
}

/// The VALIDATED -> RESOLVED -> FETCHED -> RECONCILED pipeline. Strictly
/// sequential; any error short-circuits to the caller's failure boundary.
///
/// The resolved order is written through `resolved` so the failure path can
/// reuse it for a better redirect target.
async fn process(
    state: &AppState,
    params: &ReturnParams,
    resolved: &mut Option<OrderService>,
) -> Result<Redirect> {
    let (payment_reference, _token) = validate(params)?;

    let service = {
        let conn = state.db.get()?;
        orders::resolve(&conn, payment_reference, &state.checkout_url)?
    };
    let service = resolved.insert(service);

    let record = state.status_source.fetch_status(payment_reference).await?;

    let outcome = {
        let conn = state.db.get()?;
        reconcile::reconcile(&conn, &record, service.order(), payment_reference)?
    };

    Ok(match outcome {
        ReconcileOutcome::Paid => route_success(state, service),
        ReconcileOutcome::Pending => redirect_with_notice(
            state,
            Some(service.payment_url()),
            "Your payment is still being processed.",
            "notice",
        ),
        ReconcileOutcome::Failed(reason) => failure_redirect(state, Some(service.payment_url()), &reason),
    })
}

/// Route a reconciled-paid order to the gateway's order-received page.
///
/// A missing gateway is non-fatal: the shopper gets a notice and lands on
/// the order's payment-retry page instead.
fn route_success(state: &AppState, service: &OrderService) -> Redirect {
    match state.gateways.lookup(GATEWAY_ID) {
        Some(gateway) => {
            safe_redirect(&state.checkout_url, &gateway.return_url(service.order()), &[])
        }
        None => {
            tracing::warn!(gateway = GATEWAY_ID, "no registered payment gateway");
            failure_redirect(
                state,
                Some(service.payment_url()),
                "Cannot find payment gateway.",
            )
        }
    }
}

/// The single failure boundary. Logs the error in full, then computes a
/// best-effort redirect target: the already-resolved order's payment page,
/// else a fresh resolution by `orderId` (whose own failure is logged and
/// swallowed), else the generic checkout page.
fn handle_failure(
    state: &AppState,
    params: &ReturnParams,
    resolved: Option<OrderService>,
    err: ReturnError,
) -> Redirect {
    tracing::error!(error = ?err, "payment return failed");

    let target = match resolved {
        Some(service) => Some(service.payment_url()),
        None => params.order_id.as_deref().and_then(|payment_reference| {
            let attempt = state
                .db
                .get()
                .map_err(ReturnError::from)
                .and_then(|conn| orders::resolve(&conn, payment_reference, &state.checkout_url));
            match attempt {
                Ok(service) => Some(service.payment_url()),
                Err(fallback_err) => {
                    tracing::error!(error = ?fallback_err, "fallback order resolution failed");
                    None
                }
            }
        }),
    };

    failure_redirect(state, target, &err.user_message())
}

fn failure_redirect(state: &AppState, target: Option<String>, notice: &str) -> Redirect {
    redirect_with_notice(state, target, notice, "error")
}

fn redirect_with_notice(
    state: &AppState,
    target: Option<String>,
    notice: &str,
    notice_type: &str,
) -> Redirect {
    let target = target.unwrap_or_else(|| state.checkout_url.clone());
    safe_redirect(
        &state.checkout_url,
        &target,
        &[("notice", notice), ("notice_type", notice_type)],
    )
}

/// Issue the terminal redirect.
fn safe_redirect(checkout_url: &str, target: &str, params: &[(&str, &str)]) -> Redirect {
    Redirect::to(&append_query_params(
        &sanitize_target(checkout_url, target),
        params,
    ))
}

/// Only absolute http(s) URLs are accepted as redirect targets; anything
/// else falls back to the checkout page. All targets are built locally or
/// by the gateway, never taken from callback parameters.
fn sanitize_target(checkout_url: &str, target: &str) -> String {
    match Url::parse(target) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => target.to_string(),
        _ => {
            tracing::warn!(url = %target, "refusing redirect to non-http target");
            checkout_url.to_string()
        }
    }
}

/// Append query parameters to a URL that may already carry some.
fn append_query_params(base_url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return base_url.to_string();
    }

    let query_string: String = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    if base_url.contains('?') {
        format!("{}&{}", base_url, query_string)
    } else {
        format!("{}?{}", base_url, query_string)
    }
}
