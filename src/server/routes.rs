use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error};

use crate::{
    analysis::{list_users, mean_by_weekday, start_end_by_weekday, total_by_weekday},
    error::AnalyzerError,
    storage::entities::UserId,
};

use super::{pages::render_page, response, AppState};

pub const DEFAULT_PAGE: &str = "/presence_weekday.html";

#[derive(Debug, Clone, Copy)]
enum WeekdayView {
    MeanTime,
    Presence,
    StartEnd,
}

/// Row of the presence table. The first row is a header for the chart on the page.
#[derive(Serialize)]
#[serde(untagged)]
enum PresenceRow {
    Header(&'static str, &'static str),
    Total(&'static str, i64),
}

fn with_presence_header(totals: Vec<(&'static str, i64)>) -> Vec<PresenceRow> {
    let mut rows = Vec::with_capacity(totals.len() + 1);
    rows.push(PresenceRow::Header("Weekday", "Presence (s)"));
    rows.extend(
        totals
            .into_iter()
            .map(|(label, total)| PresenceRow::Total(label, total)),
    );
    rows
}

fn respond<T: Serialize>(result: Result<T, AnalyzerError>) -> Response<Body> {
    match result {
        Ok(v) => response::json(&v),
        Err(e @ AnalyzerError::UserNotFound(_)) => {
            debug!("{e}");
            response::not_found()
        }
    }
}

async fn users(state: &AppState) -> Response<Body> {
    match state.source.load().await {
        Ok(data) => response::json(&list_users(&data)),
        Err(e) => {
            error!("Failed to load presence data {e:?}");
            response::internal_error()
        }
    }
}

/// Only plain decimal digits without a sign or leading zeros form a user id.
fn parse_user_segment(segment: &str) -> Option<UserId> {
    let canonical = segment.bytes().all(|b| b.is_ascii_digit())
        && !(segment.len() > 1 && segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

async fn weekday_view(state: &AppState, user_segment: &str, view: WeekdayView) -> Response<Body> {
    // Same as an unknown user, there is no such route
    let Some(user_id) = parse_user_segment(user_segment) else {
        return response::not_found();
    };

    let data = match state.source.load().await {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to load presence data {e:?}");
            return response::internal_error();
        }
    };

    match view {
        WeekdayView::MeanTime => respond(mean_by_weekday(&data, user_id)),
        WeekdayView::Presence => {
            respond(total_by_weekday(&data, user_id).map(with_presence_header))
        }
        WeekdayView::StartEnd => respond(start_end_by_weekday(&data, user_id)),
    }
}

/// Entry point for every HTTP request.
pub async fn handle_request(req: Request<Body>, state: &AppState) -> Response<Body> {
    let path = req.uri().path();
    debug!("{} {path}", req.method());

    if req.method() != Method::GET {
        return response::text(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let segments = path.trim_start_matches('/').split('/').collect::<Vec<_>>();
    match segments.as_slice() {
        [""] => response::redirect(DEFAULT_PAGE),
        ["api", "v1", "users"] => users(state).await,
        ["api", "v1", "mean_time_weekday", user] => {
            weekday_view(state, user, WeekdayView::MeanTime).await
        }
        ["api", "v1", "presence_weekday", user] => {
            weekday_view(state, user, WeekdayView::Presence).await
        }
        ["api", "v1", "presence_start_end", user] => {
            weekday_view(state, user, WeekdayView::StartEnd).await
        }
        [page] => render_page(&state.pages_dir, page).await,
        _ => response::not_found(),
    }
}
