use hyper::{
    header::{HeaderValue, CONTENT_TYPE, LOCATION},
    Body, Response, StatusCode,
};
use serde::Serialize;
use tracing::error;

fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Body>,
) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

pub fn text(status: StatusCode, message: &'static str) -> Response<Body> {
    with_content_type(status, "text/plain; charset=utf-8", message)
}

pub fn not_found() -> Response<Body> {
    text(StatusCode::NOT_FOUND, "Not found")
}

pub fn internal_error() -> Response<Body> {
    text(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => with_content_type(StatusCode::OK, "application/json", body),
        Err(e) => {
            error!("Failed to serialize response {e:?}");
            internal_error()
        }
    }
}

pub fn html(body: Vec<u8>) -> Response<Body> {
    with_content_type(StatusCode::OK, "text/html; charset=utf-8", body)
}

pub fn redirect(location: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    response
        .headers_mut()
        .insert(LOCATION, HeaderValue::from_static(location));
    response
}
