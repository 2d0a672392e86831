//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields that are never written to the logs.
const REDACTED_FIELDS: [&str; 2] = ["latitude", "longitude"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// The coordinates in submitted forms are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = match read_body(request.into_parts()).await {
        Ok(parts_and_body) => parts_and_body,
        Err(error) => return error.into_response(),
    };

    let is_form = parts.headers.get(CONTENT_TYPE)
        == Some(&HeaderValue::from_static(
            "application/x-www-form-urlencoded",
        ));

    if is_form {
        log_request(&parts, &redact_fields(&body_text, &REDACTED_FIELDS));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = match read_body(response.into_parts()).await {
        Ok(parts_and_body) => parts_and_body,
        Err(error) => return error.into_response(),
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn read_body<P>((parts, body): (P, Body)) -> Result<(P, String), Error> {
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|error| {
            tracing::error!("could not read body for logging: {error}");
            Error::BodyReadError(error.to_string())
        })?;

    Ok((parts, String::from_utf8_lossy(&body_bytes).to_string()))
}

/// Replace the values of `fields` in URL encoded form text.
fn redact_fields(form_text: &str, fields: &[&str]) -> String {
    form_text
        .split('&')
        .map(|pair| {
            let key = pair.split_once('=').map_or(pair, |(key, _)| key);

            if fields.contains(&key) {
                format!("{key}=********")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The longest prefix of `text` that is at most `limit` bytes and ends on a character boundary.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let end = (0..=limit)
        .rev()
        .find(|&index| text.is_char_boundary(index))
        .unwrap_or(0);

    &text[..end]
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::{logging_middleware, redact_fields, truncate};

    #[test]
    fn redacts_coordinates() {
        let got = redact_fields(
            "salary_amount=4400&latitude=-23.5&longitude=-46.6&start=08%3A00",
            &["latitude", "longitude"],
        );

        assert_eq!(
            got,
            "salary_amount=4400&latitude=********&longitude=********&start=08%3A00"
        );
    }

    #[test]
    fn leaves_other_fields_alone() {
        assert_eq!(
            redact_fields("name=Mall&notes=lat", &["latitude"]),
            "name=Mall&notes=lat"
        );
    }

    #[test]
    fn truncate_respects_character_boundaries() {
        assert_eq!(truncate("R$ç", 3), "R$");
        assert_eq!(truncate("short", 64), "short");
    }

    #[tokio::test]
    async fn passes_request_and_response_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server");

        let response = server
            .post("/echo")
            .form(&[("latitude", "1"), ("longitude", "2")])
            .await;

        response.assert_status_ok();
        response.assert_text("latitude=1&longitude=2");
    }
}
