//! The shareable certificate of an amount earned.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    currency::{Currency, format_currency},
    endpoints,
    language::{Language, Phrase, language_or_default},
};

/// The state needed for rendering a certificate.
#[derive(Debug, Clone)]
pub struct CertificateState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CertificateState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CertificateQuery {
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// The link to the downloadable certificate for `amount` in `currency`.
pub fn certificate_url(amount: f64, currency: Currency) -> String {
    format!(
        "{}?amount={amount}&currency={}",
        endpoints::CERTIFICATE,
        currency.code()
    )
}

/// Serve the certificate as an SVG file download.
pub async fn get_certificate(
    State(state): State<CertificateState>,
    Query(query): Query<CertificateQuery>,
) -> Response {
    let currency = match query.currency.as_deref().map(str::parse::<Currency>) {
        None => Currency::default(),
        Some(Ok(currency)) => currency,
        Some(Err(error)) => return error.into_alert_response(),
    };

    let language = match state.db_connection.lock() {
        Ok(connection) => language_or_default(&*connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let svg = certificate_svg(&format_currency(query.amount, currency), language);

    (
        [
            (CONTENT_TYPE, "image/svg+xml"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"cocoladora-certificate.svg\"",
            ),
        ],
        svg.into_string(),
    )
        .into_response()
}

/// The certificate image for a formatted amount.
///
/// Every element is closed explicitly so the markup is also valid as a standalone SVG file.
pub fn certificate_svg(formatted_amount: &str, language: Language) -> Markup {
    html! {
        svg
            xmlns="http://www.w3.org/2000/svg"
            width="600"
            height="315"
            viewBox="0 0 600 315"
            role="img"
            aria-label=(format!(
                "{} {formatted_amount} {}",
                language.text(Phrase::IveEarned),
                language.text(Phrase::WhileMeditating)
            ))
        {
            rect width="600" height="315" rx="24" fill="#78350f" {}
            rect x="12" y="12" width="576" height="291" rx="16" fill="#fffbeb" {}

            text x="300" y="80" text-anchor="middle" font-size="48" { "💩" }
            text
                x="300" y="130" text-anchor="middle" font-size="24"
                font-family="sans-serif" fill="#451a03"
            {
                (language.text(Phrase::IveEarned))
            }
            text
                x="300" y="190" text-anchor="middle" font-size="48" font-weight="bold"
                font-family="sans-serif" fill="#92400e"
            {
                (formatted_amount)
            }
            text
                x="300" y="235" text-anchor="middle" font-size="22"
                font-family="sans-serif" fill="#451a03"
            {
                (language.text(Phrase::WhileMeditating))
            }
            text
                x="300" y="285" text-anchor="middle" font-size="16"
                font-family="sans-serif" fill="#a16207"
            {
                "cocoladora"
            }
        }
    }
}

#[cfg(test)]
mod certificate_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        currency::Currency,
        language::{Language, save_language},
        store::initialize,
        test_utils::get_header,
    };

    use super::{
        CertificateQuery, CertificateState, certificate_svg, certificate_url, get_certificate,
    };

    fn get_state() -> CertificateState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CertificateState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn svg_text(markup: &str) -> Vec<String> {
        let html = Html::parse_fragment(markup);

        html.select(&Selector::parse("text").unwrap())
            .map(|text| text.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[test]
    fn certificate_shows_amount_and_phrases() {
        let markup = certificate_svg("R$25.00", Language::En).into_string();

        assert_eq!(
            svg_text(&markup),
            vec![
                "💩",
                "I've earned",
                "R$25.00",
                "while meditating in the toilet",
                "cocoladora"
            ]
        );
    }

    #[test]
    fn url_carries_amount_and_currency() {
        assert_eq!(
            certificate_url(12.5, Currency::USD),
            "/certificate.svg?amount=12.5&currency=USD"
        );
    }

    #[tokio::test]
    async fn serves_svg_download_in_stored_language() {
        let state = get_state();
        save_language(Language::Pt, &*state.db_connection.lock().unwrap()).unwrap();

        let response = get_certificate(
            State(state),
            Query(CertificateQuery {
                amount: 25.0,
                currency: Some("BRL".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(get_header(&response, "content-type"), "image/svg+xml");
        assert!(get_header(&response, "content-disposition").starts_with("attachment"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = svg_text(&String::from_utf8_lossy(&body));
        assert!(text.contains(&"Eu recebi".to_owned()));
        assert!(text.contains(&"R$25.00".to_owned()));
    }

    #[tokio::test]
    async fn unknown_currency_is_rejected() {
        let response = get_certificate(
            State(get_state()),
            Query(CertificateQuery {
                amount: 1.0,
                currency: Some("GBP".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
