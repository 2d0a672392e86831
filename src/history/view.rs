//! History page and record deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    history::{LocationRecord, aggregate, delete_record, load_history, totals_view},
    html::{
        BUTTON_DELETE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base,
    },
    language::{Language, Phrase, language_or_default},
    navigation::NavBar,
};

/// The state needed for the history page and endpoints.
#[derive(Debug, Clone)]
pub struct HistoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the history page with the totals of every recorded amount.
pub async fn get_history_page(State(state): State<HistoryState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let records = match load_history(&*connection) {
        Ok(records) => records,
        Err(error) => return error.into_response(),
    };
    let language = language_or_default(&*connection);

    history_view(&records, language).into_response()
}

/// Delete the record at `index` and respond with the updated history.
///
/// Positions shift after a deletion, so the whole history section is sent
/// back to keep the delete buttons pointing at the right records.
pub async fn delete_history_record_endpoint(
    Path(index): Path<usize>,
    State(state): State<HistoryState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = delete_record(index, &*connection) {
        tracing::error!("could not delete history record {index}: {error}");
        return error.into_alert_response();
    }

    let records = match load_history(&*connection) {
        Ok(records) => records,
        Err(error) => return error.into_alert_response(),
    };

    history_section(&records, language_or_default(&*connection)).into_response()
}

fn history_view(records: &[LocationRecord], language: Language) -> Markup {
    let nav_bar = NavBar::new(endpoints::HISTORY_VIEW, language).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { (language.text(Phrase::History)) }

            (history_section(records, language))
        }
    };

    base(language.text(Phrase::History), language, &content)
}

fn history_section(records: &[LocationRecord], language: Language) -> Markup {
    let totals = aggregate(records);

    html! {
        div id="history" class="w-full flex flex-col items-center"
        {
            (totals_view(&totals, language.text(Phrase::Total), false))

            @if records.is_empty() {
                p class="text-lg" { (language.text(Phrase::NothingYet)) }
            } @else {
                div class="relative overflow-x-auto shadow-md rounded-lg w-full max-w-3xl"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { (language.text(Phrase::Date)) }
                                th scope="col" class=(TABLE_CELL_STYLE) { (language.text(Phrase::Amount)) }
                                th scope="col" class=(TABLE_CELL_STYLE) { (language.text(Phrase::Location)) }
                                th scope="col" class=(TABLE_CELL_STYLE) {}
                            }
                        }

                        tbody
                        {
                            @for (index, record) in records.iter().enumerate().rev() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (record.day) " " (record.time_started) "–" (record.time_ended)
                                    }
                                    td class=(TABLE_CELL_STYLE) { (record.total_earned.display()) }
                                    td class=(TABLE_CELL_STYLE) { (record.place_label()) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        button
                                            type="button"
                                            hx-delete=(format_endpoint(endpoints::DELETE_HISTORY_RECORD, index))
                                            hx-target="#history"
                                            hx-swap="outerHTML"
                                            hx-target-error="#alert-container"
                                            class=(BUTTON_DELETE_STYLE)
                                        {
                                            (language.text(Phrase::Delete))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod history_view_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        history::{LocationRecord, TotalEarned, append_record, load_history},
        store::initialize,
        test_utils::{assert_valid_html, parse_html_document, parse_html_fragment},
    };

    use super::{HistoryState, delete_history_record_endpoint, get_history_page};

    fn get_state() -> HistoryState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not create tables");

        HistoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn record(amount: &str, city: Option<&str>) -> LocationRecord {
        LocationRecord {
            latitude: 0.0,
            longitude: 0.0,
            total_earned: TotalEarned::Formatted(amount.to_owned()),
            time_started: "08:00".to_owned(),
            time_ended: "09:00".to_owned(),
            day: "18/10/2026".to_owned(),
            city: city.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn empty_history_shows_message() {
        let response = get_history_page(State(get_state())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Nenhum 💩 ainda"), "got page text {text:?}");
    }

    #[tokio::test]
    async fn lists_records_and_totals() {
        let state = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            append_record(record("R$10.00", Some("Recife")), &*connection).unwrap();
            append_record(record("$5.00", None), &*connection).unwrap();
        }

        let response = get_history_page(State(state)).await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = html.select(&Selector::parse("tbody tr").unwrap()).count();
        assert_eq!(rows, 2);
        let totals = html
            .select(&Selector::parse("[data-currency] p.font-bold").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(totals, vec!["R$10.00", "$5.00", "€0.00"]);
    }

    #[tokio::test]
    async fn delete_returns_updated_section() {
        let state = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            append_record(record("R$10.00", Some("Recife")), &*connection).unwrap();
            append_record(record("$5.00", None), &*connection).unwrap();
        }

        let response = delete_history_record_endpoint(Path(0), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let rows = html.select(&Selector::parse("tbody tr").unwrap()).count();
        assert_eq!(rows, 1);
        assert_eq!(
            load_history(&*state.db_connection.lock().unwrap()),
            Ok(vec![record("$5.00", None)])
        );
    }

    #[tokio::test]
    async fn delete_missing_record_is_not_found() {
        let response = delete_history_record_endpoint(Path(3), State(get_state())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
