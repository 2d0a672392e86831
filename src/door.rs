//! The community message board on the toilet door.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    language::{Language, Phrase, language_or_default},
    navigation::NavBar,
    remote::{DoorMessage, RemoteClient},
};

/// The number of messages that fit on the door.
pub const DOOR_CAPACITY: usize = 20;

/// The state needed for the door page.
#[derive(Debug, Clone)]
pub struct DoorState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub remote: RemoteClient,
}

impl FromRef<AppState> for DoorState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            remote: state.remote.clone(),
        }
    }
}

/// Render the messages written on the door.
///
/// The door is shown empty if the messages cannot be fetched.
pub async fn get_door_page(State(state): State<DoorState>) -> Response {
    let language = match state.db_connection.lock() {
        Ok(connection) => language_or_default(&*connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let messages = state.remote.retrieve_messages().await.unwrap_or_else(|error| {
        tracing::error!("could not get the door messages: {error}");
        Vec::new()
    });

    door_view(&messages, language).into_response()
}

fn door_view(messages: &[DoorMessage], language: Language) -> Markup {
    let nav_bar = NavBar::new(endpoints::DOOR_VIEW, language).into_html();
    let shown = &messages[..messages.len().min(DOOR_CAPACITY)];

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-2" { (language.text(Phrase::ToiletDoor)) }

            p id="door-capacity" class="mb-6 text-sm"
            {
                (shown.len()) "/" (DOOR_CAPACITY) " " (language.text(Phrase::Filled))
            }

            @if shown.is_empty() {
                p { (language.text(Phrase::NoMessages)) }
            } @else {
                ul
                    id="door-messages"
                    class="w-full max-w-3xl grid grid-cols-2 md:grid-cols-4 gap-4 p-6
                        rounded-lg bg-amber-900 text-amber-50"
                {
                    @for message in shown {
                        li class="font-mono -rotate-2 break-words" { (message.message) }
                    }
                }
            }
        }
    };

    base(language.text(Phrase::ToiletDoor), language, &content)
}

#[cfg(test)]
mod door_tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
    use rusqlite::Connection;
    use scraper::Selector;
    use serde_json::json;

    use crate::{
        remote::{RemoteClient, paths, test_server::spawn_fake_remote},
        store::initialize,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{DoorState, get_door_page};

    fn get_state(base_url: &str) -> DoorState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DoorState {
            db_connection: Arc::new(Mutex::new(connection)),
            remote: RemoteClient::new(base_url, Duration::from_secs(5)).unwrap(),
        }
    }

    fn capacity_text(html: &scraper::Html) -> String {
        html.select(&Selector::parse("#door-capacity").unwrap())
            .next()
            .expect("No capacity text found")
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn shows_messages_and_capacity() {
        let router = Router::new().route(
            paths::RETRIEVE_MESSAGES,
            get(|| async { Json(json!([{ "message": "oi" }, { "message": "tchau" }])) }),
        );
        let base_url = spawn_fake_remote(router).await;

        let response = get_door_page(State(get_state(&base_url))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(capacity_text(&html), "2/20 espaços foram preenchidos.");
        let messages = html
            .select(&Selector::parse("#door-messages li").unwrap())
            .map(|li| li.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(messages, vec!["oi", "tchau"]);
    }

    #[tokio::test]
    async fn shows_at_most_twenty_messages() {
        let router = Router::new().route(
            paths::RETRIEVE_MESSAGES,
            get(|| async {
                let messages = (0..25)
                    .map(|i| json!({ "message": format!("message {i}") }))
                    .collect::<Vec<_>>();
                Json(messages)
            }),
        );
        let base_url = spawn_fake_remote(router).await;

        let response = get_door_page(State(get_state(&base_url))).await;

        let html = parse_html_document(response).await;
        assert_eq!(capacity_text(&html), "20/20 espaços foram preenchidos.");
    }

    #[tokio::test]
    async fn unreachable_remote_shows_empty_door() {
        let response = get_door_page(State(get_state("http://127.0.0.1:9"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_eq!(capacity_text(&html), "0/20 espaços foram preenchidos.");
    }
}
