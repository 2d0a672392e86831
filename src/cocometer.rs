//! The cocometer: how much everyone has earned on the toilet.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    history::{CurrencyTotals, aggregate, totals_view},
    html::{PAGE_CONTAINER_STYLE, base},
    language::{Language, Phrase, language_or_default},
    navigation::NavBar,
    remote::RemoteClient,
};

/// The state needed for the cocometer page.
#[derive(Debug, Clone)]
pub struct CocometerState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub remote: RemoteClient,
}

impl FromRef<AppState> for CocometerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            remote: state.remote.clone(),
        }
    }
}

/// Render the totals of every record in the remote store.
///
/// Currencies nobody has earned anything in are hidden.
pub async fn get_cocometer_page(State(state): State<CocometerState>) -> Response {
    let language = match state.db_connection.lock() {
        Ok(connection) => language_or_default(&*connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let totals = match state.remote.list_location_data().await {
        Ok(records) => aggregate(&records),
        Err(error) => {
            tracing::error!("could not get the global history: {error}");
            CurrencyTotals::default()
        }
    };

    cocometer_view(&totals, language).into_response()
}

fn cocometer_view(totals: &CurrencyTotals, language: Language) -> Markup {
    let nav_bar = NavBar::new(endpoints::COCOMETER_VIEW, language).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { "💩 " (language.text(Phrase::Cocometer)) }

            (totals_view(totals, language.text(Phrase::Total), true))
        }
    };

    base(language.text(Phrase::Cocometer), language, &content)
}
