//! The rate a place page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner, rating_stars,
    },
    language::{Language, Phrase, language_or_default},
    navigation::NavBar,
    place::{Notes, Place, Rating, whole_stars},
    remote::RemoteClient,
};

/// The state needed for rating places.
#[derive(Debug, Clone)]
pub struct RatePlaceState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub remote: RemoteClient,
}

impl FromRef<AppState> for RatePlaceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            remote: state.remote.clone(),
        }
    }
}

/// The rate a place form. The browser fills in the coordinates before submitting.
///
/// Every field is read as text so that an incomplete submission reaches the
/// handler and gets a message in the user's language.
#[derive(Debug, Default, Deserialize)]
pub struct RatePlaceForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub clean_rating: String,
    #[serde(default)]
    pub facilities_rating: String,
    #[serde(default)]
    pub privacy_rating: String,
    #[serde(default)]
    pub notes: String,
}

fn parse_rating(text: &str) -> Option<Rating> {
    text.trim()
        .parse::<u8>()
        .ok()
        .and_then(|stars| Rating::new(stars).ok())
}

impl RatePlaceForm {
    /// Convert the form into a place, `None` if a rating or the position is
    /// missing or cannot be read.
    fn into_place(self) -> Option<Place> {
        let clean_rating = parse_rating(&self.clean_rating)?;
        let facilities_rating = parse_rating(&self.facilities_rating)?;
        let privacy_rating = parse_rating(&self.privacy_rating)?;

        let (Ok(latitude), Ok(longitude)) = (
            self.latitude.trim().parse::<f64>(),
            self.longitude.trim().parse::<f64>(),
        ) else {
            return None;
        };

        let name = self.name.trim();
        let notes = self.notes.trim();

        Some(Place {
            latitude,
            longitude,
            id: None,
            name: (!name.is_empty()).then(|| name.to_owned()),
            clean_rating: Some(f64::from(clean_rating.get())),
            facilities_rating: Some(f64::from(facilities_rating.get())),
            privacy_rating: Some(f64::from(privacy_rating.get())),
            notes: (!notes.is_empty()).then(|| Notes::One(notes.to_owned())),
        })
    }
}

/// Render the rating form and the places rated so far.
pub async fn get_rate_page(State(state): State<RatePlaceState>) -> Response {
    let language = match state.db_connection.lock() {
        Ok(connection) => language_or_default(&*connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let places = state
        .remote
        .average_ratings_by_location()
        .await
        .unwrap_or_else(|error| {
            tracing::error!("could not get the rated places: {error}");
            Vec::new()
        });

    rate_view(&places, language).into_response()
}

/// Send a rating to the remote store.
///
/// Missing ratings and ratings outside 1 to 5 stars are rejected without
/// contacting the store.
pub async fn rate_place_endpoint(
    State(state): State<RatePlaceState>,
    Form(form): Form<RatePlaceForm>,
) -> Response {
    let language = match state.db_connection.lock() {
        Ok(connection) => language_or_default(&*connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let Some(place) = form.into_place() else {
        return rating_error(StatusCode::BAD_REQUEST, Phrase::FillAllFields, language);
    };

    match state.remote.save_place(&place).await {
        Ok(()) => Alert::SuccessSimple {
            message: language.text(Phrase::Rated).to_owned(),
        }
        .into_response(),
        Err(Error::RateLimited) => rating_error(
            StatusCode::TOO_MANY_REQUESTS,
            Phrase::RatingTooFast,
            language,
        ),
        Err(Error::InvalidPlace) => {
            rating_error(StatusCode::BAD_REQUEST, Phrase::FillAllFields, language)
        }
        Err(error) => {
            tracing::error!("could not save the rating: {error}");
            rating_error(StatusCode::BAD_GATEWAY, Phrase::RatingFailed, language)
        }
    }
}

fn rating_error(status_code: StatusCode, phrase: Phrase, language: Language) -> Response {
    (
        status_code,
        Alert::Error {
            message: language.text(phrase).to_owned(),
            details: String::new(),
        }
        .into_html(),
    )
        .into_response()
}

fn rating_input(name: &str, phrase: Phrase, language: Language) -> Markup {
    html! {
        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { (language.text(phrase)) }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for stars in Rating::MIN..=Rating::MAX {
                    label class="flex-1"
                    {
                        input
                            type="radio"
                            name=(name)
                            value=(stars)
                            required
                            class="peer sr-only";

                        span class=(FORM_RADIO_LABEL_STYLE) { (stars) "★" }
                    }
                }
            }
        }
    }
}

fn place_card(place: &Place, language: Language) -> Markup {
    html! {
        li class="rounded-lg bg-white dark:bg-gray-800 shadow p-4"
        {
            p class="font-semibold"
            {
                @match &place.name {
                    Some(name) => { (name) }
                    None => { (format!("{:.4}, {:.4}", place.latitude, place.longitude)) }
                }
            }

            dl class="grid grid-cols-2 gap-1 text-sm"
            {
                dt { (language.text(Phrase::Cleanliness)) }
                dd { (rating_stars(whole_stars(place.clean_rating))) }
                dt { (language.text(Phrase::Facilities)) }
                dd { (rating_stars(whole_stars(place.facilities_rating))) }
                dt { (language.text(Phrase::Privacy)) }
                dd { (rating_stars(whole_stars(place.privacy_rating))) }
            }

            @if let Some(notes) = &place.notes {
                ul class="mt-2 text-sm italic"
                {
                    @for note in notes.iter() {
                        li { "“" (note) "”" }
                    }
                }
            }
        }
    }
}

fn rate_view(places: &[Place], language: Language) -> Markup {
    let nav_bar = NavBar::new(endpoints::RATE_VIEW, language).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { (language.text(Phrase::Rate)) }

            form
                hx-post=(endpoints::PLACES_API)
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                data-geolocate
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { (language.text(Phrase::PlaceName)) }

                    input
                        id="name"
                        type="text"
                        name="name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (rating_input("clean_rating", Phrase::Cleanliness, language))
                (rating_input("facilities_rating", Phrase::Facilities, language))
                (rating_input("privacy_rating", Phrase::Privacy, language))

                div
                {
                    label for="notes" class=(FORM_LABEL_STYLE) { (language.text(Phrase::Comments)) }

                    textarea id="notes" name="notes" rows="3" class=(FORM_TEXT_INPUT_STYLE) {}
                }

                input type="hidden" name="latitude";
                input type="hidden" name="longitude";
                input type="hidden" name="geolocation_error";

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" id="indicator"
                    {
                        (loading_spinner())
                    }
                    (language.text(Phrase::Rate))
                }
            }

            @if !places.is_empty() {
                ul id="rated-places" class="w-full mt-8 space-y-4"
                {
                    @for place in places {
                        (place_card(place, language))
                    }
                }
            }
        }
    };

    base(language.text(Phrase::Rate), language, &content)
}

#[cfg(test)]
mod rate_place_tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{
        Form, Json, Router,
        extract::State,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::Selector;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        language::{Language, save_language},
        remote::{RemoteClient, paths, test_server::spawn_fake_remote},
        store::initialize,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
    };

    use super::{RatePlaceForm, RatePlaceState, get_rate_page, rate_place_endpoint};

    fn get_state(base_url: &str) -> RatePlaceState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not create tables");

        RatePlaceState {
            db_connection: Arc::new(Mutex::new(connection)),
            remote: RemoteClient::new(base_url, Duration::from_secs(5)).unwrap(),
        }
    }

    fn form() -> RatePlaceForm {
        RatePlaceForm {
            name: "Rodoviária".to_owned(),
            latitude: "-15.79".to_owned(),
            longitude: "-47.88".to_owned(),
            clean_rating: "2".to_owned(),
            facilities_rating: "3".to_owned(),
            privacy_rating: "1".to_owned(),
            notes: "no paper".to_owned(),
        }
    }

    fn remote_answering(status: StatusCode) -> Router {
        Router::new().route(paths::SAVE_PLACE, post(move || async move { status }))
    }

    async fn alert_text(response: axum::response::Response) -> String {
        let html = parse_html_fragment(response).await;

        html.select(&Selector::parse("p").unwrap())
            .next()
            .expect("No alert message found")
            .text()
            .collect::<String>()
    }

    #[tokio::test]
    async fn render_page_with_rated_places() {
        let router = Router::new().route(
            paths::AVERAGE_RATINGS,
            get(|| async {
                Json(json!({
                    "x": { "latitude": 1.0, "longitude": 2.0, "name": "Beach",
                           "cleanRating": 4.6, "notes": ["lovely"] }
                }))
            }),
        );
        let base_url = spawn_fake_remote(router).await;

        let response = get_rate_page(State(get_state(&base_url))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::PLACES_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "clean_rating", "radio");
        let places = html
            .select(&Selector::parse("#rated-places > li").unwrap())
            .count();
        assert_eq!(places, 1);
    }

    #[tokio::test]
    async fn page_renders_without_remote() {
        let response = get_rate_page(State(get_state("http://127.0.0.1:9"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_eq!(
            html.select(&Selector::parse("#rated-places").unwrap()).count(),
            0
        );
    }

    #[tokio::test]
    async fn sends_place_to_remote() {
        let router = Router::new().route(
            paths::SAVE_PLACE,
            post(|Json(body): Json<Value>| async move {
                if body["cleanRating"] == 2.0 && body["notes"] == "no paper" {
                    StatusCode::OK
                } else {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            }),
        );
        let base_url = spawn_fake_remote(router).await;

        let response = rate_place_endpoint(State(get_state(&base_url)), Form(form())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(alert_text(response).await, "Obrigado pela avaliação!");
    }

    #[tokio::test]
    async fn rate_limited_shows_too_fast_message() {
        let base_url = spawn_fake_remote(remote_answering(StatusCode::TOO_MANY_REQUESTS)).await;

        let response = rate_place_endpoint(State(get_state(&base_url)), Form(form())).await;

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            alert_text(response).await,
            "Calma aí! Você está avaliando rápido demais."
        );
    }

    #[tokio::test]
    async fn bad_request_shows_fill_all_fields_in_english() {
        let base_url = spawn_fake_remote(remote_answering(StatusCode::BAD_REQUEST)).await;
        let state = get_state(&base_url);
        save_language(Language::En, &*state.db_connection.lock().unwrap()).unwrap();

        let response = rate_place_endpoint(State(state), Form(form())).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(alert_text(response).await, "Please fill in all the fields.");
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected_before_sending() {
        let form = RatePlaceForm {
            clean_rating: "6".to_owned(),
            ..form()
        };

        let response = rate_place_endpoint(State(get_state("http://127.0.0.1:9")), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            alert_text(response).await,
            "Por favor, preencha todos os campos."
        );
    }

    #[tokio::test]
    async fn missing_or_unreadable_rating_asks_to_fill_all_fields() {
        let state = get_state("http://127.0.0.1:9");
        save_language(Language::En, &*state.db_connection.lock().unwrap()).unwrap();

        for form in [
            RatePlaceForm {
                privacy_rating: String::new(),
                ..form()
            },
            RatePlaceForm {
                facilities_rating: "three".to_owned(),
                ..form()
            },
        ] {
            let response = rate_place_endpoint(State(state.clone()), Form(form)).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(alert_text(response).await, "Please fill in all the fields.");
        }
    }

    #[tokio::test]
    async fn form_without_a_rating_reaches_the_handler() {
        let router = Router::new()
            .route(endpoints::PLACES_API, post(rate_place_endpoint))
            .with_state(get_state("http://127.0.0.1:9"));
        let server = TestServer::try_new(router).expect("Could not create test server.");

        let response = server
            .post(endpoints::PLACES_API)
            .form(&[
                ("name", "Rodoviária"),
                ("latitude", "-15.79"),
                ("longitude", "-47.88"),
                ("clean_rating", "2"),
                ("facilities_rating", "3"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("Por favor, preencha todos os campos.");
    }

    #[tokio::test]
    async fn missing_position_asks_to_fill_all_fields() {
        let form = RatePlaceForm {
            latitude: String::new(),
            ..form()
        };

        let response = rate_place_endpoint(State(get_state("http://127.0.0.1:9")), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            alert_text(response).await,
            "Por favor, preencha todos os campos."
        );
    }
}
