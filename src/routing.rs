//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    calculator::{calculate_endpoint, get_calculator_page, get_certificate},
    cocometer::get_cocometer_page,
    door::get_door_page,
    endpoints,
    error_page::{get_404_not_found, get_internal_server_error_page},
    history::{delete_history_record_endpoint, get_history_page},
    language::set_language_endpoint,
    map::get_map_data,
    place::{get_rate_page, rate_place_endpoint},
    salary::{get_salary_settings_page, update_salary_settings_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CALCULATOR_VIEW, get(get_calculator_page))
        .route(endpoints::CERTIFICATE, get(get_certificate))
        .route(
            endpoints::SALARY_SETTINGS_VIEW,
            get(get_salary_settings_page),
        )
        .route(endpoints::HISTORY_VIEW, get(get_history_page))
        .route(endpoints::COCOMETER_VIEW, get(get_cocometer_page))
        .route(endpoints::RATE_VIEW, get(get_rate_page))
        .route(endpoints::DOOR_VIEW, get(get_door_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api = Router::new()
        .route(endpoints::CALCULATE, post(calculate_endpoint))
        .route(
            endpoints::SALARY_SETTINGS_API,
            post(update_salary_settings_endpoint),
        )
        .route(
            endpoints::DELETE_HISTORY_RECORD,
            delete(delete_history_record_endpoint),
        )
        .route(endpoints::MAP_DATA, get(get_map_data))
        .route(endpoints::PLACES_API, post(rate_place_endpoint))
        .route(endpoints::LANGUAGE_API, post(set_language_endpoint));

    pages
        .merge(api)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the calculator.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CALCULATOR_VIEW)
}


#[cfg(test)]
mod router_tests {
    use std::time::Duration;

    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;

    use crate::{AppState, build_router, endpoints, remote::RemoteClient};

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let remote = RemoteClient::new("http://127.0.0.1:9", Duration::from_secs(1))
            .expect("Could not create remote client");
        let state = AppState::new(connection, "America/Sao_Paulo", remote)
            .expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn pages_render() {
        let server = get_test_server();

        for page in [
            endpoints::CALCULATOR_VIEW,
            endpoints::SALARY_SETTINGS_VIEW,
            endpoints::HISTORY_VIEW,
            endpoints::COCOMETER_VIEW,
            endpoints::RATE_VIEW,
            endpoints::DOOR_VIEW,
        ] {
            server.get(page).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn calculation_shows_up_in_history() {
        let server = get_test_server();

        server
            .post(endpoints::CALCULATE)
            .form(&[
                ("salary_amount", "4400"),
                ("currency", "BRL"),
                ("start", "08:00"),
                ("end", "09:00"),
                ("geolocation_error", "User denied Geolocation"),
            ])
            .await
            .assert_status_ok();

        let history = server.get(endpoints::HISTORY_VIEW).await;
        history.assert_status_ok();
        history.assert_text_contains("R$25.00");
        history.assert_text_contains("Unknown");
    }

    #[tokio::test]
    async fn map_data_degrades_to_empty_lists() {
        let server = get_test_server();

        let response = server.get(endpoints::MAP_DATA).await;

        response.assert_status_ok();
        let data = response.json::<Value>();
        assert_eq!(data["calculated"], Value::Array(vec![]));
        assert_eq!(data["rated"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/nope")
            .await
            .assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
