//! Salary settings page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
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
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    language::{Language, Phrase, language_or_default},
    navigation::NavBar,
    salary::{HoursPerWeek, Periodicity, SalaryConfig, load_salary_config, save_salary_config},
};

/// The state needed for the salary settings page and endpoint.
#[derive(Debug, Clone)]
pub struct SalarySettingsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SalarySettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw salary settings form.
///
/// Both fields are validated by the endpoint so that bad input produces an
/// alert rather than a form rejection.
#[derive(Debug, Deserialize)]
pub struct SalarySettingsForm {
    pub periodicity: String,
    pub hours_per_week: String,
}

/// Render the salary settings page with the stored config.
pub async fn get_salary_settings_page(State(state): State<SalarySettingsState>) -> Response {
    let (config, language) = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        let config = match load_salary_config(&*connection) {
            Ok(config) => config,
            Err(error) => return error.into_response(),
        };

        (config, language_or_default(&*connection))
    };

    salary_settings_view(&config, language).into_response()
}

/// Validate and store the submitted salary settings.
///
/// Invalid input leaves the stored config unchanged.
pub async fn update_salary_settings_endpoint(
    State(state): State<SalarySettingsState>,
    Form(form): Form<SalarySettingsForm>,
) -> Response {
    let config = match parse_form(&form) {
        Ok(config) => config,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match save_salary_config(&config, &*connection) {
        Ok(()) => Alert::SuccessSimple {
            message: language_or_default(&*connection)
                .text(Phrase::SettingsSaved)
                .to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("could not save the salary settings: {error}");
            error.into_alert_response()
        }
    }
}

fn parse_form(form: &SalarySettingsForm) -> Result<SalaryConfig, Error> {
    Ok(SalaryConfig {
        periodicity: form.periodicity.parse()?,
        hours_per_week: form.hours_per_week.parse::<HoursPerWeek>()?,
    })
}

fn salary_settings_view(config: &SalaryConfig, language: Language) -> Markup {
    let nav_bar = NavBar::new(endpoints::SALARY_SETTINGS_VIEW, language).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { (language.text(Phrase::SalaryConfig)) }

            form
                hx-post=(endpoints::SALARY_SETTINGS_API)
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for periodicity in Periodicity::ALL {
                        label class="flex-1"
                        {
                            input
                                type="radio"
                                name="periodicity"
                                value=(periodicity.as_str())
                                checked[periodicity == config.periodicity]
                                required
                                class="peer sr-only";

                            span class=(FORM_RADIO_LABEL_STYLE)
                            {
                                (language.text(periodicity.phrase()))
                            }
                        }
                    }
                }

                div
                {
                    label for="hours_per_week" class=(FORM_LABEL_STYLE)
                    {
                        (language.text(Phrase::HoursPerWeek))
                    }

                    input
                        id="hours_per_week"
                        type="number"
                        name="hours_per_week"
                        min="1"
                        step="1"
                        value=(config.hours_per_week.get())
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (language.text(Phrase::Save)) }
            }
        }
    };

    base(language.text(Phrase::SalaryConfig), language, &content)
}
