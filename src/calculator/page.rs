//! Calculator page and the endpoint that calculates and records earnings.

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
    calculator::{
        CalculationGuard, GeolocationOutcome, PendingRecord, certificate_svg, certificate_url,
        record_earnings,
    },
    currency::Currency,
    earnings::{
        EarningsInput, EarningsResult, MAX_SALARY_AMOUNT, MIN_SALARY_AMOUNT, SalaryAmount,
        calculate_interval_earnings,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_GROUP_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        loading_spinner,
    },
    language::{Language, Phrase, language_or_default},
    navigation::NavBar,
    remote::RemoteClient,
    salary::{SalaryConfig, load_salary_config},
    timezone::{format_day, today},
};

/// The state needed for the calculator.
#[derive(Debug, Clone)]
pub struct CalculatorState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
    pub remote: RemoteClient,
    pub calculation_guard: CalculationGuard,
}

impl FromRef<AppState> for CalculatorState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            remote: state.remote.clone(),
            calculation_guard: state.calculation_guard.clone(),
        }
    }
}

/// The calculator form.
///
/// The browser fills in either the coordinates or `geolocation_error` just
/// before submitting.
#[derive(Debug, Default, Deserialize)]
pub struct CalculatorForm {
    #[serde(default)]
    pub salary_amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub geolocation_error: Option<String>,
}

impl CalculatorForm {
    fn geolocation(&self) -> GeolocationOutcome {
        if let Some(reason) = self
            .geolocation_error
            .as_deref()
            .filter(|reason| !reason.trim().is_empty())
        {
            return GeolocationOutcome::Failed(reason.to_owned());
        }

        let coordinate = |text: Option<&str>| {
            text.and_then(|text| text.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite())
        };

        match (
            coordinate(self.latitude.as_deref()),
            coordinate(self.longitude.as_deref()),
        ) {
            (Some(latitude), Some(longitude)) => GeolocationOutcome::Position {
                latitude,
                longitude,
            },
            _ => GeolocationOutcome::Failed("no position was submitted".to_owned()),
        }
    }
}

/// Render the calculator page.
pub async fn get_calculator_page(State(state): State<CalculatorState>) -> Response {
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
    let language = language_or_default(&*connection);

    calculator_view(&config, language).into_response()
}

/// Calculate the earnings for the submitted interval and record them.
///
/// Responds with the result panel. Nothing is recorded when the form is
/// incomplete or a time cannot be read.
pub async fn calculate_endpoint(
    State(state): State<CalculatorState>,
    Form(form): Form<CalculatorForm>,
) -> Response {
    let currency = match form.currency.parse::<Currency>() {
        Ok(currency) => currency,
        Err(error) => return error.into_alert_response(),
    };

    let (config, language) = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        match load_salary_config(&*connection) {
            Ok(config) => (config, language_or_default(&*connection)),
            Err(error) => return error.into_alert_response(),
        }
    };

    let input = EarningsInput {
        salary_amount: SalaryAmount::parse(&form.salary_amount),
        currency,
        start: Some(form.start.clone()),
        end: Some(form.end.clone()),
    };

    let earnings = match calculate_interval_earnings(&input, &config) {
        EarningsResult::Earned(earnings) => earnings,
        EarningsResult::NoInput => return html!(div id="result" {}).into_response(),
        EarningsResult::Unavailable => {
            return unavailable_result_view(language).into_response();
        }
    };

    let calculation = match state.calculation_guard.try_begin() {
        Ok(calculation) => calculation,
        Err(error) => return error.into_alert_response(),
    };

    let day = match today(&state.local_timezone) {
        Ok(date) => format_day(date),
        Err(error) => return error.into_alert_response(),
    };

    let pending = PendingRecord {
        total_earned: earnings.money(),
        time_started: form.start.trim().to_owned(),
        time_ended: form.end.trim().to_owned(),
        day,
    };

    match record_earnings(
        &calculation,
        pending,
        form.geolocation(),
        &state.remote,
        &state.db_connection,
    )
    .await
    {
        Ok((record, history_length)) => {
            tracing::info!(
                "recorded {} in {}, {history_length} records in history",
                record.total_earned.display(),
                record.place_label()
            );
            result_view(earnings.raw_amount, currency, &earnings.formatted(), language)
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not record the calculation: {error}");
            error.into_alert_response()
        }
    }
}

fn result_view(amount: f64, currency: Currency, formatted_amount: &str, language: Language) -> Markup {
    html! {
        div id="result" class="w-full flex flex-col items-center gap-4 mt-8"
        {
            div class="w-full overflow-hidden rounded-lg shadow-lg"
            {
                (certificate_svg(formatted_amount, language))
            }

            a
                href=(certificate_url(amount, currency))
                download="cocoladora-certificate.svg"
                class=(BUTTON_SECONDARY_STYLE)
            {
                (language.text(Phrase::DownloadCertificate))
            }
        }
    }
}

fn unavailable_result_view(language: Language) -> Markup {
    html! {
        div id="result" class="w-full text-center mt-8"
        {
            p { (language.text(Phrase::IveEarned)) }
            p class="text-4xl font-bold" { "-" }
            p { (language.text(Phrase::WhileMeditating)) }
        }
    }
}

fn calculator_view(config: &SalaryConfig, language: Language) -> Markup {
    let nav_bar = NavBar::new(endpoints::CALCULATOR_VIEW, language).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-2" { (language.text(Phrase::Paycheck)) }

            a
                href=(endpoints::SALARY_SETTINGS_VIEW)
                class="mb-6 text-sm underline text-amber-800 dark:text-amber-400"
            {
                (language.text(config.periodicity.phrase()))
                " · "
                (config.hours_per_week.get())
                "h"
            }

            form
                hx-post=(endpoints::CALCULATE)
                hx-target="#result"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                data-geolocate
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="salary_amount" class=(FORM_LABEL_STYLE)
                    {
                        (language.text(Phrase::Salary))
                    }

                    input
                        id="salary_amount"
                        type="number"
                        name="salary_amount"
                        min=(MIN_SALARY_AMOUNT)
                        max=(MAX_SALARY_AMOUNT)
                        step="0.01"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { (language.text(Phrase::Currency)) }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for currency in Currency::ALL {
                            label class="flex-1"
                            {
                                input
                                    type="radio"
                                    name="currency"
                                    value=(currency.code())
                                    checked[currency == Currency::default()]
                                    required
                                    class="peer sr-only";

                                span class=(FORM_RADIO_LABEL_STYLE)
                                {
                                    (currency.symbol()) " " (currency.code())
                                }
                            }
                        }
                    }
                }

                div class="grid grid-cols-2 gap-4"
                {
                    div
                    {
                        label for="start" class=(FORM_LABEL_STYLE)
                        {
                            (language.text(Phrase::StartTime))
                        }

                        input id="start" type="time" name="start" required class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="end" class=(FORM_LABEL_STYLE)
                        {
                            (language.text(Phrase::EndTime))
                        }

                        input id="end" type="time" name="end" required class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                input type="hidden" name="latitude";
                input type="hidden" name="longitude";
                input type="hidden" name="geolocation_error";

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" id="indicator"
                    {
                        (loading_spinner())
                        span class="sr-only" { (language.text(Phrase::Calculating)) }
                    }
                    (language.text(Phrase::Calculate))
                }
            }

            div id="result" {}
        }
    };

    base(language.text(Phrase::Calculator), language, &content)
}
