//! The user's language preference and the phrases that depend on it.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRefresh;
use serde::Deserialize;

use crate::{
    AppState, Error,
    store::{KeyValueStore, LANGUAGE_KEY},
};

/// The languages the app is available in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// English.
    En,
    /// Brazilian Portuguese, used when no preference has been stored.
    #[default]
    Pt,
}

impl Language {
    /// Interpret a stored language tag such as "pt-BR" or "en".
    ///
    /// Any tag that mentions neither language falls back to Portuguese.
    pub fn from_tag(tag: &str) -> Self {
        if tag.contains("pt") {
            Language::Pt
        } else if tag.contains("en") {
            Language::En
        } else {
            Language::Pt
        }
    }

    /// The tag used in the `lang` attribute and in storage.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Pt => "pt",
        }
    }

    /// Look up `phrase` in this language.
    pub fn text(self, phrase: Phrase) -> &'static str {
        match self {
            Language::En => phrase.english(),
            Language::Pt => phrase.portuguese(),
        }
    }
}

/// Phrases that are shown to the user in their language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Calculate,
    Calculating,
    IveEarned,
    WhileMeditating,
    DownloadCertificate,
    Paycheck,
    NothingYet,
    Total,
    Cocometer,
    ToiletDoor,
    Filled,
    Rate,
    Rated,
    RatingTooFast,
    FillAllFields,
    RatingFailed,
    Cleanliness,
    Facilities,
    Privacy,
    Comments,
    SalaryConfig,
    HoursPerWeek,
    Hourly,
    Monthly,
    Yearly,
    Calculator,
    History,
    Salary,
    Currency,
    StartTime,
    EndTime,
    Save,
    SettingsSaved,
    Delete,
    Date,
    Location,
    Amount,
    PlaceName,
    NoMessages,
}

impl Phrase {
    fn english(self) -> &'static str {
        match self {
            Phrase::Calculate => "Calculate",
            Phrase::Calculating => "Calculating...",
            Phrase::IveEarned => "I've earned",
            Phrase::WhileMeditating => "while meditating in the toilet",
            Phrase::DownloadCertificate => "Download Certificate",
            Phrase::Paycheck => "Paycheck",
            Phrase::NothingYet => "No 💩 yet",
            Phrase::Total => "Total",
            Phrase::Cocometer => "Cocometer",
            Phrase::ToiletDoor => "Toilet Door",
            Phrase::Filled => "spaces have been filled.",
            Phrase::Rate => "Rate",
            Phrase::Rated => "Thanks for rating this place!",
            Phrase::RatingTooFast => "Easy there! You are rating too fast.",
            Phrase::FillAllFields => "Please fill in all the fields.",
            Phrase::RatingFailed => "Could not save your rating, try again later.",
            Phrase::Cleanliness => "Cleanliness",
            Phrase::Facilities => "Facilities",
            Phrase::Privacy => "Privacy",
            Phrase::Comments => "Comments",
            Phrase::SalaryConfig => "Salary Settings",
            Phrase::HoursPerWeek => "Hours worked per week",
            Phrase::Hourly => "Hourly",
            Phrase::Monthly => "Monthly",
            Phrase::Yearly => "Yearly",
            Phrase::Calculator => "Calculator",
            Phrase::History => "History",
            Phrase::Salary => "Salary",
            Phrase::Currency => "Currency",
            Phrase::StartTime => "Start",
            Phrase::EndTime => "End",
            Phrase::Save => "Save",
            Phrase::SettingsSaved => "Settings saved",
            Phrase::Delete => "Delete",
            Phrase::Date => "Date",
            Phrase::Location => "Location",
            Phrase::Amount => "Amount",
            Phrase::PlaceName => "Place name",
            Phrase::NoMessages => "Nobody has written on the door yet.",
        }
    }

    fn portuguese(self) -> &'static str {
        match self {
            Phrase::Calculate => "Calcular",
            Phrase::Calculating => "Calculando...",
            Phrase::IveEarned => "Eu recebi",
            Phrase::WhileMeditating => "enquanto meditava no trono",
            Phrase::DownloadCertificate => "Baixar Certificado",
            Phrase::Paycheck => "Contracheque",
            Phrase::NothingYet => "Nenhum 💩 ainda",
            Phrase::Total => "Total",
            Phrase::Cocometer => "Cocômetro",
            Phrase::ToiletDoor => "Porta do Banheiro",
            Phrase::Filled => "espaços foram preenchidos.",
            Phrase::Rate => "Avaliar",
            Phrase::Rated => "Obrigado pela avaliação!",
            Phrase::RatingTooFast => "Calma aí! Você está avaliando rápido demais.",
            Phrase::FillAllFields => "Por favor, preencha todos os campos.",
            Phrase::RatingFailed => "Não foi possível salvar sua avaliação, tente novamente.",
            Phrase::Cleanliness => "Limpeza",
            Phrase::Facilities => "Instalações",
            Phrase::Privacy => "Privacidade",
            Phrase::Comments => "Comentários",
            Phrase::SalaryConfig => "Configuração de Salário",
            Phrase::HoursPerWeek => "Horas trabalhadas por semana",
            Phrase::Hourly => "Por Hora",
            Phrase::Monthly => "Mensal",
            Phrase::Yearly => "Anual",
            Phrase::Calculator => "Calculadora",
            Phrase::History => "Histórico",
            Phrase::Salary => "Salário",
            Phrase::Currency => "Moeda",
            Phrase::StartTime => "Início",
            Phrase::EndTime => "Fim",
            Phrase::Save => "Salvar",
            Phrase::SettingsSaved => "Configurações salvas",
            Phrase::Delete => "Excluir",
            Phrase::Date => "Data",
            Phrase::Location => "Local",
            Phrase::Amount => "Valor",
            Phrase::PlaceName => "Nome do lugar",
            Phrase::NoMessages => "Ninguém escreveu na porta ainda.",
        }
    }
}

/// Get the stored language preference, defaulting to Portuguese.
pub fn load_language(store: &impl KeyValueStore) -> Result<Language, Error> {
    Ok(store
        .get(LANGUAGE_KEY)?
        .map(|tag| Language::from_tag(&tag))
        .unwrap_or_default())
}

/// Store the language preference.
pub fn save_language(language: Language, store: &impl KeyValueStore) -> Result<(), Error> {
    store.set(LANGUAGE_KEY, language.code())
}

/// Load the language preference from a locked connection, logging failures
/// and falling back to the default language.
pub(crate) fn language_or_default(store: &impl KeyValueStore) -> Language {
    load_language(store)
        .inspect_err(|error| tracing::error!("could not load the language preference: {error}"))
        .unwrap_or_default()
}

/// The state needed to change the language.
#[derive(Debug, Clone)]
pub struct LanguageState {
    pub db_connection: Arc<Mutex<rusqlite::Connection>>,
}

impl FromRef<AppState> for LanguageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form for changing the language.
#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    /// A language tag, e.g. "en" or "pt-BR".
    pub language: String,
}

/// Store the chosen language and ask HTMX to reload the page.
pub async fn set_language_endpoint(
    State(state): State<LanguageState>,
    Form(form): Form<LanguageForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match save_language(Language::from_tag(&form.language), &*connection) {
        Ok(()) => (HxRefresh(true), StatusCode::OK).into_response(),
        Err(error) => {
            tracing::error!("could not save the language preference: {error}");
            error.into_alert_response()
        }
    }
}
