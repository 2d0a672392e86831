//! Client for the remote location, rating and message store.

use std::{collections::HashMap, time::Duration};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{Error, history::LocationRecord, place::Place};

/// The paths of the remote operations, relative to the base URL.
pub mod paths {
    pub const HANDLE_LOCATION_DATA: &str = "/handleLocationData";
    pub const LIST_LOCATION_DATA: &str = "/listLocationData";
    pub const SAVE_PLACE: &str = "/savePlace";
    pub const AVERAGE_RATINGS: &str = "/getAverageRatingsAndNotesGroupedByLocation";
    pub const RETRIEVE_MESSAGES: &str = "/retrieveMessages";
}

/// A message written on the community door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct CityResponse {
    #[serde(default)]
    city: Option<String>,
}

/// A JSON-over-HTTP client for the remote store.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    /// Create a client for the store at `base_url`, e.g. "https://example.com/api".
    ///
    /// Every request gives up after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a new earnings record and get back the city it was recorded in, if the store knows it.
    pub async fn handle_location_data(
        &self,
        record: &LocationRecord,
    ) -> Result<Option<String>, Error> {
        let response = self
            .http
            .post(self.url(paths::HANDLE_LOCATION_DATA))
            .json(record)
            .send()
            .await?
            .error_for_status()?;

        let body: CityResponse = response.json().await?;

        Ok(body.city.filter(|city| !city.trim().is_empty()))
    }

    /// Get every earnings record ever sent to the store.
    ///
    /// Records that cannot be read are logged and left out.
    pub async fn list_location_data(&self) -> Result<Vec<LocationRecord>, Error> {
        let values: Vec<serde_json::Value> = self
            .http
            .get(self.url(paths::LIST_LOCATION_DATA))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let records = values
            .into_iter()
            .filter_map(|value| {
                serde_json::from_value(value)
                    .inspect_err(|error| tracing::warn!("skipping unreadable remote record: {error}"))
                    .ok()
            })
            .collect();

        Ok(records)
    }

    /// Submit a place rating.
    ///
    /// # Errors
    /// Returns [Error::RateLimited] when the store answers 429 and
    /// [Error::InvalidPlace] when it answers 400.
    pub async fn save_place(&self, place: &Place) -> Result<(), Error> {
        let response = self
            .http
            .post(self.url(paths::SAVE_PLACE))
            .json(place)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited),
            StatusCode::BAD_REQUEST => Err(Error::InvalidPlace),
            status => Err(Error::RemoteStatus(status.as_u16())),
        }
    }

    /// Get the average ratings and all notes for each rated location.
    ///
    /// Places without an ID take the key they were grouped under.
    pub async fn average_ratings_by_location(&self) -> Result<Vec<Place>, Error> {
        let grouped: HashMap<String, Place> = self
            .http
            .get(self.url(paths::AVERAGE_RATINGS))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut places = grouped
            .into_iter()
            .map(|(key, mut place)| {
                place.id.get_or_insert(key);
                place
            })
            .collect::<Vec<_>>();
        places.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(places)
    }

    /// Get the messages written on the door.
    pub async fn retrieve_messages(&self) -> Result<Vec<DoorMessage>, Error> {
        let messages = self
            .http
            .get(self.url(paths::RETRIEVE_MESSAGES))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(messages)
    }
}
