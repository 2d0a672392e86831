//! Turns a calculation into a geotagged history record.
//!
//! A calculation moves through
//! `Idle → AwaitingGeolocation → (AwaitingRemoteSave | FailedGeolocation) → Settled`.
//! Only one calculation may be in flight at a time, a second submission is
//! rejected while the first is between `Idle` and `Settled`.

use std::{
    future::Future,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{
    Error,
    currency::Money,
    history::{LocationRecord, TotalEarned, append_record},
    remote::RemoteClient,
};

/// The city recorded when the position of the device is unknown.
pub const UNKNOWN_CITY: &str = "Unknown";

/// Where a calculation is in the recording process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowStage {
    #[default]
    Idle,
    AwaitingGeolocation,
    AwaitingRemoteSave,
    FailedGeolocation,
    Settled,
}

/// Tracks the calculation in flight, shared by every request.
#[derive(Debug, Clone, Default)]
pub struct CalculationGuard {
    stage: Arc<Mutex<FlowStage>>,
}

impl CalculationGuard {
    pub fn stage(&self) -> FlowStage {
        self.stage
            .lock()
            .map(|stage| *stage)
            .unwrap_or(FlowStage::Idle)
    }

    /// Start a calculation.
    ///
    /// # Errors
    ///
    /// Returns [Error::CalculationInProgress] if another calculation has not
    /// settled yet, or [Error::DatabaseLockError] if the stage lock is poisoned.
    pub fn try_begin(&self) -> Result<Calculation, Error> {
        let mut stage = self.stage.lock().map_err(|_| Error::DatabaseLockError)?;

        match *stage {
            FlowStage::Idle | FlowStage::Settled => {
                *stage = FlowStage::AwaitingGeolocation;
                Ok(Calculation {
                    stage: self.stage.clone(),
                })
            }
            _ => Err(Error::CalculationInProgress),
        }
    }
}

/// A calculation in flight. The guard returns to `Idle` when this is dropped.
#[derive(Debug)]
pub struct Calculation {
    stage: Arc<Mutex<FlowStage>>,
}

impl Calculation {
    fn advance(&self, next: FlowStage) {
        if let Ok(mut stage) = self.stage.lock() {
            tracing::debug!("calculation moved from {:?} to {next:?}", *stage);
            *stage = next;
        }
    }
}

impl Drop for Calculation {
    fn drop(&mut self) {
        if let Ok(mut stage) = self.stage.lock() {
            *stage = FlowStage::Idle;
        }
    }
}

/// The result of asking the device for its position.
#[derive(Debug, Clone, PartialEq)]
pub enum GeolocationOutcome {
    Position { latitude: f64, longitude: f64 },
    /// The position could not be determined, e.g. permission was denied.
    Failed(String),
}

/// Sends new records to the remote store.
pub trait LocationService {
    /// Save `record` and return the city it was recorded in, if known.
    fn save_location(
        &self,
        record: &LocationRecord,
    ) -> impl Future<Output = Result<Option<String>, Error>> + Send;
}

impl LocationService for RemoteClient {
    fn save_location(
        &self,
        record: &LocationRecord,
    ) -> impl Future<Output = Result<Option<String>, Error>> + Send {
        self.handle_location_data(record)
    }
}

/// A calculated amount waiting for the position of the device.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecord {
    pub total_earned: Money,
    pub time_started: String,
    pub time_ended: String,
    /// Today's date as "DD/MM/YYYY".
    pub day: String,
}

impl PendingRecord {
    fn into_record(self, latitude: f64, longitude: f64, city: Option<String>) -> LocationRecord {
        LocationRecord {
            latitude,
            longitude,
            total_earned: TotalEarned::Tagged(self.total_earned),
            time_started: self.time_started,
            time_ended: self.time_ended,
            day: self.day,
            city,
        }
    }
}

/// Geotag `pending`, try to save it remotely and append it to the local history.
///
/// A failed geolocation records the amount at 0, 0 in an unknown city without
/// contacting the remote store. A failed remote save is logged and the record
/// is kept locally without a city. Exactly one record is appended.
///
/// Returns the record and the length of the history afterwards.
pub async fn record_earnings(
    calculation: &Calculation,
    pending: PendingRecord,
    outcome: GeolocationOutcome,
    service: &impl LocationService,
    db_connection: &Mutex<Connection>,
) -> Result<(LocationRecord, usize), Error> {
    let record = match outcome {
        GeolocationOutcome::Position {
            latitude,
            longitude,
        } => {
            calculation.advance(FlowStage::AwaitingRemoteSave);
            let record = pending.into_record(latitude, longitude, None);

            let city = match service.save_location(&record).await {
                Ok(city) => city,
                Err(error) => {
                    tracing::warn!("could not save the record remotely, keeping it locally: {error}");
                    None
                }
            };

            LocationRecord { city, ..record }
        }
        GeolocationOutcome::Failed(reason) => {
            calculation.advance(FlowStage::FailedGeolocation);
            tracing::info!("recording without a position: {reason}");

            pending.into_record(0.0, 0.0, Some(UNKNOWN_CITY.to_owned()))
        }
    };

    let history_length = {
        let connection = db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        append_record(record.clone(), &*connection)?
    };
    calculation.advance(FlowStage::Settled);

    Ok((record, history_length))
}
