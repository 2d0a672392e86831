//! The points plotted on the map: amounts earned and places rated by everyone.

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Serialize;

use crate::{AppState, history::LocationRecord, place::Place, remote::RemoteClient};

/// The state needed for the map data.
#[derive(Debug, Clone)]
pub struct MapState {
    pub remote: RemoteClient,
}

impl FromRef<AppState> for MapState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            remote: state.remote.clone(),
        }
    }
}

/// Everything the map shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapData {
    /// Where earnings were recorded.
    pub calculated: Vec<LocationRecord>,
    /// The average ratings of each rated place.
    pub rated: Vec<Place>,
}

/// Get the map points. Either list is empty if it cannot be fetched.
pub async fn get_map_data(State(state): State<MapState>) -> Json<MapData> {
    let (calculated, rated) = tokio::join!(
        state.remote.list_location_data(),
        state.remote.average_ratings_by_location()
    );

    let calculated = calculated.unwrap_or_else(|error| {
        tracing::error!("could not get the recorded locations: {error}");
        Vec::new()
    });
    let rated = rated.unwrap_or_else(|error| {
        tracing::error!("could not get the rated places: {error}");
        Vec::new()
    });

    Json(MapData { calculated, rated })
}
