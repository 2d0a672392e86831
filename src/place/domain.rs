//! Core place rating types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidRating] if `stars` is not between 1 and 5.
    pub fn new(stars: u8) -> Result<Self, Error> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(Error::InvalidRating(stars))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free text notes left about a place.
///
/// A single rating carries one note, the aggregated places carry every note
/// left at that location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Notes {
    One(String),
    Many(Vec<String>),
}

impl Notes {
    /// The non-empty notes.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let notes: Vec<&str> = match self {
            Notes::One(note) => vec![note.as_str()],
            Notes::Many(notes) => notes.iter().map(String::as_str).collect(),
        };

        notes.into_iter().filter(|note| !note.trim().is_empty())
    }
}

/// A rated place, either a single submission or the average of all ratings at a location.
///
/// Ratings are averages when read back from the remote store, so they are
/// not restricted to whole stars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilities_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Notes>,
}

/// Round an average rating to whole stars for display.
pub fn whole_stars(rating: Option<f64>) -> Option<u8> {
    rating
        .filter(|rating| rating.is_finite())
        .map(|rating| rating.round().clamp(0.0, f64::from(Rating::MAX)) as u8)
}
