//! Rating places and listing the ratings left by everyone.

mod domain;
mod rate;

pub use domain::{Notes, Place, Rating, whole_stars};
pub use rate::{get_rate_page, rate_place_endpoint};
