//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/history/{index}', use [format_endpoint].

/// The root route which redirects to the calculator.
pub const ROOT: &str = "/";
/// The page with the earnings calculator.
pub const CALCULATOR_VIEW: &str = "/calculator";
/// The certificate for an amount earned, as an SVG image.
pub const CERTIFICATE: &str = "/certificate.svg";
/// The page for changing the salary periodicity and hours per week.
pub const SALARY_SETTINGS_VIEW: &str = "/settings/salary";
/// The page listing the earnings recorded on this device.
pub const HISTORY_VIEW: &str = "/history";
/// The page with the totals earned by everyone.
pub const COCOMETER_VIEW: &str = "/cocometer";
/// The page for rating a place.
pub const RATE_VIEW: &str = "/rate";
/// The page with the community message board.
pub const DOOR_VIEW: &str = "/door";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for calculating and recording earnings.
pub const CALCULATE: &str = "/api/calculate";
/// The route for updating the salary settings.
pub const SALARY_SETTINGS_API: &str = "/api/settings/salary";
/// The route for deleting a history record by its position.
pub const DELETE_HISTORY_RECORD: &str = "/api/history/{index}";
/// The route for the points to plot on the map.
pub const MAP_DATA: &str = "/api/map";
/// The route for submitting a place rating.
pub const PLACES_API: &str = "/api/places";
/// The route for changing the language.
pub const LANGUAGE_API: &str = "/api/language";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/history/{index}', '{index}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: usize) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
