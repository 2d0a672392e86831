//! The earnings calculator: the page, the recording flow and the certificate.

mod certificate;
mod flow;
mod page;

pub use certificate::{certificate_svg, certificate_url, get_certificate};
pub use flow::{
    CalculationGuard, FlowStage, GeolocationOutcome, PendingRecord, UNKNOWN_CITY, record_earnings,
};
pub use page::{calculate_endpoint, get_calculator_page};
