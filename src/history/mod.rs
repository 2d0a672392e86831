//! The earnings recorded on this device and their totals per currency.

mod record;
mod totals;
mod view;

pub use record::{LocationRecord, TotalEarned, append_record, delete_record, load_history};
pub use totals::{CurrencyTotals, aggregate, totals_view};
pub use view::{delete_history_record_endpoint, get_history_page};
