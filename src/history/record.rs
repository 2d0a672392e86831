//! A single recorded earnings event and the local history collection.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    Error,
    currency::{Money, parse_formatted_amount},
    store::{HISTORY_KEY, KeyValueStore, load_json, save_json, try_load_json},
};

/// The amount earned in a [LocationRecord].
///
/// New records store a tagged amount. Records written by older clients store
/// the formatted string, e.g. "R$10.00", and some store a bare number.
/// Anything else, such as `null`, is kept as it was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalEarned {
    Tagged(Money),
    Formatted(String),
    Number(f64),
    Other(serde_json::Value),
}

impl TotalEarned {
    /// The amount with its currency, if it can be counted towards a total.
    ///
    /// Only positive amounts count. Bare numbers have no currency and are
    /// never counted.
    pub fn money(&self) -> Option<Money> {
        let money = match self {
            TotalEarned::Tagged(money) => Some(*money),
            TotalEarned::Formatted(text) => parse_formatted_amount(text),
            TotalEarned::Number(_) | TotalEarned::Other(_) => None,
        };

        money.filter(|money| money.amount.is_finite() && money.amount > 0.0)
    }

    /// The amount as shown to the user.
    pub fn display(&self) -> String {
        match self {
            TotalEarned::Tagged(money) => money.formatted(),
            TotalEarned::Formatted(text) => text.clone(),
            TotalEarned::Number(number) => number.to_string(),
            TotalEarned::Other(_) => "-".to_owned(),
        }
    }
}

impl Default for TotalEarned {
    fn default() -> Self {
        TotalEarned::Number(0.0)
    }
}

/// An earnings event tagged with where and when it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(default, alias = "totalearned")]
    pub total_earned: TotalEarned,
    #[serde(default, alias = "timestarted", deserialize_with = "null_as_default")]
    pub time_started: String,
    #[serde(default, alias = "timeended", deserialize_with = "null_as_default")]
    pub time_ended: String,
    /// The date formatted as "DD/MM/YYYY".
    #[serde(default, deserialize_with = "null_as_default")]
    pub day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Read `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl LocationRecord {
    /// The city if known, otherwise the coordinates.
    pub fn place_label(&self) -> String {
        match &self.city {
            Some(city) => city.clone(),
            None => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

/// Get the local history, oldest record first.
///
/// An unreadable history is shown as empty. It is left in the store untouched.
pub fn load_history(store: &impl KeyValueStore) -> Result<Vec<LocationRecord>, Error> {
    load_json(store, HISTORY_KEY)
}

/// Replace the local history. An empty history removes the stored value.
fn save_history(records: &[LocationRecord], store: &impl KeyValueStore) -> Result<(), Error> {
    if records.is_empty() {
        store.remove(HISTORY_KEY)
    } else {
        save_json(store, HISTORY_KEY, records)
    }
}

/// Add `record` to the end of the local history.
///
/// Returns the number of records in the history afterwards.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the stored history cannot be
/// read, in which case it is not overwritten.
pub fn append_record(record: LocationRecord, store: &impl KeyValueStore) -> Result<usize, Error> {
    let mut records: Vec<LocationRecord> = try_load_json(store, HISTORY_KEY)?;
    records.push(record);
    save_history(&records, store)?;

    Ok(records.len())
}

/// Remove the record at `index` from the local history.
///
/// # Errors
///
/// Returns [Error::DeleteMissingRecord] if there is no record at `index` and
/// [Error::JSONSerializationError] if the stored history cannot be read.
pub fn delete_record(index: usize, store: &impl KeyValueStore) -> Result<LocationRecord, Error> {
    let mut records: Vec<LocationRecord> = try_load_json(store, HISTORY_KEY)?;

    if index >= records.len() {
        return Err(Error::DeleteMissingRecord(index));
    }

    let removed = records.remove(index);
    save_history(&records, store)?;

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        currency::{Currency, Money},
        store::{HISTORY_KEY, KeyValueStore, initialize},
    };

    use super::{LocationRecord, TotalEarned, append_record, delete_record, load_history};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn record(total_earned: TotalEarned) -> LocationRecord {
        LocationRecord {
            latitude: -23.55,
            longitude: -46.63,
            total_earned,
            time_started: "08:00".to_owned(),
            time_ended: "09:00".to_owned(),
            day: "18/10/2026".to_owned(),
            city: Some("São Paulo".to_owned()),
        }
    }

    #[test]
    fn reads_legacy_lowercase_fields() {
        let json = r#"{
            "latitude": 1.5,
            "longitude": 2.5,
            "totalearned": "R$10.00",
            "timestarted": "08:00",
            "timeended": "08:30",
            "day": "01/02/2024"
        }"#;

        let got: LocationRecord = serde_json::from_str(json).unwrap();

        assert_eq!(got.total_earned, TotalEarned::Formatted("R$10.00".to_owned()));
        assert_eq!(got.time_started, "08:00");
        assert_eq!(got.time_ended, "08:30");
        assert_eq!(got.city, None);
    }

    #[test]
    fn writes_tagged_amount_with_camel_case_fields() {
        let record = record(TotalEarned::Tagged(Money::new(25.0, Currency::BRL)));

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["totalEarned"]["amount"], 25.0);
        assert_eq!(json["totalEarned"]["currency"], "BRL");
        assert_eq!(json["timeStarted"], "08:00");
    }

    #[test]
    fn number_amounts_are_not_counted() {
        assert_eq!(TotalEarned::Number(12.0).money(), None);
    }

    #[test]
    fn negative_amounts_are_not_counted_in_any_form() {
        assert_eq!(
            TotalEarned::Tagged(Money::new(-25.0, Currency::BRL)).money(),
            None
        );
        assert_eq!(TotalEarned::Formatted("-R$25.00".to_owned()).money(), None);
    }

    #[test]
    fn reads_nulls_as_missing_values() {
        let json = r#"{
            "latitude": null,
            "longitude": 2.5,
            "totalEarned": null,
            "timeStarted": null,
            "timeEnded": "08:30",
            "day": null,
            "city": null
        }"#;

        let got: LocationRecord = serde_json::from_str(json).unwrap();

        assert_eq!(got.latitude, 0.0);
        assert_eq!(got.total_earned, TotalEarned::Other(serde_json::Value::Null));
        assert_eq!(got.total_earned.money(), None);
        assert_eq!(got.total_earned.display(), "-");
        assert_eq!(got.time_started, "");
        assert_eq!(got.day, "");
    }

    #[test]
    fn unexpected_amounts_are_kept_but_not_counted() {
        let json = r#"[
            { "totalEarned": "R$10.00", "day": "01/02/2024" },
            { "totalEarned": true, "day": "01/02/2024" },
            { "totalEarned": { "value": 3 }, "day": "01/02/2024" }
        ]"#;

        let got: Vec<LocationRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(got.len(), 3);
        assert_eq!(
            got.iter().filter_map(|record| record.total_earned.money()).count(),
            1
        );
    }

    #[test]
    fn formatted_amounts_are_counted_by_prefix() {
        assert_eq!(
            TotalEarned::Formatted("€3.50".to_owned()).money(),
            Some(Money::new(3.5, Currency::EUR))
        );
    }

    #[test]
    fn place_label_falls_back_to_coordinates() {
        let mut record = record(TotalEarned::default());
        record.city = None;

        assert_eq!(record.place_label(), "-23.5500, -46.6300");
    }

    #[test]
    fn append_grows_history_by_one() {
        let connection = get_test_connection();

        assert_eq!(append_record(record(TotalEarned::default()), &connection), Ok(1));
        assert_eq!(append_record(record(TotalEarned::default()), &connection), Ok(2));
        assert_eq!(load_history(&connection).unwrap().len(), 2);
    }

    #[test]
    fn delete_removes_record_at_index() {
        let connection = get_test_connection();
        let first = record(TotalEarned::Formatted("R$1.00".to_owned()));
        let second = record(TotalEarned::Formatted("R$2.00".to_owned()));
        append_record(first.clone(), &connection).unwrap();
        append_record(second.clone(), &connection).unwrap();

        let removed = delete_record(0, &connection);

        assert_eq!(removed, Ok(first));
        assert_eq!(load_history(&connection), Ok(vec![second]));
    }

    #[test]
    fn delete_out_of_range_fails() {
        let connection = get_test_connection();

        assert_eq!(
            delete_record(0, &connection),
            Err(Error::DeleteMissingRecord(0))
        );
    }

    #[test]
    fn unreadable_history_is_empty() {
        let connection = get_test_connection();
        connection.set(HISTORY_KEY, "[{").unwrap();

        assert_eq!(load_history(&connection), Ok(vec![]));
    }

    #[test]
    fn append_keeps_unreadable_history() {
        let connection = get_test_connection();
        connection.set(HISTORY_KEY, "[{").unwrap();

        let result = append_record(record(TotalEarned::default()), &connection);

        assert!(
            matches!(result, Err(Error::JSONSerializationError(_))),
            "got {result:?}"
        );
        assert_eq!(connection.get(HISTORY_KEY), Ok(Some("[{".to_owned())));
    }

    #[test]
    fn append_keeps_records_with_null_amounts() {
        let connection = get_test_connection();
        connection
            .set(
                HISTORY_KEY,
                r#"[{"totalEarned":"R$10.00","day":"01/02/2024"},{"totalEarned":null}]"#,
            )
            .unwrap();

        assert_eq!(append_record(record(TotalEarned::default()), &connection), Ok(3));

        let history = load_history(&connection).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(
            history[0].total_earned,
            TotalEarned::Formatted("R$10.00".to_owned())
        );
    }

    #[test]
    fn delete_keeps_unreadable_history() {
        let connection = get_test_connection();
        connection.set(HISTORY_KEY, "[{").unwrap();

        assert!(delete_record(0, &connection).is_err());
        assert_eq!(connection.get(HISTORY_KEY), Ok(Some("[{".to_owned())));
    }

    #[test]
    fn deleting_the_last_record_removes_the_history() {
        let connection = get_test_connection();
        append_record(record(TotalEarned::default()), &connection).unwrap();

        delete_record(0, &connection).unwrap();

        assert_eq!(connection.get(HISTORY_KEY), Ok(None));
        assert_eq!(load_history(&connection), Ok(vec![]));
    }
}
