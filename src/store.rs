//! Key-value persistence for the state that survives page reloads.
//!
//! The history, the salary settings and the language preference are stored
//! as JSON strings under stable keys, mirroring what a browser would keep in
//! local storage. The store is a trait so that callers only depend on
//! get/set/remove; the app uses a SQLite table through [rusqlite::Connection].

use rusqlite::{Connection, OptionalExtension};
use serde::{Serialize, de::DeserializeOwned};

use crate::Error;

/// The key for the list of recorded earnings events.
pub const HISTORY_KEY: &str = "locations";
/// The key for the salary periodicity and hours per week.
pub const SALARY_CONFIG_KEY: &str = "salaryConfig";
/// The key for the language preference.
pub const LANGUAGE_KEY: &str = "userLanguage";

/// String key-value storage.
pub trait KeyValueStore {
    /// Get the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove the value stored under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

impl KeyValueStore for Connection {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.prepare("SELECT value FROM key_value WHERE key = :key;")?
            .query_row(&[(":key", key)], |row| row.get(0))
            .optional()
            .map_err(Error::from)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.execute(
            "INSERT INTO key_value (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            (key, value),
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.execute("DELETE FROM key_value WHERE key = ?1;", (key,))?;

        Ok(())
    }
}

/// Create the table backing [KeyValueStore] for [Connection].
pub fn create_key_value_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS key_value (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Create the tables needed by the application.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_key_value_table(connection)?;

    Ok(())
}

/// Load the JSON value under `key`.
///
/// A missing value yields `T::default()`. A value that cannot be decoded is
/// logged and also yields the default, so a corrupt entry never breaks a page.
pub fn load_json<T>(store: &impl KeyValueStore, key: &str) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    let Some(text) = store.get(key)? else {
        return Ok(T::default());
    };

    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::warn!("ignoring unreadable value stored under \"{key}\": {error}");
            Ok(T::default())
        }
    }
}

/// Load the JSON value under `key`, failing if it cannot be decoded.
///
/// A missing value yields `T::default()`. Use this before writing back a
/// modified value so that an unreadable entry is never overwritten.
pub fn try_load_json<T>(store: &impl KeyValueStore, key: &str) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    match store.get(key)? {
        Some(text) => serde_json::from_str(&text).map_err(|error| {
            tracing::error!("could not read the value stored under \"{key}\": {error}");
            Error::from(error)
        }),
        None => Ok(T::default()),
    }
}

/// Store `value` as JSON under `key`.
pub fn save_json<T>(store: &impl KeyValueStore, key: &str, value: &T) -> Result<(), Error>
where
    T: Serialize + ?Sized,
{
    let text = serde_json::to_string(value)?;
    store.set(key, &text)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::{KeyValueStore, initialize, load_json, save_json, try_load_json};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn get_missing_key_returns_none() {
        let connection = get_test_connection();

        assert_eq!(connection.get("nope"), Ok(None));
    }

    #[test]
    fn set_then_get_returns_value() {
        let connection = get_test_connection();

        connection.set("foo", "bar").unwrap();

        assert_eq!(connection.get("foo"), Ok(Some("bar".to_owned())));
    }

    #[test]
    fn set_replaces_existing_value() {
        let connection = get_test_connection();

        connection.set("foo", "bar").unwrap();
        connection.set("foo", "baz").unwrap();

        assert_eq!(connection.get("foo"), Ok(Some("baz".to_owned())));
    }

    #[test]
    fn remove_deletes_value() {
        let connection = get_test_connection();
        connection.set("foo", "bar").unwrap();

        connection.remove("foo").unwrap();

        assert_eq!(connection.get("foo"), Ok(None));
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let connection = get_test_connection();

        assert_eq!(connection.remove("foo"), Ok(()));
    }

    #[test]
    fn load_json_defaults_when_missing() {
        let connection = get_test_connection();

        let got: Vec<u32> = load_json(&connection, "numbers").unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn load_json_defaults_when_corrupt() {
        let connection = get_test_connection();
        connection.set("numbers", "{not json").unwrap();

        let got: Vec<u32> = load_json(&connection, "numbers").unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn try_load_json_fails_when_corrupt() {
        let connection = get_test_connection();
        connection.set("numbers", "{not json").unwrap();

        let got = try_load_json::<Vec<u32>>(&connection, "numbers");

        assert!(
            matches!(got, Err(Error::JSONSerializationError(_))),
            "got {got:?}"
        );
    }

    #[test]
    fn try_load_json_defaults_when_missing() {
        let connection = get_test_connection();

        assert_eq!(try_load_json::<Vec<u32>>(&connection, "numbers"), Ok(vec![]));
    }

    #[test]
    fn save_json_then_load_json() {
        let connection = get_test_connection();

        save_json(&connection, "numbers", &vec![1u32, 2, 3]).unwrap();
        let got: Vec<u32> = load_json(&connection, "numbers").unwrap();

        assert_eq!(got, vec![1, 2, 3]);
    }
}
