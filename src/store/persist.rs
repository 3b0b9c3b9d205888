use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn data_dir() -> PathBuf {
    home_dir().join(".parlor")
}

/// Slot holding the serialized ChatState snapshot.
pub fn chat_store_path() -> PathBuf {
    data_dir().join("chatStore.json")
}

/// Slot holding the simulated login session.
pub fn login_path() -> PathBuf {
    data_dir().join("login.json")
}

/// Slot holding the theme preference.
pub fn theme_path() -> PathBuf {
    data_dir().join("theme.json")
}

pub fn read_slot<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    serde_json::from_slice(&data)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))
}

pub fn write_slot<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if path.exists() {
                fs::remove_file(path)?;
                fs::rename(&tmp_path, path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

pub fn remove_slot(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn temp_slot(prefix: &str) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "parlor_slot_{prefix}_{}_{}.json",
        std::process::id(),
        nanos
    ))
}

#[cfg(test)]
mod tests {
    use super::{read_slot, remove_slot, temp_slot, write_slot};
    use serde_json::json;
    use std::fs;

    #[test]
    fn write_then_read_reproduces_value() {
        let path = temp_slot("roundtrip");
        let value = json!({ "name": "Room A", "currentPage": 1 });

        write_slot(&path, &value).expect("slot should write");
        let loaded: serde_json::Value = read_slot(&path).expect("slot should read back");
        assert_eq!(loaded, value);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn write_overwrites_previous_snapshot() {
        let path = temp_slot("overwrite");

        write_slot(&path, &json!({ "v": 1 })).expect("first write");
        write_slot(&path, &json!({ "v": 2 })).expect("second write");

        let loaded: serde_json::Value = read_slot(&path).expect("slot should read back");
        assert_eq!(loaded, json!({ "v": 2 }));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_reports_corrupt_slot() {
        let path = temp_slot("corrupt");
        fs::write(&path, b"not json {").expect("fixture should write");

        let error = read_slot::<serde_json::Value>(&path).expect_err("corrupt slot should fail");
        assert!(error.contains("failed to parse"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn remove_missing_slot_is_a_no_op() {
        let path = temp_slot("remove_missing");
        remove_slot(&path).expect("removing a missing slot should succeed");
    }
}
