//! Simulated login session — the desktop analog of the original demo's
//! `login` cookie. Nothing here authenticates anything; the OTP flow only
//! gates which screen the app starts on.

use crate::store::persist;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const LOGIN_TTL_DAYS: i64 = 7;

pub const PHONE_DIGITS: usize = 10;
pub const OTP_DIGITS: usize = 6;

/// Static calling-code table for the login dropdown. The original fetched
/// this from restcountries.com; a live lookup is out of scope here.
pub const COUNTRY_CODES: &[(&str, &str)] = &[
    ("Australia", "+61"),
    ("Brazil", "+55"),
    ("Canada", "+1"),
    ("China", "+86"),
    ("France", "+33"),
    ("Germany", "+49"),
    ("India", "+91"),
    ("Indonesia", "+62"),
    ("Italy", "+39"),
    ("Japan", "+81"),
    ("Mexico", "+52"),
    ("Netherlands", "+31"),
    ("Nigeria", "+234"),
    ("South Africa", "+27"),
    ("South Korea", "+82"),
    ("Spain", "+34"),
    ("United Arab Emirates", "+971"),
    ("United Kingdom", "+44"),
    ("United States", "+1"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSession {
    pub phone: String,
    pub expires_at: DateTime<Utc>,
}

impl LoginSession {
    pub fn new(phone: String) -> Self {
        Self {
            phone,
            expires_at: Utc::now() + Duration::days(LOGIN_TTL_DAYS),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Returns the active session, if any. Expired sessions are cleared, corrupt
/// ones are discarded with a warning; neither surfaces as an error.
pub fn load(path: &Path) -> Option<LoginSession> {
    if !path.exists() {
        return None;
    }

    match persist::read_slot::<LoginSession>(path) {
        Ok(session) if !session.is_expired() => Some(session),
        Ok(_) => {
            let _ = persist::remove_slot(path);
            None
        }
        Err(err) => {
            tracing::warn!("discarding login session: {err}");
            None
        }
    }
}

pub fn save(path: &Path, session: &LoginSession) {
    if let Err(err) = persist::write_slot(path, session) {
        tracing::warn!("failed to persist login session: {err}");
    }
}

pub fn clear(path: &Path) {
    if let Err(err) = persist::remove_slot(path) {
        tracing::warn!("failed to clear login session: {err}");
    }
}

pub fn valid_phone(digits: &str) -> bool {
    digits.len() == PHONE_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
}

pub fn valid_otp(code: &str) -> bool {
    code.len() == OTP_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn phone_must_be_exactly_ten_digits() {
        assert!(valid_phone("5551234567"));
        assert!(!valid_phone("555123456"));
        assert!(!valid_phone("55512345678"));
        assert!(!valid_phone("555123456a"));
        assert!(!valid_phone(""));
    }

    #[test]
    fn otp_must_be_exactly_six_digits() {
        assert!(valid_otp("123456"));
        assert!(!valid_otp("12345"));
        assert!(!valid_otp("12345x"));
    }

    #[test]
    fn session_round_trips_through_its_slot() {
        let path = persist::temp_slot("login_roundtrip");
        let session = LoginSession::new("5551234567".to_string());

        save(&path, &session);
        let loaded = load(&path).expect("fresh session should load");
        assert_eq!(loaded.phone, "5551234567");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn expired_session_is_cleared_on_load() {
        let path = persist::temp_slot("login_expired");
        let session = LoginSession {
            phone: "5551234567".to_string(),
            expires_at: Utc::now() - Duration::days(1),
        };
        persist::write_slot(&path, &session).expect("fixture should write");

        assert!(load(&path).is_none());
        assert!(!path.exists(), "expired slot is removed");
    }

    #[test]
    fn corrupt_session_slot_is_ignored() {
        let path = persist::temp_slot("login_corrupt");
        fs::write(&path, b"][").expect("fixture should write");

        assert!(load(&path).is_none());

        let _ = fs::remove_file(path);
    }
}
