//! Synthetic backlog used to simulate pagination without a backend.
//!
//! The history is a fixed sequence of `TOTAL_HISTORICAL_MESSAGES` entries,
//! indexed oldest (0) to newest. Timestamps recede one minute per entry from
//! an anchor instant, offset by a 15-minute lead so the newest synthetic
//! message is never "now". Everything here is a pure function of the
//! constants plus the anchor, so the pagination math is testable without a
//! store.

use crate::store::{Message, Sender};
use chrono::{DateTime, Duration, Utc};
use std::ops::Range;

pub const TOTAL_HISTORICAL_MESSAGES: usize = 60;
pub const MESSAGES_PER_PAGE: usize = 20;

const LEAD_MINUTES: i64 = 15;

fn offset_minutes(index: usize) -> i64 {
    LEAD_MINUTES + (TOTAL_HISTORICAL_MESSAGES - 1 - index) as i64
}

pub fn generate(anchor: DateTime<Utc>, range: Range<usize>) -> Vec<Message> {
    range
        .map(|index| {
            let number = index + 1;
            Message {
                id: format!("hist-{number}"),
                text: format!("This is an older, historical message number #{number}."),
                timestamp: anchor - Duration::minutes(offset_minutes(index)),
                sender: if number % 2 == 0 {
                    Sender::User
                } else {
                    Sender::Ai
                },
                image_url: None,
            }
        })
        .collect()
}

/// The most recent page, used to seed a fresh chatroom.
pub fn seed(anchor: DateTime<Utc>) -> Vec<Message> {
    generate(
        anchor,
        TOTAL_HISTORICAL_MESSAGES - MESSAGES_PER_PAGE..TOTAL_HISTORICAL_MESSAGES,
    )
}

/// Index range revealed by advancing from `current_page` to the next page.
pub fn revealed_range(current_page: usize) -> Range<usize> {
    let end = TOTAL_HISTORICAL_MESSAGES.saturating_sub(current_page * MESSAGES_PER_PAGE);
    let start = TOTAL_HISTORICAL_MESSAGES.saturating_sub((current_page + 1) * MESSAGES_PER_PAGE);
    start..end
}

/// Recovers the anchor from the oldest loaded message, so pages revealed
/// later continue the one-minute spacing of the pages already loaded.
pub fn anchor_for(oldest_timestamp: DateTime<Utc>, oldest_index: usize) -> DateTime<Utc> {
    oldest_timestamp + Duration::minutes(offset_minutes(oldest_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().expect("fixed anchor parses")
    }

    #[test]
    fn seed_is_the_newest_page() {
        let seed = seed(anchor());
        assert_eq!(seed.len(), MESSAGES_PER_PAGE);
        assert_eq!(seed.first().map(|m| m.id.as_str()), Some("hist-41"));
        assert_eq!(seed.last().map(|m| m.id.as_str()), Some("hist-60"));
    }

    #[test]
    fn newest_message_leads_by_fifteen_minutes() {
        let seed = seed(anchor());
        let newest = seed.last().expect("seed is non-empty");
        assert_eq!(anchor() - newest.timestamp, Duration::minutes(15));
    }

    #[test]
    fn timestamps_are_spaced_one_minute_apart_ascending() {
        let messages = generate(anchor(), 0..TOTAL_HISTORICAL_MESSAGES);
        for pair in messages.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::minutes(1));
        }
    }

    #[test]
    fn sender_alternates_by_message_number_parity() {
        for message in generate(anchor(), 0..TOTAL_HISTORICAL_MESSAGES) {
            let number: usize = message
                .id
                .strip_prefix("hist-")
                .and_then(|n| n.parse().ok())
                .expect("synthetic id carries the message number");
            let expected = if number % 2 == 0 {
                Sender::User
            } else {
                Sender::Ai
            };
            assert_eq!(message.sender, expected, "message {number}");
        }
    }

    #[test]
    fn revealed_ranges_cover_the_history_without_overlap() {
        assert_eq!(revealed_range(1), 20..40);
        assert_eq!(revealed_range(2), 0..20);
        assert_eq!(revealed_range(3), 0..0);
    }

    #[test]
    fn anchor_recovery_continues_the_spacing() {
        let seed = seed(anchor());
        let oldest = seed.first().expect("seed is non-empty");

        // The oldest seeded entry sits at index TOTAL - PAGE.
        let recovered = anchor_for(
            oldest.timestamp,
            TOTAL_HISTORICAL_MESSAGES - MESSAGES_PER_PAGE,
        );
        assert_eq!(recovered, anchor());

        let previous = generate(recovered, revealed_range(1));
        let newest_revealed = previous.last().expect("page is non-empty");
        assert_eq!(
            oldest.timestamp - newest_revealed.timestamp,
            Duration::minutes(1)
        );
    }
}
