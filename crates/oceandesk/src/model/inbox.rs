//! Presentation helpers for the inbox screen.

use chrono::{DateTime, Datelike, Utc};
use oceandesk_api::{Category, Email};

/// Emails matching an optional category filter, in server order.
pub fn filter_emails<'a>(emails: &'a [Email], category: Option<&Category>) -> Vec<&'a Email> {
    emails
        .iter()
        .filter(|email| category.is_none_or(|c| &email.category == c))
        .collect()
}

/// Short label for a received time: clock time today, day this year, date otherwise.
pub fn timestamp_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if timestamp.date_naive() == now.date_naive() {
        timestamp.format("%H:%M").to_string()
    } else if timestamp.year() == now.year() {
        timestamp.format("%b %d").to_string()
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}

/// Single-line preview of a body, cut at `max_chars` characters.
pub fn snippet(body: &str, max_chars: usize) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use oceandesk_api::EmailId;

    fn email(id: i64, category: Category) -> Email {
        Email {
            id: EmailId::new(id),
            sender: format!("sender{id}@example.com"),
            subject: format!("Subject {id}"),
            body: String::new(),
            timestamp: None,
            category,
            is_read: false,
            action_items: String::new(),
        }
    }

    #[test]
    fn filter_keeps_order_and_matches_category() {
        let emails = vec![
            email(1, Category::Important),
            email(2, Category::Spam),
            email(3, Category::Important),
        ];

        let all = filter_emails(&emails, None);
        assert_eq!(all.len(), 3);

        let important: Vec<i64> = filter_emails(&emails, Some(&Category::Important))
            .iter()
            .map(|e| e.id.0)
            .collect();
        assert_eq!(important, vec![1, 3]);

        assert!(filter_emails(&emails, Some(&Category::ToDo)).is_empty());
    }

    #[test]
    fn timestamp_label_depends_on_distance() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 18, 0, 0).unwrap();

        let today = Utc.with_ymd_and_hms(2025, 6, 10, 9, 5, 0).unwrap();
        assert_eq!(timestamp_label(today, now), "09:05");

        let this_year = Utc.with_ymd_and_hms(2025, 2, 3, 9, 5, 0).unwrap();
        assert_eq!(timestamp_label(this_year, now), "Feb 03");

        let last_year = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(timestamp_label(last_year, now), "2024-12-31");
    }

    #[test]
    fn snippet_flattens_and_truncates() {
        assert_eq!(snippet("Hello\n\n  world", 40), "Hello world");
        assert_eq!(snippet("Quarterly numbers are in", 10), "Quarterly…");
        assert_eq!(snippet("", 10), "");
    }
}
