use chrono::{DateTime, Datelike, Utc};

/// Returns the first four consecutive ASCII digits in `input`.
///
/// Date-ish columns are free text ("2024-2025", "October 2025", ISO timestamps),
/// so the earliest run wins: `"2024-2025"` yields `"2024"`. Absence of a match is
/// not an error.
pub fn extract_year(input: Option<&str>) -> Option<String> {
    let bytes = input?.as_bytes();
    let mut run_start = None;

    for (index, byte) in bytes.iter().enumerate() {
        if byte.is_ascii_digit() {
            let start = *run_start.get_or_insert(index);
            if index + 1 - start == 4 {
                return std::str::from_utf8(&bytes[start..=index])
                    .ok()
                    .map(str::to_string);
            }
        } else {
            run_start = None;
        }
    }

    None
}

/// Four-digit calendar year of a timestamp.
pub fn calendar_year(timestamp: &DateTime<Utc>) -> String {
    format!("{:04}", timestamp.year())
}

pub(crate) fn optional_calendar_year(timestamp: Option<&DateTime<Utc>>) -> Option<String> {
    timestamp.map(calendar_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn first_four_digit_run_wins() {
        assert_eq!(extract_year(Some("2024-2025")).as_deref(), Some("2024"));
        assert_eq!(extract_year(Some("October 2025")).as_deref(), Some("2025"));
        assert_eq!(
            extract_year(Some("2023-11-05T08:30:00.000Z")).as_deref(),
            Some("2023")
        );
    }

    #[test]
    fn missing_or_short_runs_yield_none() {
        assert_eq!(extract_year(Some("no digits here")), None);
        assert_eq!(extract_year(None), None);
        assert_eq!(extract_year(Some("")), None);
        assert_eq!(extract_year(Some("AY 24-25")), None);
        assert_eq!(extract_year(Some("1st sem 202")), None);
    }

    #[test]
    fn longer_runs_are_truncated_to_four_digits() {
        assert_eq!(extract_year(Some("batch 12345")).as_deref(), Some("1234"));
        assert_eq!(extract_year(Some("12 2019")).as_deref(), Some("2019"));
    }

    #[test]
    fn non_ascii_digits_are_ignored() {
        assert_eq!(extract_year(Some("٢٠٢٤ / 2024")).as_deref(), Some("2024"));
    }

    #[test]
    fn calendar_year_uses_utc() {
        let stamp = Utc
            .with_ymd_and_hms(2024, 12, 31, 23, 30, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(calendar_year(&stamp), "2024");
        assert_eq!(optional_calendar_year(None), None);
    }
}
