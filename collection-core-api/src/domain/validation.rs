use chrono::{Duration, NaiveDate, NaiveDateTime};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use std::str::FromStr;
use validator::ValidateEmail;

/// Maximum digit count accepted for any phone field after normalization.
pub const MAX_PHONE_DIGITS: usize = 12;

/// Day zero of the legacy spreadsheet serial date scheme.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial dates outside this year range are treated as garbage input.
const SERIAL_YEAR_MIN: i32 = 2000;
const SERIAL_YEAR_MAX: i32 = 2100;

/// A single field-level validation problem. Problems are accumulated across
/// the whole record rather than failing on the first one, so the caller can
/// report every offending field at once.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Collected issues block the write: only required-field, phone-format
    /// and email-format problems produce issues. Enum and date softness
    /// degrade to defaults without ever landing here.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

/// Enum coercion rule: lower-case and trim the input, return the matching
/// canonical value, otherwise fall back to `default`. Invalid input degrades
/// silently instead of rejecting the record.
pub fn coerce_enum<T: FromStr>(raw: Option<&str>, default: Option<T>) -> Option<T> {
    let raw = match raw {
        Some(value) if !value.trim().is_empty() => value,
        _ => return default,
    };
    match T::from_str(&raw.trim().to_lowercase()) {
        Ok(value) => Some(value),
        Err(_) => default,
    }
}

/// Bounded-string rule: truncate to the column capacity (on a character
/// boundary); empty or absent input maps to `None`.
pub fn truncate_text<const N: usize>(raw: Option<&str>) -> Option<HeaplessString<N>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut out: HeaplessString<N> = HeaplessString::new();
    for ch in raw.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    Some(out)
}

/// Raised when a phone number still exceeds [`MAX_PHONE_DIGITS`] after all
/// non-digit characters are stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneTooLong;

impl std::fmt::Display for PhoneTooLong {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Phone number cannot exceed {MAX_PHONE_DIGITS} digits")
    }
}

/// Phone rule: keep only digits. Empty input is `None`, not an error;
/// requiredness is the caller's decision.
pub fn normalize_phone(raw: Option<&str>) -> Result<Option<HeaplessString<20>>, PhoneTooLong> {
    let raw = match raw {
        Some(value) => value,
        None => return Ok(None),
    };
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Ok(None);
    }
    if digits.len() > MAX_PHONE_DIGITS {
        return Err(PhoneTooLong);
    }
    Ok(Some(HeaplessString::try_from(digits.as_str()).expect("digits fit")))
}

pub fn valid_email(raw: &str) -> bool {
    raw.validate_email()
}

/// Date rule: accepts a legacy spreadsheet serial day count, `DD/MM/YYYY`,
/// or any of the ISO-ish formats the store itself produces. Total failure
/// yields `None` with a logged warning, never an error.
pub fn parse_flexible_date(field: &str, raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(date) = parse_serial_date(raw) {
        return Some(date);
    }
    for format in ["%d/%m/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    if let Some(datetime) = parse_datetime_formats(raw) {
        return Some(datetime.date());
    }
    tracing::warn!(field, value = raw, "unparseable date, storing NULL");
    None
}

/// Datetime variant of the date rule; date-only inputs land on midnight.
pub fn parse_flexible_datetime(field: &str, raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(date) = parse_serial_date(raw) {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Some(datetime) = parse_datetime_formats(raw) {
        return Some(datetime);
    }
    for format in ["%d/%m/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    tracing::warn!(field, value = raw, "unparseable datetime, storing NULL");
    None
}

/// Interpret a bare number as days since 1899-12-30, the serial scheme of
/// legacy spreadsheet exports. Values mapping outside 2000-2100 are not
/// plausible followup dates and are rejected.
fn parse_serial_date(raw: &str) -> Option<NaiveDate> {
    let serial: f64 = raw.parse().ok()?;
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    let date = epoch.checked_add_signed(Duration::days(serial.trunc() as i64))?;
    if !(SERIAL_YEAR_MIN..=SERIAL_YEAR_MAX).contains(&chrono::Datelike::year(&date)) {
        return None;
    }
    Some(date)
}

fn parse_datetime_formats(raw: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%d/%m/%Y %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime);
        }
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.naive_utc());
    }
    None
}

/// Amount rule: decimal parse with silent degradation, matching the enum
/// rule; amounts arrive from spreadsheet exports with stray formatting.
pub fn parse_amount(field: &str, raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    match Decimal::from_str(&cleaned) {
        Ok(amount) => Some(amount),
        Err(_) => {
            tracing::warn!(field, value = raw, "unparseable amount, storing NULL");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Shade {
        Light,
        Dark,
    }

    impl FromStr for Shade {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "light" => Ok(Shade::Light),
                "dark" => Ok(Shade::Dark),
                _ => Err(()),
            }
        }
    }

    #[test]
    fn enum_rule_normalizes_case_and_whitespace() {
        assert_eq!(coerce_enum::<Shade>(Some("  DaRk "), None), Some(Shade::Dark));
    }

    #[test]
    fn invalid_enum_coerces_to_default_not_error() {
        // Invalid input disappears into the default; nothing is rejected.
        assert_eq!(coerce_enum::<Shade>(Some("charcoal"), None), None);
        assert_eq!(
            coerce_enum::<Shade>(Some("charcoal"), Some(Shade::Light)),
            Some(Shade::Light)
        );
        assert_eq!(coerce_enum::<Shade>(None, Some(Shade::Light)), Some(Shade::Light));
    }

    #[test]
    fn truncates_to_capacity() {
        let value = truncate_text::<5>(Some("abcdefgh")).unwrap();
        assert_eq!(value.as_str(), "abcde");
        assert_eq!(truncate_text::<5>(Some("   ")), None);
        assert_eq!(truncate_text::<5>(None), None);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let value = truncate_text::<5>(Some("žžžž")).unwrap();
        // 2 bytes per char, only two fit in 5 bytes.
        assert_eq!(value.as_str(), "žž");
    }

    #[test]
    fn phone_strips_formatting() {
        let normalized = normalize_phone(Some("+91 99888-77665")).unwrap().unwrap();
        assert_eq!(normalized.as_str(), "919988877665");
    }

    #[test]
    fn phone_of_twelve_digits_is_accepted() {
        assert!(normalize_phone(Some("919988877665")).is_ok());
    }

    #[test]
    fn phone_of_thirteen_digits_is_rejected() {
        assert_eq!(normalize_phone(Some("9199888776651")), Err(PhoneTooLong));
    }

    #[test]
    fn empty_phone_is_none_not_error() {
        assert_eq!(normalize_phone(Some("  ")), Ok(None));
        assert_eq!(normalize_phone(Some("-")), Ok(None));
        assert_eq!(normalize_phone(None), Ok(None));
    }

    #[test]
    fn leap_day_parses() {
        assert_eq!(
            parse_flexible_date("paid_date", "29/02/2024"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn impossible_day_month_yields_none() {
        assert_eq!(parse_flexible_date("paid_date", "31/02/2024"), None);
    }

    #[test]
    fn spreadsheet_serial_dates_parse() {
        // 45352 days after 1899-12-30.
        assert_eq!(
            parse_flexible_date("paid_date", "45352"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        // Serial far outside 2000-2100 is garbage.
        assert_eq!(parse_flexible_date("paid_date", "12"), None);
        assert_eq!(parse_flexible_date("paid_date", "99999999"), None);
    }

    #[test]
    fn iso_and_datetime_inputs_parse() {
        assert_eq!(
            parse_flexible_date("paid_date", "2025-01-03"),
            NaiveDate::from_ymd_opt(2025, 1, 3)
        );
        let scheduled = parse_flexible_datetime("scheduled_at", "2025-01-01 13:00:00").unwrap();
        assert_eq!(scheduled.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-01-01 13:00:00");
        let from_date = parse_flexible_datetime("scheduled_at", "05/06/2025").unwrap();
        assert_eq!(from_date.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-06-05 00:00:00");
    }

    #[test]
    fn email_rule() {
        assert!(valid_email("agent@example.com"));
        assert!(!valid_email("not-an-email"));
    }

    #[test]
    fn amounts_tolerate_separators() {
        assert_eq!(parse_amount("loan_amount", "1,20,000.50"), Decimal::from_str("120000.50").ok());
        assert_eq!(parse_amount("loan_amount", "n/a"), None);
    }

    #[test]
    fn report_accumulates_every_issue() {
        let mut report = ValidationReport::new();
        assert!(report.is_clean());
        report.push("mobile", "Mobile number is required.");
        report.push("email", "Invalid email format");
        assert!(!report.is_clean());
        let issues = report.into_issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, "mobile");
    }
}
