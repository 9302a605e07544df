/// Request parameter validation and query building
///
/// Everything here runs before a request is sent; a failure is an
/// `ApiError::Validation` and no network call happens.
use super::types::SwapSimulateData;
use crate::apis::client::QueryParams;
use crate::errors::ApiError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Wire format of `since` / `until`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ============================================================================
// TIME WINDOW
// ============================================================================

/// Closed `[since, until]` interval in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    since: NaiveDateTime,
    until: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(since: NaiveDateTime, until: NaiveDateTime) -> Result<Self, ApiError> {
        if since > until {
            return Err(ApiError::Validation(format!(
                "since ({}) is later than until ({})",
                since.format(TIMESTAMP_FORMAT),
                until.format(TIMESTAMP_FORMAT)
            )));
        }
        Ok(Self { since, until })
    }

    /// Parse two ISO-8601 timestamps
    pub fn parse(since: &str, until: &str) -> Result<Self, ApiError> {
        Self::new(
            parse_timestamp("since", since)?,
            parse_timestamp("until", until)?,
        )
    }

    /// The `days` days ending now
    pub fn last_days(days: i64) -> Result<Self, ApiError> {
        if days <= 0 {
            return Err(ApiError::Validation(format!(
                "window length must be positive, got {} day(s)",
                days
            )));
        }
        let until = Utc::now().naive_utc();
        Self::new(until - Duration::days(days), until)
    }

    pub fn since(&self) -> NaiveDateTime {
        self.since
    }

    pub fn until(&self) -> NaiveDateTime {
        self.until
    }

    pub fn since_param(&self) -> String {
        self.since.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn until_param(&self) -> String {
        self.until.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push("since", self.since_param())
            .push("until", self.until_param())
    }
}

/// Accepts RFC 3339 (offset converted to UTC), naive date-times with or
/// without fractional seconds, and bare dates (midnight)
pub fn parse_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::Validation(format!("{} must not be empty", field)));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(ApiError::Validation(format!(
        "{} is not an ISO-8601 timestamp: '{}'",
        field, raw
    )))
}

// ============================================================================
// PATH SEGMENTS
// ============================================================================

/// Addresses are interpolated into URL paths; reject anything that would
/// change the path structure
pub fn path_segment<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{} must not be empty", field)));
    }
    if trimmed.contains(['/', '?', '#', ' ']) {
        return Err(ApiError::Validation(format!(
            "{} contains invalid characters: '{}'",
            field, trimmed
        )));
    }
    Ok(trimmed)
}

// ============================================================================
// SWAP SIMULATION
// ============================================================================

impl SwapSimulateData {
    pub fn new(
        offer_address: impl Into<String>,
        ask_address: impl Into<String>,
        units: impl Into<String>,
        slippage_tolerance: impl Into<String>,
    ) -> Self {
        Self {
            offer_address: offer_address.into(),
            ask_address: ask_address.into(),
            units: units.into(),
            slippage_tolerance: slippage_tolerance.into(),
            referral_address: None,
            referral_fee_bps: None,
        }
    }

    pub fn with_referral(mut self, address: impl Into<String>, fee_bps: impl Into<String>) -> Self {
        self.referral_address = Some(address.into());
        self.referral_fee_bps = Some(fee_bps.into());
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        path_segment("offer_address", &self.offer_address)?;
        path_segment("ask_address", &self.ask_address)?;

        let units = self.units.trim();
        let is_positive_integer = !units.is_empty()
            && units.chars().all(|c| c.is_ascii_digit())
            && units.chars().any(|c| c != '0');
        if !is_positive_integer {
            return Err(ApiError::Validation(format!(
                "units must be a positive integer, got '{}'",
                self.units
            )));
        }

        let slippage = Decimal::from_str(self.slippage_tolerance.trim()).map_err(|_| {
            ApiError::Validation(format!(
                "slippage_tolerance is not a decimal: '{}'",
                self.slippage_tolerance
            ))
        })?;
        if slippage < Decimal::ZERO || slippage > Decimal::ONE {
            return Err(ApiError::Validation(format!(
                "slippage_tolerance must be within [0, 1], got {}",
                slippage
            )));
        }

        if let Some(bps) = self.referral_fee_bps.as_deref() {
            if bps.trim().parse::<u32>().is_err() {
                return Err(ApiError::Validation(format!(
                    "referral_fee_bps must be a non-negative integer, got '{}'",
                    bps
                )));
            }
        }
        Ok(())
    }

    /// Query string with unset referral fields left out
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push("offer_address", self.offer_address.trim())
            .push("ask_address", self.ask_address.trim())
            .push("units", self.units.trim())
            .push("slippage_tolerance", self.slippage_tolerance.trim())
            .push_opt("referral_address", self.referral_address.as_deref())
            .push_opt("referral_fee_bps", self.referral_fee_bps.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate() -> SwapSimulateData {
        SwapSimulateData::new("EQoffer", "EQask", "1000000", "0.01")
    }

    #[test]
    fn test_window_rejects_reversed_bounds() {
        let err = TimeWindow::parse("2024-02-01T00:00:00", "2024-01-01T00:00:00").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_window_allows_equal_bounds() {
        let window = TimeWindow::parse("2024-01-01", "2024-01-01T00:00:00").unwrap();
        assert_eq!(window.since_param(), "2024-01-01T00:00:00");
        assert_eq!(window.until_param(), "2024-01-01T00:00:00");
    }

    #[test]
    fn test_rfc3339_offset_is_normalized_to_utc() {
        let ts = parse_timestamp("since", "2024-03-10T12:30:00+02:00").unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-03-10T10:30:00");
        let frac = parse_timestamp("since", "2024-03-10T12:30:00.250").unwrap();
        assert_eq!(frac.format(TIMESTAMP_FORMAT).to_string(), "2024-03-10T12:30:00");
    }

    #[test]
    fn test_garbage_timestamp_is_rejected() {
        assert!(parse_timestamp("since", "yesterday").is_err());
        assert!(parse_timestamp("since", "").is_err());
    }

    #[test]
    fn test_last_days() {
        let window = TimeWindow::last_days(7).unwrap();
        assert_eq!(window.until() - window.since(), Duration::days(7));
        assert!(TimeWindow::last_days(0).is_err());
    }

    #[test]
    fn test_path_segment_rules() {
        assert_eq!(path_segment("pool", "  EQabc ").unwrap(), "EQabc");
        assert!(path_segment("pool", "").is_err());
        assert!(path_segment("pool", "EQ/../x").is_err());
        assert!(path_segment("pool", "EQ?x=1").is_err());
    }

    #[test]
    fn test_simulate_validation() {
        assert!(simulate().validate().is_ok());
        assert!(SwapSimulateData::new("", "EQask", "1", "0.01").validate().is_err());
        assert!(SwapSimulateData::new("EQoffer", "EQask", "0", "0.01").validate().is_err());
        assert!(SwapSimulateData::new("EQoffer", "EQask", "-5", "0.01").validate().is_err());
        assert!(SwapSimulateData::new("EQoffer", "EQask", "1.5", "0.01").validate().is_err());
        assert!(SwapSimulateData::new("EQoffer", "EQask", "10", "1.5").validate().is_err());
        assert!(SwapSimulateData::new("EQoffer", "EQask", "10", "abc").validate().is_err());
        assert!(SwapSimulateData::new("EQoffer", "EQask", "10", "1").validate().is_ok());
    }

    #[test]
    fn test_simulate_query_omits_unset_referral() {
        let query = simulate().to_query();
        assert_eq!(query.len(), 4);
        assert!(!query.contains_key("referral_address"));
        assert!(!query.contains_key("referral_fee_bps"));

        let query = simulate().with_referral("EQref", "10").to_query();
        assert_eq!(query.get("referral_address"), Some("EQref"));
        assert_eq!(query.get("referral_fee_bps"), Some("10"));
    }
}
