use chrono::{DateTime, NaiveDate};

/// Parse a claim date sent either as RFC 3339 or as a plain `YYYY-MM-DD`
/// (what an HTML date input submits).
pub fn parse_claim_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Render the claim date as `<Month>/<Year>`, e.g. `April/2023`.
pub fn claim_period(raw: &str) -> Option<String> {
    parse_claim_date(raw).map(|date| date.format("%B/%Y").to_string())
}
