use chrono::{DateTime, Utc};

/// Product dates, e.g. `Sun Sep 24 2023 11:40:00 GMT+0000 (UTC)`.
pub const LISTING_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z (%Z)";
pub const REVIEW_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const SALE_FORMAT: &str = "%m-%d";

pub fn listing_date(ts: &DateTime<Utc>) -> String {
    ts.format(LISTING_FORMAT).to_string()
}

pub fn review_date(ts: &DateTime<Utc>) -> String {
    ts.format(REVIEW_FORMAT).to_string()
}

pub fn sale_day(ts: &DateTime<Utc>) -> String {
    ts.format(SALE_FORMAT).to_string()
}
