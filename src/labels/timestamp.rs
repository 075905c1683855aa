//! Mixed-format date/time parsing

use chrono::NaiveDateTime;

const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
];

const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

/// Parse a combined `date time` string in whichever format it is written
///
/// Year-first dates are tried first. Ambiguous slash or dash dates are read
/// month-first unless `day_first` is set; the other order is the fallback,
/// so `25/01/2019` still parses without `day_first`.
pub fn parse_mixed_datetime(value: &str, day_first: bool) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (primary, fallback) = if day_first {
        (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS)
    } else {
        (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS)
    };

    ISO_FORMATS
        .iter()
        .chain(primary)
        .chain(fallback)
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
