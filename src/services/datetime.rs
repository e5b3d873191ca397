use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static DATE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        // DD/MM/YYYY or DD-MM-YYYY
        Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})").expect("valid date regex"),
        // YYYY/MM/DD or YYYY-MM-DD
        Regex::new(r"(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})").expect("valid date regex"),
    ]
});

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("valid time regex"));

static MERIDIEM_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*(am|pm)").expect("valid time regex"));

static AT_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"alle\s*(\d{1,2})").expect("valid time regex"));

pub fn extract_date(text: &str) -> Option<String> {
    for pattern in DATE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let parts = [&caps[1], &caps[2], &caps[3]];
            if let Some(date) = interpret_date(parts) {
                return Some(date.format("%Y-%m-%d").to_string());
            }
        }
    }
    None
}

// A first component above 31 can only be a year.
fn interpret_date([a, b, c]: [&str; 3]) -> Option<NaiveDate> {
    let first: u32 = a.parse().ok()?;
    let month: u32 = b.parse().ok()?;
    let last: u32 = c.parse().ok()?;

    let (year, day) = if first > 31 {
        (first, last)
    } else {
        (last, first)
    };
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

pub fn extract_time(text: &str) -> Option<String> {
    let text = text.to_lowercase();

    if let Some(caps) = CLOCK_TIME.captures(&text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        if hour <= 23 && minute <= 59 {
            return Some(format!("{hour:02}:{minute:02}"));
        }
        return None;
    }

    if let Some(caps) = MERIDIEM_TIME.captures(&text) {
        let hour: u32 = caps[1].parse().ok()?;
        let hour = match (&caps[2], hour) {
            ("pm", h) if h < 12 => h + 12,
            ("am", 12) => 0,
            (_, h) => h,
        };
        if hour <= 23 {
            return Some(format!("{hour:02}:00"));
        }
    }

    if let Some(caps) = AT_HOUR.captures(&text) {
        let hour: u32 = caps[1].parse().ok()?;
        if hour <= 23 {
            return Some(format!("{hour:02}:00"));
        }
    }

    None
}
