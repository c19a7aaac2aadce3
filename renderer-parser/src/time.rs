//! UPnP time strings (`H+:MM:SS[.F+]`)

use std::time::Duration;

/// Parse a UPnP duration or position string.
///
/// Returns `None` for `NOT_IMPLEMENTED`, empty and malformed values, which
/// callers treat as "undefined".
pub fn parse_upnp_time(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("NOT_IMPLEMENTED") {
        return None;
    }

    let (clock, fraction) = match value.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (value, None),
    };

    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.trim_start_matches('+').parse().ok()?;
    let minutes = parse_two_digit(parts.next()?)?;
    let seconds = parse_two_digit(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }

    let mut duration = Duration::from_secs(hours * 3600 + minutes * 60 + seconds);

    if let Some(fraction) = fraction {
        duration += parse_fraction(fraction)?;
    }

    Some(duration)
}

/// Format as `H:MM:SS`, the form used for `Seek` REL_TIME targets.
pub fn format_upnp_time(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Format as `H:MM:SS.mmm`, the form used for `res@duration`.
pub fn format_upnp_time_millis(duration: Duration) -> String {
    format!(
        "{}.{:03}",
        format_upnp_time(duration),
        duration.subsec_millis()
    )
}

fn parse_two_digit(part: &str) -> Option<u64> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = part.parse().ok()?;
    (value < 60).then_some(value)
}

// Either decimal digits or the `F0/F1` fraction form
fn parse_fraction(fraction: &str) -> Option<Duration> {
    if let Some((num, den)) = fraction.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den <= 0.0 || num < 0.0 || num >= den {
            return None;
        }
        return Some(Duration::from_secs_f64(num / den));
    }

    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = &fraction[..fraction.len().min(9)];
    let nanos: u32 = format!("{:0<9}", digits).parse().ok()?;
    Some(Duration::from_nanos(u64::from(nanos)))
}
