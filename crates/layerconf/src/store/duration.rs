//! Text form of time spans.
//!
//! Durations are stored as strings in TOML files (`timeout = "15s"`), so the
//! store needs one canonical formatter and a parser that accepts what people
//! actually write: `"10s"`, `"1h30m"`, `"250ms"`, `"1.5s"`.

use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Format a duration in its canonical text form.
///
/// ```
/// use std::time::Duration;
/// use layerconf::store::duration::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(15)), "15s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
/// assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
/// assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", fraction(nanos, NANOS_PER_MICRO));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", fraction(nanos, NANOS_PER_MILLI));
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = u128::from(total_secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&fraction(secs, NANOS_PER_SEC));
    out.push('s');
    out
}

/// Render `value / unit` with the fractional part trimmed of trailing zeros.
fn fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let remainder = value % unit;
    if remainder == 0 {
        return whole.to_string();
    }

    let width = unit.ilog10() as usize;
    let digits = format!("{remainder:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Parse a duration from its text form.
///
/// Accepts a sequence of `<number>[.<fraction>]<unit>` terms with units
/// `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`. A bare number is read as
/// nanoseconds. Negative durations clamp to zero since `Duration` is
/// unsigned. Returns `None` for anything else.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let trimmed = input.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        Some(_) => (false, trimmed),
        None => return None,
    };

    if body.is_empty() {
        return None;
    }

    let total = if body.chars().all(|c| c.is_ascii_digit()) {
        body.parse::<u128>().ok()?
    } else {
        parse_terms(body)?
    };

    if negative {
        return Some(Duration::ZERO);
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
    let nanos = (total % NANOS_PER_SEC) as u32;
    Some(Duration::new(secs, nanos))
}

fn parse_terms(body: &str) -> Option<u128> {
    let mut rest = body;
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let whole_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let whole = &rest[..whole_len];
        rest = &rest[whole_len..];

        let mut frac = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_dot.len());
            frac = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }

        if whole.is_empty() && frac.is_empty() {
            return None;
        }

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = unit_nanos(&rest[..unit_len])?;
        rest = &rest[unit_len..];

        let whole_value: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut term = whole_value.checked_mul(unit)?;

        if !frac.is_empty() {
            // Precision beyond nine fractional digits is dropped.
            let frac = &frac[..frac.len().min(9)];
            let scale = 10u128.checked_pow(frac.len() as u32)?;
            let frac_value: u128 = frac.parse().ok()?;
            term = term.checked_add(frac_value.checked_mul(unit)? / scale)?;
        }

        total = total.checked_add(term)?;
    }

    Some(total)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}
