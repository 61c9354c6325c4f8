//! Race clock strings: plain milliseconds or `H:MM:SS.mmm` / `M:SS.mmm`.
use anyhow::{Context, Result, bail};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{1,3}):(\d{2})(?:\.(\d{1,3}))?$").expect("valid clock pattern")
});

/// Parse a duration flag into milliseconds.
///
/// Without an hour field the minutes may exceed 59 (`90:00` is an hour and a half).
pub fn parse_duration_ms(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if let Ok(ms) = trimmed.parse::<u64>() {
        return Ok(ms);
    }

    let Some(caps) = CLOCK.captures(trimmed) else {
        bail!("unrecognized duration: {input} (expected ms, M:SS.mmm or H:MM:SS.mmm)");
    };

    let hours = group(&caps, 1)?;
    let minutes = group(&caps, 2)?;
    let seconds = group(&caps, 3)?;
    let millis = caps
        .get(4)
        .map_or(Ok(0), |m| format!("{:0<3}", m.as_str()).parse::<u64>())
        .with_context(|| format!("invalid milliseconds in {input}"))?;

    if caps.get(1).is_some() && minutes >= 60 {
        bail!("minutes out of range in {input}");
    }
    if seconds >= 60 {
        bail!("seconds out of range in {input}");
    }

    hours
        .checked_mul(3_600_000)
        .and_then(|h| h.checked_add(minutes * 60_000))
        .and_then(|total| total.checked_add(seconds * 1_000 + millis))
        .with_context(|| format!("duration too large: {input}"))
}

fn group(caps: &Captures<'_>, index: usize) -> Result<u64> {
    caps.get(index).map_or(Ok(0), |m| {
        m.as_str()
            .parse::<u64>()
            .with_context(|| format!("number out of range: {}", m.as_str()))
    })
}

/// Render milliseconds as a race clock, dropping the hour field when zero.
pub fn format_duration(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = ms / 60_000 % 60;
    let seconds = ms / 1_000 % 60;
    let millis = ms % 1_000;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{minutes}:{seconds:02}.{millis:03}")
    }
}

/// Gap to the leading strategy, `-` for the leader itself.
pub fn format_gap(ms: u64) -> String {
    if ms == 0 {
        "-".to_string()
    } else {
        format!("+{}", format_duration(ms))
    }
}
