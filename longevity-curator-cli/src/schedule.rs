//! Daily scheduling: one run per day at a fixed local wall-clock time.
//!
//! The next occurrence is computed with `chrono` in the process's local
//! timezone (set `TZ` to change it). Runs are strictly sequential; the loop
//! stops on Ctrl-C.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use longevity_curator::Curator;
use tracing::{info, warn};

pub const DEFAULT_POST_TIME: &str = "09:00";

/// Wall-clock time of day in 24h `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostTime(NaiveTime);

impl PostTime {
    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl Default for PostTime {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl FromStr for PostTime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(PostTime)
            .map_err(|e| anyhow!("invalid post time {s:?}, expected HH:MM: {e}"))
    }
}

impl fmt::Display for PostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// First instant strictly after `now` whose local time is `at`.
///
/// Days where `at` does not exist (DST gap) are skipped; on ambiguous days
/// the earlier instant is used.
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, at: PostTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    (0..=2).find_map(|offset| {
        let day = today.checked_add_signed(Duration::days(offset))?;
        let candidate = tz
            .from_local_datetime(&day.and_time(at.as_naive()))
            .earliest()?;
        (candidate > *now).then_some(candidate)
    })
}

/// Run `curator` once per day at `at` until interrupted.
pub async fn run_daily(curator: &Curator, at: PostTime) -> Result<()> {
    info!(post_time = %at, "[SCHEDULER] Will post daily at {at} (local time)");
    loop {
        let now = Local::now();
        let next = next_occurrence(&now, at)
            .ok_or_else(|| anyhow!("no valid occurrence of {at} in the next two days"))?;
        let wait = (next.clone() - now).to_std().unwrap_or_default();
        info!(next_run = %next, wait_secs = wait.as_secs(), "[SCHEDULER] Sleeping until next run");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "[SCHEDULER] Failed to listen for Ctrl-C");
                }
                info!("[SCHEDULER] Stopped.");
                return Ok(());
            }
        }

        let report = curator.run_once().await;
        info!(run_id = %report.run_id, "[SCHEDULER] Run finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn later_today_when_time_not_yet_passed() {
        let now = utc("2024-05-01T07:30:00Z");
        let next = next_occurrence(&now, "09:00".parse().unwrap()).unwrap();
        assert_eq!(next, utc("2024-05-01T09:00:00Z"));
    }

    #[test]
    fn tomorrow_when_time_passed_or_exact() {
        let at: PostTime = "09:00".parse().unwrap();
        assert_eq!(
            next_occurrence(&utc("2024-05-01T09:00:00Z"), at).unwrap(),
            utc("2024-05-02T09:00:00Z")
        );
        assert_eq!(
            next_occurrence(&utc("2024-12-31T23:59:00Z"), at).unwrap(),
            utc("2025-01-01T09:00:00Z")
        );
    }

    #[test]
    fn post_time_parsing() {
        assert_eq!("21:05".parse::<PostTime>().unwrap().to_string(), "21:05");
        assert_eq!(PostTime::default().to_string(), DEFAULT_POST_TIME);
        assert!("25:00".parse::<PostTime>().is_err());
        assert!("nine".parse::<PostTime>().is_err());
    }
}
