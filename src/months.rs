// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Compute the look-ahead window of calendar months queried upstream (YYYYMM labels)
// role: window/months
// inputs: effective "now", number of months, whether to skip the current month
// outputs: Vec<String> of YYYYMM in chronological order
// invariants: consecutive months; year rollover handled; count equals requested months
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, Months, NaiveDate};

/// Months to query, starting at the month of `now` (or the next one when `skip_current`).
pub fn look_ahead_months(now: DateTime<Local>, count: u32, skip_current: bool) -> Result<Vec<String>> {
  let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).context("computing first day of month")?;
  let offset = if skip_current { 1 } else { 0 };

  (0..count)
    .map(|i| {
      first
        .checked_add_months(Months::new(i + offset))
        .map(|d| d.format("%Y%m").to_string())
        .with_context(|| format!("month {} out of range", i + offset))
    })
    .collect()
}

/// Parse a `--now-override` string into a local DateTime.
/// Accepts RFC3339, a naive `%Y-%m-%dT%H:%M:%S`, or a plain `%Y-%m-%d`.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Local>> {
  s.and_then(|raw| {
    chrono::DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Local))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .and_then(|ndt| ndt.and_local_timezone(Local).single())
      })
      .or_else(|| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
          .ok()
          .and_then(|d| d.and_hms_opt(12, 0, 0))
          .and_then(|ndt| ndt.and_local_timezone(Local).single())
      })
  })
}
