// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build report sections from FlightRecords (filter by max price, sort, truncate) and render HTML or text
// role: report/builder
// inputs: &[FlightRecord], SortKey, max price, optional limit, ReportFormat
// outputs: Ordered rows per section; a rendered document string
// invariants:
// - no rendered row has an integer price above max_price
// - rows are ascending by the section's SortKey (stable for ties)
// - a limit keeps the first N rows after sorting
// - row field order is Leave, Goback, Price, Link
// errors: UnknownSortKey for unrecognized names; InvalidPrice when a fare is not an integer
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FlightRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
  #[error("unknown sort key '{0}' (expected one of: price, leave)")]
  UnknownSortKey(String),
  #[error("price '{0}' is not an integer")]
  InvalidPrice(String),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
  Price,
  Leave,
}

impl SortKey {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortKey::Price => "price",
      SortKey::Leave => "leave",
    }
  }

  fn compare(&self, a: &(i64, &FlightRecord), b: &(i64, &FlightRecord)) -> Ordering {
    match self {
      SortKey::Price => a.0.cmp(&b.0),
      SortKey::Leave => a.1.leave.cmp(&b.1.leave),
    }
  }
}

impl FromStr for SortKey {
  type Err = ReportError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "price" => Ok(SortKey::Price),
      "leave" => Ok(SortKey::Leave),
      _ => Err(ReportError::UnknownSortKey(s.to_string())),
    }
  }
}

impl fmt::Display for SortKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum ReportFormat {
  #[default]
  Html,
  Text,
}

impl ReportFormat {
  pub fn extension(&self) -> &'static str {
    match self {
      ReportFormat::Html => "html",
      ReportFormat::Text => "txt",
    }
  }
}

/// One section of the final document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
  pub key: SortKey,
  pub limit: Option<usize>,
}

/// Filter by `max_price`, sort ascending by `sort_key`, keep the first `limit` rows.
pub fn build_report(
  records: &[FlightRecord],
  sort_key: SortKey,
  max_price: i64,
  limit: Option<usize>,
) -> Result<Vec<FlightRecord>, ReportError> {
  let mut kept: Vec<(i64, &FlightRecord)> = Vec::with_capacity(records.len());

  for rec in records {
    let price = rec
      .price
      .as_int()
      .ok_or_else(|| ReportError::InvalidPrice(rec.price.to_string()))?;

    if price <= max_price {
      kept.push((price, rec));
    }
  }

  kept.sort_by(|a, b| sort_key.compare(a, b));

  if let Some(n) = limit {
    kept.truncate(n);
  }

  Ok(kept.into_iter().map(|(_, r)| r.clone()).collect())
}

fn section_title(key: SortKey, max_price: i64) -> String {
  format!("* Sorted by {} (max price {})", key, max_price)
}

fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

pub fn render_html_row(rec: &FlightRecord) -> String {
  format!(
    "<tr><td>{}</td><td>{}</td><td>{}</td><td><a href='{}' target='_blank'>book</a></td></tr>",
    escape_html(&rec.leave),
    escape_html(&rec.goback),
    escape_html(&rec.price.to_string()),
    escape_html(&rec.link),
  )
}

pub fn render_text_row(rec: &FlightRecord) -> String {
  format!("{:<24} {:<24} {:>8}  {}", rec.leave, rec.goback, rec.price.to_string(), rec.link)
}

/// Render one section (title, column header, rows).
pub fn render_section(rows: &[FlightRecord], key: SortKey, max_price: i64, format: ReportFormat) -> String {
  let title = section_title(key, max_price);
  let mut out: Vec<String> = Vec::with_capacity(rows.len() + 4);

  match format {
    ReportFormat::Html => {
      out.push(format!("<h2>{}</h2>", escape_html(&title)));
      out.push("<table>".into());
      out.push("<tr><th>Leave</th><th>Goback</th><th>Price</th><th>Link</th></tr>".into());
      out.extend(rows.iter().map(render_html_row));
      out.push("</table>".into());
    }
    ReportFormat::Text => {
      out.push(title);
      out.push(format!("{:<24} {:<24} {:>8}  {}", "Leave", "Goback", "Price", "Link"));
      out.push("-".repeat(24 + 1 + 24 + 1 + 8 + 2 + 4));
      out.extend(rows.iter().map(render_text_row));
    }
  }

  out.join("\n")
}

/// Full document: top-level heading followed by every section, newline-terminated.
pub fn render_document(
  records: &[FlightRecord],
  sections: &[SectionSpec],
  max_price: i64,
  format: ReportFormat,
) -> Result<String, ReportError> {
  let heading = format!("Results (max price {})", max_price);
  let mut parts: Vec<String> = Vec::with_capacity(sections.len() + 1);

  parts.push(match format {
    ReportFormat::Html => format!("<h1>{}</h1>", heading),
    ReportFormat::Text => format!("{}\n{}", heading, "=".repeat(heading.len())),
  });

  for section in sections {
    let rows = build_report(records, section.key, max_price, section.limit)?;
    parts.push(render_section(&rows, section.key, max_price, format));
  }

  let sep = match format {
    ReportFormat::Html => "\n",
    ReportFormat::Text => "\n\n",
  };
  Ok(parts.join(sep) + "\n")
}
