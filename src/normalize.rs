// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn raw flight offers into FlightRecords: dedup by flight-id pair, trim timestamps, annotate weekdays
// role: pipeline/normalizer
// inputs: &[Offer], &mut SeenOffers owned by the search session, WeekdayPlacement
// outputs: Vec<FlightRecord> in input order
// side_effects: Inserts every newly seen (outbound, inbound) pair into SeenOffers
// invariants:
// - a pair already in SeenOffers never yields a record, whichever month query returned it
// - unparseable timestamps still yield a record, just without the weekday
// - price and link are copied verbatim
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::model::{FlightRecord, Offer};

/// `YYYY-MM-DDTHH:MM`
const TIMESTAMP_LEN: usize = 16;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Where the weekday annotation goes relative to the timestamp.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum WeekdayPlacement {
  #[default]
  Suffix,
  Prefix,
}

/// Flight-id pairs already turned into records during this run.
#[derive(Debug, Default)]
pub struct SeenOffers {
  keys: HashSet<(String, String)>,
}

impl SeenOffers {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns true when the pair was not seen before.
  pub fn insert(&mut self, key: (String, String)) -> bool {
    self.keys.insert(key)
  }

  #[cfg(test)]
  pub fn contains(&self, outbound: &str, inbound: &str) -> bool {
    self.keys.contains(&(outbound.to_string(), inbound.to_string()))
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.keys.len()
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }
}

pub fn normalize(raw_offers: &[Offer], seen: &mut SeenOffers, placement: WeekdayPlacement) -> Vec<FlightRecord> {
  let mut out = Vec::with_capacity(raw_offers.len());

  for offer in raw_offers {
    if !seen.insert(offer.key()) {
      continue;
    }

    out.push(FlightRecord {
      leave: annotate(&offer.outbound_flight.departure_date_time, placement),
      goback: annotate(&offer.inbound_flight.departure_date_time, placement),
      price: offer.pricing_info_sum.total_price_all_passengers.clone(),
      link: offer.deeplink.href.clone(),
    });
  }

  out
}

/// Drop the seconds/zone tail so only `YYYY-MM-DDTHH:MM` remains.
pub fn truncate_timestamp(raw: &str) -> &str {
  if raw.len() > TIMESTAMP_LEN && raw.is_char_boundary(TIMESTAMP_LEN) {
    &raw[..TIMESTAMP_LEN]
  } else {
    raw
  }
}

/// Three-letter weekday (e.g. "Fri"), or None when the timestamp does not parse.
pub fn weekday_abbrev(timestamp: &str) -> Option<String> {
  NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
    .ok()
    .map(|dt| dt.format("%a").to_string())
}

fn annotate(raw: &str, placement: WeekdayPlacement) -> String {
  let ts = truncate_timestamp(raw);

  match (weekday_abbrev(ts), placement) {
    (Some(day), WeekdayPlacement::Suffix) => format!("{} ({})", ts, day),
    (Some(day), WeekdayPlacement::Prefix) => format!("({}) {}", day, ts),
    (None, _) => ts.to_string(),
  }
}
