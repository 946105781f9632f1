// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the upstream offer JSON shapes, the normalized FlightRecord and the search parameters
// role: model/types
// outputs: Serde structs for flight offers; FlightRecord; Price; SearchParams; TimeRange
// invariants: Offer field names mirror the Transavia flightoffers payload; Price keeps the upstream value verbatim
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_TIMERANGE: &str = "0800-2200";

/// Response body of the flight offers endpoint. A missing list means no offers.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
  #[serde(default)]
  pub flight_offer: Vec<Offer>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
  pub outbound_flight: FlightLeg,
  pub inbound_flight: FlightLeg,
  pub pricing_info_sum: PricingInfo,
  pub deeplink: Deeplink,
}

impl Offer {
  /// Identity of an offer for deduplication: (outbound id, inbound id).
  pub fn key(&self) -> (String, String) {
    (self.outbound_flight.id.clone(), self.inbound_flight.id.clone())
  }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlightLeg {
  #[serde(deserialize_with = "string_or_number")]
  pub id: String,
  pub departure_date_time: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
  pub total_price_all_passengers: Price,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Deeplink {
  pub href: String,
}

fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Number(serde_json::Number),
  }

  Ok(match Raw::deserialize(de)? {
    Raw::Text(s) => s,
    Raw::Number(n) => n.to_string(),
  })
}

/// Fare as delivered upstream: a JSON number or a string. Displayed verbatim.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Price {
  Number(serde_json::Number),
  Text(String),
}

impl Price {
  /// Integer value of the fare. Floats truncate toward zero; strings must be base-10 integers.
  pub fn as_int(&self) -> Option<i64> {
    match self {
      Price::Number(n) => n
        .as_i64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
      Price::Text(s) => s.trim().parse().ok(),
    }
  }
}

impl From<i64> for Price {
  fn from(v: i64) -> Self {
    Price::Number(v.into())
  }
}

impl fmt::Display for Price {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Price::Number(n) => write!(f, "{}", n),
      Price::Text(s) => f.write_str(s),
    }
  }
}

/// One deduplicated round trip, ready for reporting.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlightRecord {
  pub leave: String,
  pub goback: String,
  pub price: Price,
  pub link: String,
}

/// Departure time-of-day window, `HHMM-HHMM`, applied to both legs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimeRange(String);

static RE_TIMERANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{4}$").unwrap());

impl FromStr for TimeRange {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if RE_TIMERANGE.is_match(s) {
      Ok(TimeRange(s.to_string()))
    } else {
      Err(format!("Please provide a timerange with format like {}", DEFAULT_TIMERANGE))
    }
  }
}

impl Default for TimeRange {
  fn default() -> Self {
    TimeRange(DEFAULT_TIMERANGE.to_string())
  }
}

impl fmt::Display for TimeRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Per-run search inputs; the month is supplied per request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchParams {
  pub origin: String,
  pub destination: String,
  pub stay_days: u32,
  pub timerange: TimeRange,
  pub direct_only: bool,
  pub adults: u32,
  pub result_limit: u32,
}

impl SearchParams {
  pub fn new(origin: &str, destination: &str, stay_days: u32, timerange: TimeRange) -> Self {
    Self {
      origin: origin.to_uppercase(),
      destination: destination.to_uppercase(),
      stay_days,
      timerange,
      direct_only: true,
      adults: 1,
      result_limit: 100,
    }
  }
}
