// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Transavia flight-offers client behind a trait seam (HTTP, env fixtures, on-disk dev cache)
// role: api/flight-offers
// inputs: SearchParams + month (YYYYMM); API key; env FARE_REPORT_TEST_OFFERS_JSON / FARE_REPORT_TEST_OFFERS_DIR for fixtures
// outputs: Raw JSON response per month
// side_effects: Network calls to the offers endpoint; cache files under the cache dir when enabled
// invariants:
// - one GET per OfferRequest; the API key travels only in the `apikey` header, never in the URL
// - HTTP 204 yields an empty document (no offers)
// - cached responses are reused only while younger than the TTL
// - cache file names hash the URL with DefaultHasher, which is not stable across Rust releases; a toolchain upgrade only costs cache misses
// errors: Transport and non-success statuses bubble up with the month in context; no retries
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::SearchParams;

pub const DEFAULT_API_URL: &str = "https://api.transavia.com/v1/flightoffers";

const ENV_OFFERS_JSON: &str = "FARE_REPORT_TEST_OFFERS_JSON";
const ENV_OFFERS_DIR: &str = "FARE_REPORT_TEST_OFFERS_DIR";

/// A single month query against the offers endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferRequest {
  pub month: String,
  pub url: String,
}

impl OfferRequest {
  pub fn new(base_url: &str, params: &SearchParams, month: &str) -> Self {
    let url = format!(
      "{base}?origin={origin}&destination={destination}\
       &origindeparturedate={month}&destinationdeparturedate={month}\
       &origindeparturetime={tr}&destinationdeparturetime={tr}\
       &daysatdestination={days}&directflight={direct}&adults={adults}\
       &limit={limit}&orderby=Price",
      base = base_url,
      origin = params.origin,
      destination = params.destination,
      month = month,
      tr = params.timerange,
      days = params.stay_days,
      direct = params.direct_only,
      adults = params.adults,
      limit = params.result_limit,
    );
    Self { month: month.to_string(), url }
  }
}

// --- Trait seam for the offers API ---
pub trait FlightApi {
  fn fetch_offers(&self, req: &OfferRequest) -> Result<serde_json::Value>;
}

struct HttpApi {
  agent: ureq::Agent,
  api_key: String,
}

impl HttpApi {
  fn new(api_key: String) -> Self {
    Self::with_proxy(api_key, ureq::Proxy::try_from_env())
  }

  fn with_proxy(api_key: String, proxy: Option<ureq::Proxy>) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .proxy(proxy)
      .timeout_global(Some(Duration::from_secs(30)))
      .http_status_as_error(false)
      .build()
      .into();
    Self { agent, api_key }
  }
}

impl FlightApi for HttpApi {
  fn fetch_offers(&self, req: &OfferRequest) -> Result<serde_json::Value> {
    debug!(url = %req.url, "requesting flight offers");

    let mut resp = self
      .agent
      .get(&req.url)
      .header("Accept", "application/json")
      .header("User-Agent", "fare-report")
      .header("apikey", self.api_key.as_str())
      .call()
      .with_context(|| format!("requesting flight offers for {}", req.month))?;

    let status = resp.status().as_u16();

    if status == 204 {
      return Ok(serde_json::json!({}));
    }

    if !(200..300).contains(&status) {
      bail!("flight offers request for {} failed: HTTP {}", req.month, status);
    }

    resp
      .body_mut()
      .read_json::<serde_json::Value>()
      .with_context(|| format!("decoding flight offers for {}", req.month))
  }
}

/// Serves canned responses from the environment (tests, offline demos).
struct EnvFixtureApi;

impl FlightApi for EnvFixtureApi {
  fn fetch_offers(&self, req: &OfferRequest) -> Result<serde_json::Value> {
    if let Ok(s) = std::env::var(ENV_OFFERS_JSON) {
      return serde_json::from_str(&s).with_context(|| format!("parsing {}", ENV_OFFERS_JSON));
    }

    let Ok(dir) = std::env::var(ENV_OFFERS_DIR) else {
      return Ok(serde_json::json!({}));
    };
    let path = PathBuf::from(dir).join(format!("{}.json", req.month));

    if !path.exists() {
      return Ok(serde_json::json!({}));
    }
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
  }
}

fn env_wants_fixture() -> bool {
  std::env::var(ENV_OFFERS_JSON).is_ok() || std::env::var(ENV_OFFERS_DIR).is_ok()
}

// --- Development cache: one JSON file per request URL ---
struct DiskCachedApi {
  inner: Box<dyn FlightApi>,
  dir: PathBuf,
  ttl: Duration,
}

impl DiskCachedApi {
  fn new(inner: Box<dyn FlightApi>, dir: PathBuf, ttl: Duration) -> Self {
    Self { inner, dir, ttl }
  }

  fn entry_path(&self, url: &str) -> PathBuf {
    let mut h = DefaultHasher::new();
    url.hash(&mut h);
    self.dir.join(format!("{:016x}.json", h.finish()))
  }

  fn read_fresh(&self, path: &Path) -> Option<serde_json::Value> {
    let age = std::fs::metadata(path).ok()?.modified().ok()?.elapsed().ok()?;

    if age >= self.ttl {
      return None;
    }
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
  }
}

impl FlightApi for DiskCachedApi {
  fn fetch_offers(&self, req: &OfferRequest) -> Result<serde_json::Value> {
    let path = self.entry_path(&req.url);

    if let Some(v) = self.read_fresh(&path) {
      debug!(month = %req.month, path = %path.display(), "cache hit");
      return Ok(v);
    }

    let v = self.inner.fetch_offers(req)?;
    std::fs::create_dir_all(&self.dir).with_context(|| format!("creating cache dir {}", self.dir.display()))?;
    std::fs::write(&path, serde_json::to_vec_pretty(&v)?).with_context(|| format!("writing {}", path.display()))?;

    Ok(v)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
  pub dir: PathBuf,
  pub ttl: Duration,
}

/// Pick the backend: env fixtures when present, otherwise HTTP (API key required); optionally cached.
pub fn build_api(api_key: Option<&str>, cache: Option<&CacheSettings>) -> Result<Box<dyn FlightApi>> {
  let inner: Box<dyn FlightApi> = if env_wants_fixture() {
    debug!("using fixture offers from environment");
    Box::new(EnvFixtureApi)
  } else {
    let key = api_key
      .map(str::trim)
      .filter(|k| !k.is_empty())
      .context("Missing API key. Set TRANSAVIA_KEY or pass --api-key")?;
    Box::new(HttpApi::new(key.to_string()))
  };

  Ok(match cache {
    Some(c) => Box::new(DiskCachedApi::new(inner, c.dir.clone(), c.ttl)),
    None => inner,
  })
}
