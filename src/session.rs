// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate a run: query each month in the window, normalize into one record list, render, deliver
// role: processing/orchestrator
// inputs: EffectiveConfig, a FlightApi backend, month labels
// outputs: Vec<FlightRecord> for the run; the rendered document handed to delivery
// side_effects: One upstream request per month; sleeps the pacing delay between requests
// invariants:
// - the SeenOffers set lives for the whole run, so a flight pair returned by several months is reported once
// - requests are strictly sequential; no delay after the last month
// errors: Upstream, decode and report errors abort the run (no partial report)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{FlightApi, OfferRequest, build_api};
use crate::cli::EffectiveConfig;
use crate::deliver::deliver;
use crate::model::{FlightRecord, Offer, OfferResponse, SearchParams};
use crate::months::{look_ahead_months, parse_now_override};
use crate::normalize::{SeenOffers, WeekdayPlacement, normalize};
use crate::report::render_document;
use crate::util;

pub struct SearchSession<'a> {
  api: &'a dyn FlightApi,
  api_url: String,
  params: SearchParams,
  placement: WeekdayPlacement,
  seen: SeenOffers,
  records: Vec<FlightRecord>,
}

impl<'a> SearchSession<'a> {
  pub fn new(api: &'a dyn FlightApi, api_url: &str, params: SearchParams, placement: WeekdayPlacement) -> Self {
    Self {
      api,
      api_url: api_url.to_string(),
      params,
      placement,
      seen: SeenOffers::new(),
      records: Vec::new(),
    }
  }

  /// Normalize a batch into the run's records; returns how many were new.
  pub fn ingest(&mut self, offers: &[Offer]) -> usize {
    let fresh = normalize(offers, &mut self.seen, self.placement);
    let added = fresh.len();
    self.records.extend(fresh);
    added
  }

  pub fn search_month(&mut self, month: &str) -> Result<usize> {
    let req = OfferRequest::new(&self.api_url, &self.params, month);
    let raw = self.api.fetch_offers(&req)?;
    let resp: OfferResponse =
      serde_json::from_value(raw).with_context(|| format!("unexpected flight offers payload for {}", month))?;

    if resp.flight_offer.is_empty() {
      warn!(month, "no offers returned");
    }

    let added = self.ingest(&resp.flight_offer);
    info!(month, offers = resp.flight_offer.len(), added, "queried month");

    Ok(added)
  }

  pub fn search_months(&mut self, months: &[String], delay: Duration) -> Result<()> {
    self.search_months_paced(months, delay, std::thread::sleep)
  }

  /// Query `months` in order, calling `pause(delay)` between consecutive requests only.
  fn search_months_paced(&mut self, months: &[String], delay: Duration, mut pause: impl FnMut(Duration)) -> Result<()> {
    for (i, month) in months.iter().enumerate() {
      if i > 0 && !delay.is_zero() {
        pause(delay);
      }
      self.search_month(month)?;
    }
    Ok(())
  }

  #[cfg(test)]
  pub fn records(&self) -> &[FlightRecord] {
    &self.records
  }

  pub fn into_records(self) -> Vec<FlightRecord> {
    self.records
  }
}

pub fn run(cfg: &EffectiveConfig) -> Result<()> {
  // Phase 1: backend and month window
  let api = build_api(cfg.api_key.as_deref(), cfg.cache.as_ref())?;
  let now = util::effective_now(parse_now_override(cfg.now_override.as_deref()));
  let months = look_ahead_months(now, cfg.months, cfg.skip_current_month)?;

  // Phase 2: query every month into one deduplicated record list
  let mut session = SearchSession::new(api.as_ref(), &cfg.api_url, cfg.params.clone(), cfg.weekday);
  session.search_months(&months, cfg.delay)?;
  let records = session.into_records();
  info!(records = records.len(), months = months.len(), "search finished");

  // Phase 3: render and deliver
  let document = render_document(&records, &cfg.sections, cfg.max_price, cfg.format)?;
  deliver(cfg, &document)
}
