use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::api::{CacheSettings, DEFAULT_API_URL};
use crate::deliver::{Delivery, MailSettings};
use crate::model::{DEFAULT_TIMERANGE, SearchParams, TimeRange};
use crate::normalize::WeekdayPlacement;
use crate::report::{ReportFormat, SectionSpec, SortKey};

pub const DEFAULT_MAX_PRICE: i64 = 250;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum DeliverArg {
  Auto,
  Print,
  File,
  Email,
}

#[derive(Parser, Debug)]
#[command(
    name = "fare-report",
    version,
    about = "Report cheap round-trip Transavia fares as HTML or text",
    long_about = None
)]
pub struct Cli {
  /// Origin airport code, e.g. AMS
  #[arg(value_parser = parse_airport, required_unless_present = "gen_man")]
  pub origin: Option<String>,

  /// Destination airport code, e.g. BCN
  #[arg(value_parser = parse_airport, required_unless_present = "gen_man")]
  pub destination: Option<String>,

  /// Days at destination
  #[arg(value_parser = parse_stay_days, required_unless_present = "gen_man")]
  pub stay_days: Option<u32>,

  /// Departure time-of-day window for both legs (HHMM-HHMM)
  #[arg(default_value = DEFAULT_TIMERANGE)]
  pub timerange: TimeRange,

  /// Drop offers above this total price
  #[arg(value_parser = parse_max_price, default_value_t = DEFAULT_MAX_PRICE)]
  pub max_price: i64,

  /// Number of calendar months to query
  #[arg(long, default_value_t = 4)]
  pub months: u32,

  /// Start the look-ahead window at next month instead of the current one
  #[arg(long)]
  pub from_next_month: bool,

  /// Report section sort key, repeatable (price | leave). Default: price, then leave
  #[arg(long = "sort", value_name = "KEY")]
  pub sort: Vec<String>,

  /// Row limit for sections sorted by price (0 = no limit)
  #[arg(long, default_value_t = 20)]
  pub price_limit: usize,

  /// Row limit for sections sorted by departure (0 = no limit)
  #[arg(long, default_value_t = 0)]
  pub leave_limit: usize,

  /// Output format
  #[arg(long, value_enum, default_value_t = ReportFormat::Html)]
  pub format: ReportFormat,

  /// Weekday annotation placement on departure timestamps
  #[arg(long, value_enum, default_value_t = WeekdayPlacement::Suffix)]
  pub weekday: WeekdayPlacement,

  /// Where the report goes. auto: file in local mode, email when FROM_MAIL/TO_MAIL are set, else stdout
  #[arg(long, value_enum, default_value_t = DeliverArg::Auto)]
  pub deliver: DeliverArg,

  /// File path for file delivery (default: <ORIGIN>-<DESTINATION>.html)
  #[arg(long)]
  pub out: Option<PathBuf>,

  /// Local/interactive mode: write the report to a file and cache API responses
  #[arg(long, env = "FARE_REPORT_LOCAL", value_parser = BoolishValueParser::new(), default_value_t = false)]
  pub local: bool,

  /// Cache API responses on disk (development)
  #[arg(long, env = "FARE_REPORT_CACHE", value_parser = BoolishValueParser::new(), default_value_t = false)]
  pub cache: bool,

  /// Directory for cached API responses
  #[arg(long, default_value = ".fare-report-cache")]
  pub cache_dir: PathBuf,

  /// Seconds a cached response stays valid
  #[arg(long, default_value_t = 3600)]
  pub cache_ttl_secs: u64,

  /// Pause between month requests, in seconds
  #[arg(long, default_value_t = 2)]
  pub delay_secs: u64,

  /// Transavia API key
  #[arg(long, env = "TRANSAVIA_KEY", hide_env_values = true)]
  pub api_key: Option<String>,

  /// Flight offers endpoint
  #[arg(long, env = "TRANSAVIA_API_URL", default_value = DEFAULT_API_URL)]
  pub api_url: String,

  /// Sender address for email delivery
  #[arg(long, env = "FROM_MAIL")]
  pub mail_from: Option<String>,

  /// Recipient addresses for email delivery (whitespace or comma separated)
  #[arg(long, env = "TO_MAIL")]
  pub mail_to: Option<String>,

  /// sendmail-compatible binary used for email delivery
  #[arg(long, default_value = "sendmail")]
  pub sendmail: String,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant that anchors the month window (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

fn parse_airport(s: &str) -> Result<String, String> {
  let code = s.trim();
  if code.len() >= 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
    Ok(code.to_ascii_uppercase())
  } else {
    Err("Please provide an airport code of at least two letters, e.g. AMS".into())
  }
}

fn parse_stay_days(s: &str) -> Result<u32, String> {
  match s.trim().parse::<u32>() {
    Ok(n) if n > 0 => Ok(n),
    _ => Err("Please provide a number for duration days".into()),
  }
}

fn parse_max_price(s: &str) -> Result<i64, String> {
  s.trim().parse::<i64>().map_err(|_| "Please provide a numeric max price".to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub params: SearchParams,
  pub max_price: i64,
  pub months: u32,
  pub skip_current_month: bool,
  pub sections: Vec<SectionSpec>,
  pub format: ReportFormat,
  pub weekday: WeekdayPlacement,
  pub delivery: Delivery,
  pub out: Option<String>,
  pub cache: Option<CacheSettings>,
  pub delay: Duration,
  #[serde(skip)]
  pub api_key: Option<String>,
  pub api_url: String,
  pub mail: MailSettings,
  pub now_override: Option<String>,
}

fn split_recipients(raw: Option<&str>) -> Vec<String> {
  raw
    .unwrap_or_default()
    .split(|c: char| c.is_whitespace() || c == ',')
    .filter(|s| !s.is_empty())
    .map(|s| s.to_string())
    .collect()
}

fn sections_from(sort: &[String], price_limit: usize, leave_limit: usize) -> Result<Vec<SectionSpec>> {
  let names: Vec<&str> = if sort.is_empty() {
    vec!["price", "leave"]
  } else {
    sort.iter().map(|s| s.as_str()).collect()
  };

  names
    .into_iter()
    .map(|name| -> Result<SectionSpec> {
      let key: SortKey = name.parse()?;
      let limit = match key {
        SortKey::Price => price_limit,
        SortKey::Leave => leave_limit,
      };
      Ok(SectionSpec { key, limit: (limit > 0).then_some(limit) })
    })
    .collect()
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let origin = cli.origin.context("missing origin airport")?;
  let destination = cli.destination.context("missing destination airport")?;
  let stay_days = cli.stay_days.context("missing stay duration")?;

  if cli.months == 0 {
    bail!("--months must be at least 1");
  }

  let sections = sections_from(&cli.sort, cli.price_limit, cli.leave_limit)?;

  let mail = MailSettings {
    from: cli.mail_from.filter(|s| !s.trim().is_empty()),
    to: split_recipients(cli.mail_to.as_deref()),
    sendmail: cli.sendmail,
  };

  let delivery = match cli.deliver {
    DeliverArg::Print => Delivery::Print,
    DeliverArg::File => Delivery::File,
    DeliverArg::Email => Delivery::Email,
    DeliverArg::Auto if cli.local => Delivery::File,
    DeliverArg::Auto if mail.is_configured() => Delivery::Email,
    DeliverArg::Auto => Delivery::Print,
  };

  if delivery == Delivery::Email && !mail.is_configured() {
    bail!("Please set FROM_MAIL and TO_MAIL env vars");
  }

  let cache = (cli.cache || cli.local).then(|| CacheSettings {
    dir: cli.cache_dir.clone(),
    ttl: Duration::from_secs(cli.cache_ttl_secs),
  });

  Ok(EffectiveConfig {
    params: SearchParams::new(&origin, &destination, stay_days, cli.timerange),
    max_price: cli.max_price,
    months: cli.months,
    skip_current_month: cli.from_next_month,
    sections,
    format: cli.format,
    weekday: cli.weekday,
    delivery,
    out: cli.out.map(|p| p.to_string_lossy().to_string()),
    cache,
    delay: Duration::from_secs(cli.delay_secs),
    api_key: cli.api_key,
    api_url: cli.api_url,
    mail,
    now_override: cli.now_override,
  })
}
