// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Hand the rendered report to its destination: stdout, a file, or email through a sendmail binary
// role: delivery/output
// inputs: EffectiveConfig (delivery, out, mail settings, format), rendered document
// outputs: stdout text, a report file, or a mail handed to sendmail
// side_effects: Writes files; spawns the sendmail subprocess
// invariants:
// - default file name is <ORIGIN>-<DESTINATION>.<html|txt>
// - mail subject is "Flights <ORIGIN> - <DESTINATION> (<N> days stay)"
// errors: IO and sendmail failures surface with path/command context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cli::EffectiveConfig;
use crate::model::SearchParams;
use crate::report::ReportFormat;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
  Print,
  File,
  Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
  pub from: Option<String>,
  pub to: Vec<String>,
  pub sendmail: String,
}

impl MailSettings {
  pub fn is_configured(&self) -> bool {
    self.from.is_some() && !self.to.is_empty()
  }
}

pub fn subject(params: &SearchParams) -> String {
  format!("Flights {} - {} ({} days stay)", params.origin, params.destination, params.stay_days)
}

pub fn default_file_name(params: &SearchParams, format: ReportFormat) -> String {
  format!("{}-{}.{}", params.origin, params.destination, format.extension())
}

/// RFC 5322 message with a single HTML or plain-text body.
pub fn compose_message(from: &str, to: &[String], subject: &str, body: &str, format: ReportFormat) -> String {
  let content_type = match format {
    ReportFormat::Html => "text/html",
    ReportFormat::Text => "text/plain",
  };

  format!(
    "From: {}\nTo: {}\nSubject: {}\nMIME-Version: 1.0\nContent-Type: {}; charset=utf-8\nContent-Transfer-Encoding: 8bit\n\n{}",
    from,
    to.join(", "),
    subject,
    content_type,
    body
  )
}

fn send_mail(sendmail: &str, message: &str) -> Result<()> {
  let mut child = Command::new(sendmail)
    .args(["-t", "-i"])
    .stdin(Stdio::piped())
    .stdout(Stdio::null())
    .stderr(Stdio::piped())
    .spawn()
    .with_context(|| format!("spawning {}", sendmail))?;

  {
    let mut stdin = child.stdin.take().context("opening sendmail stdin")?;
    stdin.write_all(message.as_bytes()).context("writing message to sendmail")?;
  }

  let out = child.wait_with_output().with_context(|| format!("waiting for {}", sendmail))?;

  if !out.status.success() {
    let stderr = String::from_utf8_lossy(&out.stderr);
    bail!("{} failed ({}): {}", sendmail, out.status, stderr.trim());
  }

  Ok(())
}

pub fn deliver(cfg: &EffectiveConfig, document: &str) -> Result<()> {
  match cfg.delivery {
    Delivery::Print => {
      print!("{}", document);
    }
    Delivery::File => {
      let path = cfg
        .out
        .clone()
        .unwrap_or_else(|| default_file_name(&cfg.params, cfg.format));
      let out_path = std::path::Path::new(&path);

      if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
      }
      std::fs::write(out_path, document).with_context(|| format!("writing report to {}", path))?;
      info!(path = %path, "report written");
      println!("{}", path);
    }
    Delivery::Email => {
      let from = cfg.mail.from.as_deref().context("Please set FROM_MAIL and TO_MAIL env vars")?;
      let message = compose_message(from, &cfg.mail.to, &subject(&cfg.params), document, cfg.format);
      send_mail(&cfg.mail.sendmail, &message)?;
      info!(recipients = cfg.mail.to.len(), "report mailed");
    }
  }

  Ok(())
}
