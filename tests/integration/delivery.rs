#[test]
fn file_delivery_writes_report_to_out_path() {
  let td = test_support::tempdir();
  let target = td.path().join("reports").join("ams-bcn.html");
  let offers = test_support::read_fixture_text("two_offers.json");

  let mut cmd = test_support::cmd_bin("fare-report");
  let out = cmd
    .env("FARE_REPORT_TEST_OFFERS_JSON", offers)
    .args(["AMS", "BCN", "7", "0800-2200", "200", "--months", "1", "--delay-secs", "0", "--deliver", "file", "--out"])
    .arg(&target)
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), target.to_string_lossy());

  let html = std::fs::read_to_string(&target).unwrap();
  assert!(html.contains("<td>2024-03-01T08:00 (Fri)</td>"));
  assert!(!html.contains("<td>300</td>"));
}

#[test]
fn local_mode_defaults_to_origin_destination_file_and_caches() {
  let td = test_support::tempdir();
  let offers = test_support::read_fixture_text("two_offers.json");

  let mut cmd = test_support::cmd_bin("fare-report");
  let out = cmd
    .current_dir(td.path())
    .env("FARE_REPORT_TEST_OFFERS_JSON", offers)
    .env("FARE_REPORT_LOCAL", "1")
    .args(["ams", "bcn", "7", "--months", "2", "--delay-secs", "0"])
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let report = td.path().join("AMS-BCN.html");
  assert!(report.exists());

  let cached = std::fs::read_dir(td.path().join(".fare-report-cache")).unwrap().count();
  assert_eq!(cached, 2);
}

#[cfg(unix)]
#[test]
fn email_delivery_pipes_message_to_sendmail() {
  use std::os::unix::fs::PermissionsExt;

  let td = test_support::tempdir();
  let captured = td.path().join("mail.txt");
  let script = td.path().join("fake-sendmail");
  std::fs::write(&script, format!("#!/bin/sh\ncat > '{}'\n", captured.display())).unwrap();
  std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
  let offers = test_support::read_fixture_text("two_offers.json");

  let mut cmd = test_support::cmd_bin("fare-report");
  let out = cmd
    .env("FARE_REPORT_TEST_OFFERS_JSON", offers)
    .env("FROM_MAIL", "fares@example.com")
    .env("TO_MAIL", "me@example.com you@example.com")
    .args(["AMS", "BCN", "7", "--months", "1", "--delay-secs", "0", "--sendmail"])
    .arg(&script)
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let mail = std::fs::read_to_string(&captured).unwrap();
  assert!(mail.contains("Subject: Flights AMS - BCN (7 days stay)\n"));
  assert!(mail.contains("To: me@example.com, you@example.com\n"));
  assert!(mail.contains("Content-Type: text/html; charset=utf-8"));
  assert!(mail.contains("<h1>Results (max price 250)</h1>"));
}
