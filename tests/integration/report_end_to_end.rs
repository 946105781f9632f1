fn offers_dir() -> String {
  test_support::fixtures_dir().join("offers").to_string_lossy().to_string()
}

fn run_report(extra: &[&str]) -> String {
  let mut cmd = test_support::cmd_bin("fare-report");
  cmd.env("FARE_REPORT_TEST_OFFERS_DIR", offers_dir()).args([
    "ams",
    "bcn",
    "7",
    "0800-2200",
    "200",
    "--months",
    "2",
    "--now-override",
    "2024-03-01",
    "--delay-secs",
    "0",
    "--deliver",
    "print",
  ]);
  cmd.args(extra);

  let out = cmd.output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  String::from_utf8(out.stdout).unwrap()
}

fn data_rows(section: &str) -> Vec<&str> {
  section.lines().filter(|l| l.starts_with("<tr><td>")).collect()
}

#[test]
fn html_report_dedups_across_months_and_filters_price() {
  let html = run_report(&[]);

  assert!(html.starts_with("<h1>Results (max price 200)</h1>\n"));

  let (by_price, by_leave) = html
    .split_once("<h2>* Sorted by leave (max price 200)</h2>")
    .expect("leave section present");
  assert!(by_price.contains("<h2>* Sorted by price (max price 200)</h2>"));

  // X1/Y1 shows up in both months but is reported once per section.
  assert_eq!(html.matches("ob=X1&amp;ib=Y1").count(), 2);
  // X2/Y2 costs 300.
  assert!(!html.contains("ob=X2"));

  let price_rows = data_rows(by_price);
  assert_eq!(price_rows.len(), 3);
  assert!(price_rows[0].contains("<td>99.0</td>"));
  assert!(price_rows[1].contains("<td>120</td>"));
  assert!(price_rows[2].contains("<td>2024-03-01T08:00 (Fri)</td><td>2024-03-08T18:45 (Fri)</td><td>150</td>"));

  let leave_rows = data_rows(by_leave);
  assert_eq!(leave_rows.len(), 3);
  assert!(leave_rows[0].contains("2024-03-01T08:00 (Fri)"));
  assert!(leave_rows[1].contains("2024-03-20T06:45 (Wed)"));
  assert!(leave_rows[2].contains("2024-04-02T07:15 (Tue)"));
}

#[test]
fn price_limit_truncates_price_section_only() {
  let html = run_report(&["--price-limit", "1"]);
  let (by_price, by_leave) = html.split_once("<h2>* Sorted by leave").unwrap();
  let price_rows = data_rows(by_price);
  assert_eq!(price_rows.len(), 1);
  assert!(price_rows[0].contains("ob=X4&amp;ib=Y4"));
  assert_eq!(data_rows(by_leave).len(), 3);
}

#[test]
fn text_report_is_fixed_width() {
  let text = run_report(&["--format", "text", "--sort", "leave"]);
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines[0], "Results (max price 200)");
  assert_eq!(lines[3], "* Sorted by leave (max price 200)");
  assert!(lines[4].starts_with("Leave"));
  assert_eq!(lines.len(), 9);
  assert!(lines[6].starts_with("2024-03-01T08:00 (Fri)   2024-03-08T18:45 (Fri)"));
  assert!(lines[6].ends_with("https://www.transavia.com/en-EU/book-a-flight/?ob=X1&ib=Y1"));
}

#[test]
fn weekday_prefix_placement() {
  let html = run_report(&["--weekday", "prefix", "--sort", "price"]);
  assert!(html.contains("<td>(Fri) 2024-03-01T08:00</td>"));
}

#[test]
fn window_outside_fixtures_yields_empty_tables() {
  let mut cmd = test_support::cmd_bin("fare-report");
  let out = cmd
    .env("FARE_REPORT_TEST_OFFERS_DIR", offers_dir())
    .args(["AMS", "BCN", "7", "--now-override", "2030-01-15", "--months", "1", "--delay-secs", "0", "--deliver", "print"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let html = String::from_utf8(out.stdout).unwrap();
  assert!(html.contains("<h1>Results (max price 250)</h1>"));
  assert!(!html.contains("<tr><td>"));
}
