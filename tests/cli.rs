use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

const PAGE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/page.json");

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("trade-trends"));
}

#[test]
fn round_is_half_away_from_zero() {
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["round", "3.455", "--places", "2"]);
    cmd.assert().success().stdout("3.46\t3.46\n");

    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["round", "-2.5"]);
    cmd.assert().success().stdout("-3\t-3\n");

    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["round", "1234567.891", "--places", "1"]);
    cmd.assert().success().stdout("1234567.9\t1,234,567.9\n");
}

#[test]
fn round_rejects_text() {
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["round", "abc"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a number"));
}

#[test]
fn validate_lists_charts() {
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["validate", "--page", PAGE]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("chartIdx1"))
        .stdout(predicate::str::contains("chartIdx2"))
        .stdout(predicate::str::contains("20 categories"));
}

#[test]
fn validate_reports_bad_page() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("bad.json");
    std::fs::write(
        &page,
        r#"{"charts":[{"idx":"1","source":"S","data":[{"name":"W","data":[]}]}]}"#,
    )
    .unwrap();
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["validate", "--page"]).arg(&page);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("title"));
}

#[test]
fn export_csv_writes_file() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("chart1.csv");
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["export-csv", "--page", PAGE, "--idx", "1", "--out"])
        .arg(&out);
    cmd.assert().success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Category,World (goods),Developing economies (goods)\n"));
    assert_eq!(text.lines().count(), 21);
}

#[test]
fn render_writes_one_svg_per_chart() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["render", "--page", PAGE, "--out-dir"])
        .arg(dir.path())
        .args(["--viewport", "500"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Rendered 2 of 2 charts"));
    for id in ["chartIdx1", "chartIdx2"] {
        let meta = std::fs::metadata(dir.path().join(format!("{id}.svg"))).unwrap();
        assert!(meta.len() > 0);
    }
}

#[test]
fn eager_render_skips_scrolling() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["render", "--page", PAGE, "--eager", "--out-dir"])
        .arg(dir.path());
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Rendered 2 of 2 charts"));
    assert!(dir.path().join("chartIdx2.svg").exists());
}

#[test]
fn tooltip_shows_every_series() {
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["tooltip", "--page", PAGE, "--idx", "1", "--category", "0"]);
    cmd.assert()
        .success()
        .stdout("Q1 2018\nWorld: 1%\nDeveloping economies: 2%\n");

    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["tooltip", "--page", PAGE, "--idx", "1", "--category", "0", "--html"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"<div class="tooltip_container"><h3 class="tooltip_header">Q1 2018</h3>"#,
        ));

    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["tooltip", "--page", PAGE, "--idx", "1", "--category", "20"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn labels_cover_first_and_last_point() {
    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["labels", "--page", PAGE, "--idx", "2"]);
    cmd.assert()
        .success()
        .stdout("World (goods)\tQ1 2018\t4%\nWorld (goods)\tQ4 2022\t2%\n");

    let mut cmd = Command::cargo_bin("trade-trends").unwrap();
    cmd.args(["labels", "--page", PAGE, "--idx", "2", "--html"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"<span style="color: #009edb">4%</span>"#,
        ));
}
