#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const EXPORT: &str = "\
Keyword,Intent,Volume,Trend,Keyword Difficulty,CPC (USD),Competitive Density,SERP Features,Number of Results
comprar tênis com desconto,Transactional,1000,\"0.8,1.0\",40,1.20,0.90,\"Shopping ads, Reviews\",120000
melhor tênis de corrida,Commercial,800,,35,0.80,0.50,Featured reviews,90000
o que é pronação,Informational,500,,20,0.10,0.10,\"Featured snippets, People also ask\",40000
tênis em recife,Transactional,300,,10,0.50,0.40,Local pack,5000
tênis grátis,Transactional,200,,5,0.10,0.10,,1000
";

fn kwplan(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kwplan").unwrap();
    cmd.current_dir(dir.path()).env("KWPLAN_DIR", dir.path());
    cmd
}

fn with_export() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("semrush.csv"), EXPORT).unwrap();
    dir
}

fn read(path: std::path::PathBuf) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ---------------------------------------------------------------------------
// kwplan ctr
// ---------------------------------------------------------------------------

#[test]
fn ctr_single_position() {
    let dir = TempDir::new().unwrap();
    kwplan(&dir)
        .args(["ctr", "--volume", "1000", "--position", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Position 1 (25%-35%)"))
        .stdout(predicate::str::contains("250 - 350"));
}

#[test]
fn ctr_all_positions_json() {
    let dir = TempDir::new().unwrap();
    let out = kwplan(&dir)
        .args(["ctr", "--volume", "1000", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[9]["low"], 10);
    assert_eq!(rows[9]["high"], 20);
}

#[test]
fn ctr_rejects_out_of_range_position() {
    let dir = TempDir::new().unwrap();
    kwplan(&dir)
        .args(["ctr", "--volume", "1000", "--position", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid CTR position 11"));
}

#[test]
fn ctr_rejects_negative_volume() {
    let dir = TempDir::new().unwrap();
    kwplan(&dir)
        .args(["ctr", "--volume=-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid search volume"));
}

// ---------------------------------------------------------------------------
// kwplan classify
// ---------------------------------------------------------------------------

#[test]
fn classify_transactional_shopping() {
    let dir = TempDir::new().unwrap();
    kwplan(&dir)
        .args([
            "classify",
            "--intent",
            "Transactional",
            "--serp",
            "Shopping ads, Reviews",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decision"))
        .stdout(predicate::str::contains(
            "Conversion-Optimized Product/Service Page",
        ))
        .stdout(predicate::str::contains("E-commerce Sales"));
}

#[test]
fn classify_portuguese_labels_json() {
    let dir = TempDir::new().unwrap();
    let out = kwplan(&dir)
        .args([
            "classify",
            "--intent",
            "navegacional",
            "--serp",
            "Sitelinks",
            "--locale",
            "pt-br",
            "-j",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["journey_stage"], "Fidelização");
    assert_eq!(v["objective"], "Branding/Autoridade");
}

#[test]
fn classify_unknown_intent_needs_manual_review() {
    let dir = TempDir::new().unwrap();
    kwplan(&dir)
        .args(["classify", "--intent", "Informational, Commercial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Undefined"))
        .stdout(predicate::str::contains("Manual Review"));
}

// ---------------------------------------------------------------------------
// kwplan run
// ---------------------------------------------------------------------------

#[test]
fn run_without_exports_fails() {
    let dir = TempDir::new().unwrap();
    kwplan(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no .csv keyword exports"));
}

#[test]
fn run_writes_every_report_file() {
    let dir = with_export();
    let out = dir.path().join("out");
    kwplan(&dir)
        .args(["run", "--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Read 5 keywords from 1 file(s). Kept 3"));

    for file in [
        "keyword-overview.csv",
        "intents/Transactional.csv",
        "intents/No Intent.csv",
        "serp-features/Reviews.csv",
        "journey/overview.csv",
        "journey/Decision.csv",
        "ctr-by-position.csv",
        "filters/geo-excluded.csv",
        "filters/negative-kept.csv",
        "filters/negative-excluded.csv",
        "summary.json",
        "summary.xml",
        "report.md",
    ] {
        assert!(out.join(file).exists(), "missing {file}");
    }
    assert!(!out.join("growth-plan.csv").exists());

    let geo = read(out.join("filters/geo-excluded.csv"));
    assert!(geo.contains("tênis em recife,300,Transactional,place: recife"));
    let overview = read(out.join("keyword-overview.csv"));
    assert!(overview.lines().next().unwrap().ends_with("Volume Heat"));
}

#[test]
fn run_json_prints_summary() {
    let dir = with_export();
    let out = dir.path().join("out");
    let result = kwplan(&dir)
        .args(["run", "--output", out.to_str().unwrap(), "--objective", "2", "-j"])
        .output()
        .unwrap();
    assert!(result.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(summary["objective"], "E-commerce Sales");
    assert_eq!(summary["filters"]["input_keywords"], 5);
    assert_eq!(summary["filters"]["geo_excluded"], 1);
    assert_eq!(summary["filters"]["negative_excluded"], 1);
    assert_eq!(summary["aligned_with_objective"], 1);
}

#[test]
fn run_with_growth_flags_writes_plan() {
    let dir = with_export();
    let out = dir.path().join("out");
    kwplan(&dir)
        .args([
            "run",
            "--output",
            out.to_str().unwrap(),
            "--current-volume",
            "1000",
            "--growth-percent",
            "10",
            "--months",
            "3",
            "--keywords-per-month",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Growth plan: 3 keywords over 3 months"));

    let plan = read(out.join("growth-plan.csv"));
    let rows: Vec<&str> = plan.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[1].starts_with("1,Insufficient data for grouping,comprar tênis com desconto,1000"));
    assert!(read(out.join("report.md")).contains("| 3 | 1210 |"));
}

#[test]
fn run_growth_without_volume_column_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("k.csv"), "Keyword,Intent\nseo,Informational\n").unwrap();
    kwplan(&dir)
        .args([
            "run",
            "--current-volume",
            "1000",
            "--growth-percent",
            "10",
            "--months",
            "3",
            "--keywords-per-month",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no volume column"));
}

#[test]
fn run_rejects_zero_months() {
    let dir = with_export();
    kwplan(&dir)
        .args([
            "run",
            "--current-volume",
            "1000",
            "--growth-percent",
            "10",
            "--months",
            "0",
            "--keywords-per-month",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("months must be at least 1"));
}

#[test]
fn run_defaults_to_timestamped_output_dir() {
    let dir = with_export();
    kwplan(&dir).arg("run").assert().success();
    let found = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| {
            e.file_name().to_string_lossy().starts_with("analysis-")
                && e.path().join("summary.json").exists()
        });
    assert!(found);
}

#[test]
fn run_with_missing_configured_gazetteer_fails() {
    let dir = with_export();
    std::fs::write(
        dir.path().join("kwplan.yaml"),
        "geo_filter:\n  gazetteer: cities.txt\n",
    )
    .unwrap();
    kwplan(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("gazetteer source not readable"));
}

#[test]
fn run_pt_br_journey_sheets() {
    let dir = with_export();
    let out = dir.path().join("out");
    kwplan(&dir)
        .args(["run", "--output", out.to_str().unwrap(), "--locale", "pt-br"])
        .assert()
        .success();
    assert!(out.join("journey/Decisão.csv").exists());
    assert!(out.join("journey/Sem Jornada Definida.csv").exists());
}

// ---------------------------------------------------------------------------
// kwplan config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_defaults() {
    let dir = TempDir::new().unwrap();
    kwplan(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("kwplan.yaml"),
        "geo_filter:\n  mode: loose\ngrowth:\n  current_volume: -1\n  growth_percent: 10\n  months: 6\n  keywords_per_month: 10\n",
    )
    .unwrap();
    kwplan(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[warning] geo_filter.mode is loose"))
        .stdout(predicate::str::contains("[error] growth.current_volume"));
}

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    kwplan(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("kwplan.yaml").exists());
    kwplan(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let out = kwplan(&dir).args(["config", "show", "-j"]).output().unwrap();
    assert!(out.status.success());
    let cfg: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(cfg["locale"], "en");
    assert_eq!(cfg["geo_filter"]["mode"], "strict");
    assert_eq!(cfg["clustering"]["seed"], 42);
}
