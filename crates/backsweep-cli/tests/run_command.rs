//! Exercises the `backsweep run` subcommand as a subprocess end to end.

use std::fs;
use std::io::Write;
use std::process::Command;

fn write_ticks(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("ticks.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "time,price,quantity,isbuyermaker").unwrap();
    for i in 0..60 {
        writeln!(file, "{},{},1.0,{}", i * 1000, 100 + (i % 5), i % 2).unwrap();
    }
    path
}

fn write_config(dir: &std::path::Path, ticks_path: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("experiment.toml");
    let body = format!(
        r#"
experiment_name = "cli-smoke-test"
strategy = "ofi_momentum"

[data]
path = "{}"

[optimization]
method = "monte_carlo"
samples = 4
seed = 7

[parameters.window]
type = "int"
distribution = "uniform"
min = 5.0
max = 20.0
"#,
        ticks_path.display()
    );
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn run_subcommand_produces_a_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let ticks_path = write_ticks(dir.path());
    let config_path = write_config(dir.path(), &ticks_path);

    let output = Command::new(env!("CARGO_BIN_EXE_backsweep"))
        .arg("run")
        .arg(&config_path)
        .current_dir(dir.path())
        .output()
        .expect("failed to spawn backsweep binary");

    assert!(
        output.status.success(),
        "backsweep exited non-zero: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report_path = dir
        .path()
        .join("reports")
        .join("cli-smoke-test")
        .join("results.json");
    let body = fs::read_to_string(&report_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["experiment_id"], "cli-smoke-test");
    assert_eq!(parsed["results"].as_array().unwrap().len(), 4);
}

#[test]
fn missing_config_file_exits_with_failure() {
    let output = Command::new(env!("CARGO_BIN_EXE_backsweep"))
        .arg("run")
        .arg("/nonexistent/experiment.toml")
        .output()
        .expect("failed to spawn backsweep binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
