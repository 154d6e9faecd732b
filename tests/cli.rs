//! Runs the compiled `puzzle-gen` binary in a temp working directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const TABLE: &str = "dateKey (YYYY-MM-DD),category,tags (semicolon-separated),answerCanonical,\
answerAliases (comma-separated),solutionExplanation,version
2024-01-01,History,space,Apollo 11,\"Apollo XI, AS-506\",First crewed lunar landing.,1
";

fn puzzle_gen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_puzzle-gen"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Working dir with the stock file names: `content_generation.csv`,
/// `manifest.json`.
fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("content_generation.csv"), TABLE).unwrap();
    fs::write(tmp.path().join("manifest.json"), "{}").unwrap();
    tmp
}

#[test]
fn no_subcommand_runs_generate_with_stock_paths() {
    let tmp = workspace();
    let out = puzzle_gen(tmp.path(), &[]);

    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("[OK] Processed 1 puzzle\n"), "{text}");
    assert!(text.contains("Created 2024-01-01.v1.json"));
    assert!(tmp.path().join("puzzles/2024-01-01.v1.json").exists());

    let table = fs::read_to_string(tmp.path().join("content_generation.csv")).unwrap();
    assert!(table.lines().next().unwrap().ends_with(",version,contentHash"));
}

#[test]
fn dry_run_flag_writes_nothing() {
    let tmp = workspace();
    let out = puzzle_gen(tmp.path(), &["generate", "--dry-run"]);

    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("[DRY RUN] Processed 1 puzzle\n"), "{text}");
    assert!(text.contains("Would create 2024-01-01.v1.json"));
    assert!(!tmp.path().join("puzzles").exists());
    assert_eq!(
        fs::read_to_string(tmp.path().join("content_generation.csv")).unwrap(),
        TABLE
    );
}

#[test]
fn path_flags_override_defaults() {
    let tmp = workspace();
    fs::rename(
        tmp.path().join("content_generation.csv"),
        tmp.path().join("sheet.csv"),
    )
    .unwrap();

    let out = puzzle_gen(
        tmp.path(),
        &["--csv", "sheet.csv", "--puzzles", "public/puzzles"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(tmp.path().join("public/puzzles/2024-01-01.v1.json").exists());
}

#[test]
fn config_file_in_working_dir_is_used() {
    let tmp = workspace();
    fs::write(
        tmp.path().join("puzzle-gen.toml"),
        "[paths]\npuzzles_dir = \"out\"\n",
    )
    .unwrap();

    let out = puzzle_gen(tmp.path(), &["generate"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(tmp.path().join("out/2024-01-01.v1.json").exists());
}

#[test]
fn missing_manifest_exits_non_zero() {
    let tmp = workspace();
    fs::remove_file(tmp.path().join("manifest.json")).unwrap();

    let out = puzzle_gen(tmp.path(), &["generate"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Manifest not found"));
}

#[test]
fn missing_explicit_config_exits_non_zero() {
    let tmp = workspace();
    let out = puzzle_gen(tmp.path(), &["--config", "nope.toml"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Config file not found"));
}

#[test]
fn check_reports_without_writing() {
    let tmp = workspace();
    fs::remove_file(tmp.path().join("manifest.json")).unwrap();

    let out = puzzle_gen(tmp.path(), &["check"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("[OK] content_generation.csv: 1 puzzle ready"), "{text}");
    assert!(text.contains("1 missing contentHash"));
    assert!(text.contains("contentHash column would be added"));
    assert_eq!(
        fs::read_to_string(tmp.path().join("content_generation.csv")).unwrap(),
        TABLE
    );
}

#[test]
fn gen_config_prints_stock_toml() {
    let tmp = TempDir::new().unwrap();
    let out = puzzle_gen(tmp.path(), &["gen-config"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("[paths]"));
    assert!(text.contains("[columns]"));
    let parsed: toml::Value = toml::from_str(&text).unwrap();
    assert_eq!(parsed["paths"]["puzzles_dir"].as_str(), Some("puzzles"));
}
