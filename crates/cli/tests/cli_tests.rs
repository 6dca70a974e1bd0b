// End-to-end tests for the docrecon binary.
// Run with: cargo test -p docrecon-cli --test cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const SALESFORCE: &str = "\
Document Title,Opportunity Name,Fund
Project Eagle CIM (HIG) 2024.pdf,HIG Acquisition of Eagle Corp (Project Eagle),Fund IV
QoE Databook.xlsx,HIG Acquisition of Resurgence Corp (Project Resurgence),Fund V
Board Minutes.docx,,
Project Orange Teaser.pdf,Project Orange,Fund III
,Project Eagle,Fund IV
";

const SHAREPOINT: &str = "\u{feff}Name,FileLeafRef,Modified
Eagle_CIM_Final.docx,Eagle_CIM_Final.docx,2024-03-01
Project Resurgence QoE Databook v3.xlsx,Project Resurgence QoE Databook v3.xlsx,2024-04-15
board minutes.docx,board minutes.docx,2024-05-02
Project Quartz Teaser.pdf,Project Quartz Teaser.pdf,2024-02-11
";

fn docrecon() -> Command {
    Command::new(env!("CARGO_BIN_EXE_docrecon"))
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("sf.csv"), SALESFORCE).unwrap();
        std::fs::write(dir.path().join("sp.csv"), SHAREPOINT).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn out(&self) -> PathBuf {
        self.path("out")
    }

    fn run(&self, extra: &[&str]) -> Output {
        docrecon()
            .arg("run")
            .arg("--left")
            .arg(self.path("sf.csv"))
            .arg("--right")
            .arg(self.path("sp.csv"))
            .arg("-o")
            .arg(self.out())
            .args(extra)
            .output()
            .unwrap()
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn data_lines(path: &Path) -> Vec<String> {
    read(path).lines().skip(1).map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_writes_all_tables() {
    let ws = Workspace::new();
    let output = ws.run(&[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty(), "stdout is reserved for --json");

    let out = ws.out();
    for name in [
        "only_in_sharepoint.csv",
        "only_in_salesforce.csv",
        "in_both_salesforce.csv",
        "in_both_sharepoint.csv",
        "fuzzy_matches.csv",
        "comparison_summary.txt",
    ] {
        assert!(out.join(name).is_file(), "missing {name}");
    }

    assert_eq!(data_lines(&out.join("in_both_salesforce.csv")), vec!["Board Minutes.docx,,"]);
    assert_eq!(
        data_lines(&out.join("only_in_salesforce.csv")),
        vec!["Project Orange Teaser.pdf,Project Orange,Fund III"]
    );
    assert_eq!(
        data_lines(&out.join("only_in_sharepoint.csv")),
        vec!["Project Quartz Teaser.pdf,Project Quartz Teaser.pdf,2024-02-11"]
    );

    let fuzzy = read(&out.join("fuzzy_matches.csv"));
    let mut lines = fuzzy.lines();
    assert_eq!(lines.next(), Some("left_name,right_name,score,method,Opportunity Name,Fund"));
    assert_eq!(
        lines.next(),
        Some("Project Eagle CIM (HIG) 2024.pdf,Eagle_CIM_Final.docx,100,codename,HIG Acquisition of Eagle Corp (Project Eagle),Fund IV")
    );
    assert_eq!(
        lines.next(),
        Some("QoE Databook.xlsx,Project Resurgence QoE Databook v3.xlsx,100,auxiliary_xref,HIG Acquisition of Resurgence Corp (Project Resurgence),Fund V")
    );
    assert_eq!(lines.next(), None);

    let summary = read(&out.join("comparison_summary.txt"));
    assert!(summary.contains("In both (exact):"));
    assert!(summary.contains("auxiliary_xref:"));
    assert!(summary.contains("Skipped rows in salesforce:"));

    // Summary is echoed on stderr
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Document reconciliation"));
}

#[test]
fn run_json_to_stdout() {
    let ws = Workspace::new();
    let output = ws.run(&["--json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["both_exact"], 1);
    assert_eq!(json["summary"]["fuzzy_matched"], 2);
    assert_eq!(json["summary"]["dropped_left"], 1);
    assert_eq!(json["summary"]["duplicates_left"], 0);
    assert_eq!(json["partition"]["fuzzy_matched"][0]["method"], "codename");
    assert_eq!(json["partition"]["fuzzy_matched"][1]["method"], "auxiliary_xref");
    assert_eq!(json["meta"]["threshold"], 70);
}

#[test]
fn run_json_to_file() {
    let ws = Workspace::new();
    let json_path = ws.path("result.json");
    let output = ws.run(&["--output", json_path.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let json: serde_json::Value = serde_json::from_str(&read(&json_path)).unwrap();
    assert_eq!(json["partition"]["only_left"][0], "project orange teaser.pdf");
}

#[test]
fn no_fuzzy_leaves_empty_fuzzy_table() {
    let ws = Workspace::new();
    let output = ws.run(&["--no-fuzzy"]);
    assert!(output.status.success());
    assert_eq!(read(&ws.out().join("fuzzy_matches.csv")), "");
    assert_eq!(data_lines(&ws.out().join("only_in_salesforce.csv")).len(), 3);
}

#[test]
fn fail_on_unmatched_exit_code() {
    let ws = Workspace::new();
    let output = ws.run(&["--fail-on-unmatched"]);
    assert_eq!(output.status.code(), Some(6));
    // Tables are still written
    assert!(ws.out().join("comparison_summary.txt").is_file());
}

#[test]
fn config_file_sets_labels() {
    let ws = Workspace::new();
    let config = ws.path("recon.toml");
    std::fs::write(
        &config,
        r#"
name = "Deal room vs drive"

[left]
label = "Deal Room"
name_columns = ["Document Title"]
carry_columns = ["Fund"]

[right]
label = "drive"
name_columns = ["FileLeafRef"]
"#,
    )
    .unwrap();

    let output = ws.run(&["--config", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(ws.out().join("only_in_deal_room.csv").is_file());
    assert!(ws.out().join("in_both_drive.csv").is_file());
    assert_eq!(
        read(&ws.out().join("fuzzy_matches.csv")).lines().next(),
        Some("left_name,right_name,score,method,Fund")
    );
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn missing_input_exit_code() {
    let ws = Workspace::new();
    let output = docrecon()
        .args(["run", "--left", "does-not-exist.csv", "--right"])
        .arg(ws.path("sp.csv"))
        .arg("-o")
        .arg(ws.out())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does-not-exist.csv"));
    assert!(!ws.out().exists());
}

#[test]
fn missing_name_column_exit_code() {
    let ws = Workspace::new();
    let output = ws.run(&["--left-column", "Title"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn threshold_flag_out_of_range() {
    let ws = Workspace::new();
    let output = ws.run(&["--threshold", "101"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_config_exit_code() {
    let ws = Workspace::new();
    let config = ws.path("bad.toml");
    std::fs::write(&config, "threshold = 150\n").unwrap();
    let output = ws.run(&["--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn unwritable_output_exit_code() {
    let ws = Workspace::new();
    // A file where the output directory should be
    let blocker = ws.path("blocker");
    std::fs::write(&blocker, "").unwrap();
    let output = docrecon()
        .arg("run")
        .arg("--left")
        .arg(ws.path("sf.csv"))
        .arg("--right")
        .arg(ws.path("sp.csv"))
        .arg("-o")
        .arg(blocker.join("out"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
}

// ---------------------------------------------------------------------------
// validate + score
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_and_rejects() {
    let ws = Workspace::new();
    let good = ws.path("good.toml");
    std::fs::write(&good, "threshold = 80\n").unwrap();
    let output = docrecon().arg("validate").arg(&good).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("valid:"));

    let bad = ws.path("bad.toml");
    std::fs::write(&bad, "[left]\nlabel = \"x\"\nname_columns = []\n").unwrap();
    let output = docrecon().arg("validate").arg(&bad).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn score_json() {
    let output = docrecon()
        .args(["score", "Project Atlas Lender Model.xlsx", "Atlas Lender Model Backup.xlsx", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["score"], 80);
    assert_eq!(json["left_fuzzy"], "atlas lender model");
    assert_eq!(json["left_codename"], "atlas");
    assert_eq!(json["right_codename"], serde_json::Value::Null);
}
