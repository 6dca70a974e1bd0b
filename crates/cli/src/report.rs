//! Output tables and the text summary for `docrecon run`.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use docrecon_engine::config::ReconConfig;
use docrecon_engine::model::{MatchMethod, ReconInput, ReconResult, SideInput};
use docrecon_engine::side::KeyedSide;

use crate::exit_codes::EXIT_OUTPUT;
use crate::CliError;

fn output_err(path: &Path, e: impl std::fmt::Display) -> CliError {
    CliError {
        code: EXIT_OUTPUT,
        message: format!("cannot write {}: {e}", path.display()),
        hint: None,
    }
}

/// Label as it appears in a file name: lowercase, other characters folded to `_`.
pub fn file_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

// ============================================================================
// Tables
// ============================================================================

/// First record of each key, in the side's header order. With `fill_name`
/// the name column holds the display name, which may have come from a
/// fallback column; otherwise the row is written as exported.
/// No keys renders as an empty file.
pub fn render_records_csv(
    keys: &[String],
    side: &KeyedSide,
    input: &SideInput,
    fill_name: bool,
) -> Result<Vec<u8>, csv::Error> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&input.headers)?;

    for name in keys.iter().filter_map(|k| side.get(k)) {
        let row: Vec<&str> = input
            .headers
            .iter()
            .map(|h| {
                if fill_name && *h == input.name_column {
                    name.display.as_str()
                } else {
                    name.record.field(h).unwrap_or("")
                }
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

/// Carried columns in config order, left side first, without repeats.
pub fn carried_columns(config: &ReconConfig) -> Vec<String> {
    let mut seen = BTreeSet::new();
    config
        .left
        .carry_columns
        .iter()
        .chain(&config.right.carry_columns)
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect()
}

/// `left_name,right_name,score,method` plus carried columns, in commit order.
pub fn render_fuzzy_csv(result: &ReconResult, carried: &[String]) -> Result<Vec<u8>, csv::Error> {
    if result.partition.fuzzy_matched.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    let mut header = vec!["left_name", "right_name", "score", "method"];
    header.extend(carried.iter().map(String::as_str));
    writer.write_record(&header)?;

    for m in &result.partition.fuzzy_matched {
        let score = m.score.to_string();
        let mut row = vec![m.left_name.as_str(), m.right_name.as_str(), score.as_str(), m.method.as_str()];
        row.extend(carried.iter().map(|c| m.aux_fields.get(c).map(String::as_str).unwrap_or("")));
        writer.write_record(&row)?;
    }

    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

// ============================================================================
// Summary
// ============================================================================

pub struct SummaryContext<'a> {
    pub left_path: &'a Path,
    pub right_path: &'a Path,
    pub files: &'a [PathBuf],
}

pub fn render_summary(result: &ReconResult, ctx: &SummaryContext<'_>) -> String {
    let meta = &result.meta;
    let s = &result.summary;
    let (left, right) = (&meta.left_label, &meta.right_label);
    let width = 24 + left.len().max(right.len());

    let mut out = String::new();
    let _ = writeln!(out, "Document reconciliation: {}", meta.config_name);
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Inputs");
    let _ = writeln!(out, "  {left}: {}", ctx.left_path.display());
    let _ = writeln!(out, "  {right}: {}", ctx.right_path.display());
    let _ = writeln!(out);

    let _ = writeln!(out, "Settings");
    let _ = writeln!(out, "  threshold: {} (auxiliary {})", meta.threshold, meta.auxiliary_threshold);
    let _ = writeln!(out, "  fuzzy: {}", if meta.fuzzy { "on" } else { "off" });
    let _ = writeln!(out, "  case sensitive: {}", if meta.case_sensitive { "yes" } else { "no" });
    let _ = writeln!(out);

    let mut line = |label: String, value: usize| {
        let _ = writeln!(out, "  {label:<width$}{value}");
    };
    line(format!("Total in {left}:"), s.total_left);
    line(format!("Total in {right}:"), s.total_right);
    line("In both (exact):".into(), s.both_exact);
    line("Fuzzy matched:".into(), s.fuzzy_matched);
    for method in [MatchMethod::Codename, MatchMethod::TokenFuzzy, MatchMethod::AuxiliaryXref] {
        let count = s.method_counts.get(method.as_str()).copied().unwrap_or(0);
        line(format!("  {method}:"), count);
    }
    line(format!("Only in {right}:"), s.only_right);
    line(format!("Only in {left}:"), s.only_left);
    if s.dropped_left + s.dropped_right > 0 {
        line(format!("Skipped rows in {left}:"), s.dropped_left);
        line(format!("Skipped rows in {right}:"), s.dropped_right);
    }
    if s.duplicates_left + s.duplicates_right > 0 {
        line(format!("Duplicate rows in {left}:"), s.duplicates_left);
        line(format!("Duplicate rows in {right}:"), s.duplicates_right);
    }

    if !ctx.files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Output files");
        for f in ctx.files {
            let _ = writeln!(out, "  {}", f.display());
        }
    }

    out
}

// ============================================================================
// Writing
// ============================================================================

/// Write the five tables and the summary into `dir`. Returns the summary text.
pub fn write_outputs(
    dir: &Path,
    config: &ReconConfig,
    input: &ReconInput,
    result: &ReconResult,
    left_path: &Path,
    right_path: &Path,
) -> Result<String, CliError> {
    std::fs::create_dir_all(dir).map_err(|e| output_err(dir, e))?;

    let left = file_label(&result.meta.left_label);
    let right = file_label(&result.meta.right_label);
    let p = &result.partition;

    let tables: Vec<(PathBuf, Vec<u8>)> = vec![
        (
            dir.join(format!("only_in_{right}.csv")),
            render_records_csv(&p.only_right, &result.right, &input.right, true),
        ),
        (
            dir.join(format!("only_in_{left}.csv")),
            render_records_csv(&p.only_left, &result.left, &input.left, true),
        ),
        (
            dir.join(format!("in_both_{left}.csv")),
            render_records_csv(&p.both_exact, &result.left, &input.left, false),
        ),
        (
            dir.join(format!("in_both_{right}.csv")),
            render_records_csv(&p.both_exact, &result.right, &input.right, false),
        ),
        (
            dir.join("fuzzy_matches.csv"),
            render_fuzzy_csv(result, &carried_columns(config)),
        ),
    ]
    .into_iter()
    .map(|(path, bytes)| bytes.map(|b| (path.clone(), b)).map_err(|e| output_err(&path, e)))
    .collect::<Result<_, _>>()?;

    let summary_path = dir.join("comparison_summary.txt");
    let mut files: Vec<PathBuf> = tables.iter().map(|(path, _)| path.clone()).collect();
    files.push(summary_path.clone());

    for (path, bytes) in &tables {
        std::fs::write(path, bytes).map_err(|e| output_err(path, e))?;
        log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    }

    let summary = render_summary(
        result,
        &SummaryContext {
            left_path,
            right_path,
            files: &files,
        },
    );
    std::fs::write(&summary_path, &summary).map_err(|e| output_err(&summary_path, e))?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrecon_engine::load::load_csv_records;
    use docrecon_engine::Side;

    const LEFT: &str = "\
Document Title,Opportunity Name,Fund
Project Eagle CIM (HIG) 2024.pdf,Project Eagle,Fund IV
Board Minutes.docx,,
Orphan Memo.pdf,,Fund V
BOARD MINUTES.docx,,Fund V
";
    const RIGHT: &str = "\
Name,FileLeafRef,Modified
Eagle_CIM_Final.docx,,2024-03-01
,board minutes.docx,2024-05-02
";

    fn fixture() -> (ReconConfig, ReconInput, ReconResult) {
        let config = ReconConfig::default();
        let input = ReconInput {
            left: load_csv_records(Side::Left, LEFT, &config.left).unwrap(),
            right: load_csv_records(Side::Right, RIGHT, &config.right).unwrap(),
        };
        let result = docrecon_engine::run(&config, &input).unwrap();
        (config, input, result)
    }

    #[test]
    fn label_is_file_safe() {
        assert_eq!(file_label("SharePoint Export"), "sharepoint_export");
        assert_eq!(file_label("deal-room/2024"), "deal-room_2024");
    }

    #[test]
    fn in_both_table_keeps_exported_row() {
        let (_, input, result) = fixture();
        let bytes = render_records_csv(&result.partition.both_exact, &result.right, &input.right, false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        // Name came from the FileLeafRef fallback and stays empty in the export
        assert_eq!(text, "Name,FileLeafRef,Modified\n,board minutes.docx,2024-05-02\n");
    }

    #[test]
    fn only_in_table_writes_display_name_into_name_column() {
        let (_, input, result) = fixture();
        let bytes = render_records_csv(&result.partition.both_exact, &result.right, &input.right, true).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Name,FileLeafRef,Modified\nboard minutes.docx,board minutes.docx,2024-05-02\n");
    }

    #[test]
    fn empty_table_is_empty_file() {
        let (_, input, result) = fixture();
        assert!(result.partition.only_right.is_empty());
        let bytes = render_records_csv(&result.partition.only_right, &result.right, &input.right, true).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn fuzzy_table_has_carried_columns() {
        let (config, _, result) = fixture();
        let carried = carried_columns(&config);
        assert_eq!(carried, vec!["Opportunity Name", "Fund"]);
        let text = String::from_utf8(render_fuzzy_csv(&result, &carried).unwrap()).unwrap();
        assert_eq!(
            text,
            "left_name,right_name,score,method,Opportunity Name,Fund\n\
             Project Eagle CIM (HIG) 2024.pdf,Eagle_CIM_Final.docx,100,codename,Project Eagle,Fund IV\n"
        );
    }

    #[test]
    fn summary_lists_counts_per_method() {
        let (_, _, result) = fixture();
        let files = vec![PathBuf::from("out/fuzzy_matches.csv")];
        let text = render_summary(
            &result,
            &SummaryContext {
                left_path: Path::new("sf.csv"),
                right_path: Path::new("sp.csv"),
                files: &files,
            },
        );
        assert!(text.contains("salesforce: sf.csv"));
        assert!(text.contains("threshold: 70 (auxiliary 60)"));
        let codename = text.lines().find(|l| l.trim_start().starts_with("codename:")).unwrap();
        assert!(codename.ends_with(" 1"));
        let only_left = text.lines().find(|l| l.contains("Only in salesforce:")).unwrap();
        assert!(only_left.ends_with(" 1"));
        assert!(text.contains("out/fuzzy_matches.csv"));
        assert!(!text.contains("Skipped rows"));
        let duplicates = text.lines().find(|l| l.contains("Duplicate rows in salesforce:")).unwrap();
        assert!(duplicates.ends_with(" 1"));
    }
}
