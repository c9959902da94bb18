//! Output formatting

use colored::Colorize;
use rotolog_writer::CleanupReport;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable JSON output mode
pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

/// Check if JSON output mode is enabled
pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}

/// One managed file
#[derive(Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<String>,
}

impl FileInfo {
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified().ok().map(|time| {
            chrono::DateTime::<chrono::Local>::from(time)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        });
        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified,
        })
    }
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "file")]
    name: String,
    #[tabled(rename = "size")]
    size: String,
    #[tabled(rename = "modified")]
    modified: String,
}

pub fn print_files_table(files: &[FileInfo]) {
    if is_json_mode() {
        print_json(&files);
        return;
    }

    if files.is_empty() {
        println!("No log files");
        return;
    }

    let rows: Vec<FileRow> = files
        .iter()
        .enumerate()
        .map(|(i, f)| FileRow {
            index: i + 1,
            name: f
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| f.path.display().to_string()),
            size: format_bytes(f.size_bytes),
            modified: f.modified.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        .to_string();

    println!("{}", table);
}

#[derive(Serialize)]
struct CleanupJson {
    removed: Vec<PathBuf>,
    renamed: Vec<(PathBuf, PathBuf)>,
    skipped: Vec<SkippedJson>,
}

#[derive(Serialize)]
struct SkippedJson {
    path: PathBuf,
    error: String,
}

pub fn print_cleanup_report(report: &CleanupReport) {
    if is_json_mode() {
        print_json(&CleanupJson {
            removed: report.removed.clone(),
            renamed: report.renamed.clone(),
            skipped: report
                .skipped
                .iter()
                .map(|s| SkippedJson {
                    path: s.path.clone(),
                    error: s.error.to_string(),
                })
                .collect(),
        });
        return;
    }

    if report.is_empty() {
        print_info("Nothing to clean up");
        return;
    }
    for path in &report.removed {
        print_success(&format!("Removed {}", path.display()));
    }
    for (from, to) in &report.renamed {
        print_success(&format!("Renamed {} -> {}", from.display(), to.display()));
    }
    for skip in &report.skipped {
        print_warning(&format!("Skipped {}: {}", skip.path.display(), skip.error));
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}G", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0}K", bytes as f64 / 1024.0)
    } else if bytes > 0 {
        format!("{}B", bytes)
    } else {
        "0B".to_string()
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "!".yellow(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print logs in JSON format if enabled
pub fn print_logs(lines: &[String]) {
    if is_json_mode() {
        print_json(&lines);
        return;
    }

    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2K");
        assert_eq!(format_bytes(5 * 1_048_576), "5.0M");
    }

    #[test]
    fn test_file_info_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("half-1.log");
        std::fs::write(&path, b"hello").unwrap();

        let info = FileInfo::from_path(&path).unwrap();
        assert_eq!(info.size_bytes, 5);
        assert!(info.modified.is_some());
        assert!(FileInfo::from_path(&dir.path().join("missing.log")).is_err());
    }
}
