use std::collections::HashSet;
use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

pub fn new_run_id() -> String {
    format!(
        "{}_{}",
        Utc::now().format("%Y%m%d"),
        Uuid::new_v4().to_string()[..8].to_string()
    )
}

pub fn ensure_dirs(upload_folder: &PathBuf, output_folder: &PathBuf) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)?;
    std::fs::create_dir_all(output_folder)?;
    Ok(())
}

/// File name for a recipient's PDF. The first holder of a name keeps the
/// plain `<name>_certificate.pdf`; later holders get their spreadsheet row
/// appended so nothing silently overwrites. `..` is stripped as well so the
/// download route's traversal guard never rejects a generated file.
pub fn certificate_file_name(name: &str, row: u32, taken: &mut HashSet<String>) -> String {
    let stem = sanitize_filename::sanitize(name.trim()).replace("..", "");
    let stem = if stem.is_empty() {
        "recipient".to_string()
    } else {
        stem
    };

    let plain = format!("{}_certificate.pdf", stem);
    let file = if taken.contains(&plain) {
        format!("{}_{}_certificate.pdf", stem, row)
    } else {
        plain
    };
    taken.insert(file.clone());
    file
}
