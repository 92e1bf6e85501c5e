use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fonts::FontSet;
use crate::id::IssuedIds;
use crate::pdf;
use crate::render;
use crate::sheet::RecipientSheet;
use crate::storage;

pub const UPDATED_WORKBOOK_NAME: &str = "updated_recipients.xlsx";

/// Everything one run needs: the resolved fonts, where deliverables go, and
/// an ID for logs and the report file.
pub struct RunContext<'a> {
    pub run_id: String,
    pub fonts: &'a FontSet,
    pub output_dir: &'a Path,
}

#[derive(Debug, Serialize)]
pub struct IssuedCertificate {
    pub row: u32,
    pub name: String,
    pub certificate_id: String,
    pub pdf_file: String,
}

#[derive(Debug, Serialize)]
pub struct SkippedRow {
    pub row: u32,
    pub name: Option<String>,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub issued: Vec<IssuedCertificate>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub workbook: Vec<u8>,
    pub report: RunReport,
}

/// Runs the whole pipeline over one template + spreadsheet pair: per data
/// row, issue an ID, render, export a PDF into the output directory, and
/// annotate the workbook. Rows that fail are skipped and reported; the
/// annotated workbook and the report are persisted at the end.
pub fn run(ctx: &RunContext, template_bytes: &[u8], sheet_bytes: &[u8]) -> Result<RunOutcome> {
    // Decode once up front so a bad template aborts before any row work.
    render::decode_template(template_bytes)?;
    let mut sheet = RecipientSheet::from_bytes(sheet_bytes)?;

    fs::create_dir_all(ctx.output_dir)?;
    // Intermediate PNGs live here; dropping the guard sweeps them on every
    // exit path, including mid-run errors.
    let staging = tempfile::tempdir()?;

    let mut ledger = IssuedIds::default();
    let mut taken_files: HashSet<String> = HashSet::new();
    let mut issued = Vec::new();
    let mut skipped = Vec::new();

    for recipient in sheet.recipients() {
        let Some(name) = recipient.name.clone() else {
            let reason = Error::MissingName(recipient.row).to_string();
            tracing::warn!(row = recipient.row, "first column is blank, skipping row");
            skipped.push(SkippedRow {
                row: recipient.row,
                name: None,
                reason,
            });
            continue;
        };

        let certificate_id = ledger.fresh();
        let issued_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let pdf_file = storage::certificate_file_name(&name, recipient.row, &mut taken_files);

        match issue_one(
            ctx,
            staging.path(),
            template_bytes,
            &name,
            &certificate_id,
            &issued_at,
            &pdf_file,
        ) {
            Ok(()) => {
                sheet.annotate(recipient.row, &certificate_id);
                tracing::info!(
                    row = recipient.row,
                    name = %name,
                    id = %certificate_id,
                    file = %pdf_file,
                    "certificate issued"
                );
                issued.push(IssuedCertificate {
                    row: recipient.row,
                    name,
                    certificate_id,
                    pdf_file,
                });
            }
            Err(e) => {
                tracing::warn!(row = recipient.row, name = %name, error = %e, "row failed, skipping");
                skipped.push(SkippedRow {
                    row: recipient.row,
                    name: Some(name),
                    reason: e.to_string(),
                });
            }
        }
    }

    let workbook = sheet.to_bytes()?;
    fs::write(ctx.output_dir.join(UPDATED_WORKBOOK_NAME), &workbook)?;

    let report = RunReport {
        run_id: ctx.run_id.clone(),
        issued,
        skipped,
    };
    write_report(ctx, &report);

    Ok(RunOutcome { workbook, report })
}

fn issue_one(
    ctx: &RunContext,
    staging: &Path,
    template_bytes: &[u8],
    name: &str,
    certificate_id: &str,
    issued_at: &str,
    pdf_file: &str,
) -> Result<()> {
    let certificate =
        render::render_certificate(template_bytes, ctx.fonts, name, certificate_id, issued_at)?;

    let staged_png = staging.join(format!("{}.png", pdf_file.trim_end_matches(".pdf")));
    certificate
        .save(&staged_png)
        .map_err(|e| Error::ImageWrite(e.to_string()))?;

    let pdf_bytes = pdf::image_to_pdf(&certificate, name)?;
    fs::write(ctx.output_dir.join(pdf_file), pdf_bytes)?;

    // Removed per recipient; the staging guard sweeps any leftovers at run end.
    let _ = fs::remove_file(&staged_png);
    Ok(())
}

fn write_report(ctx: &RunContext, report: &RunReport) {
    let path = ctx.output_dir.join(format!("{}_report.json", report.run_id));
    match serde_json::to_vec_pretty(report) {
        Ok(json) => {
            if let Err(e) = fs::write(&path, json) {
                tracing::warn!(error = %e, "failed to write the run report");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to serialize the run report"),
    }
    tracing::info!(
        run_id = %report.run_id,
        issued = report.issued.len(),
        skipped = report.skipped.len(),
        "run complete"
    );
}
