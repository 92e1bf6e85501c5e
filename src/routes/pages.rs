use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tera::Context;

use crate::error::Error;
use crate::pipeline::{self, RunContext};
use crate::state::AppState;
use crate::storage::new_run_id;

pub async fn index() -> Response {
    render_template("index.html", Context::new())
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: axum::extract::Multipart,
) -> Response {
    let mut template: Option<(String, Vec<u8>)> = None;
    let mut spreadsheet: Option<(String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        if name == "template" {
            let filename = field.file_name().unwrap_or("template.png").to_string();
            if let Ok(data) = field.bytes().await {
                template = Some((filename, data.to_vec()));
            }
        } else if name == "excel" {
            let filename = field.file_name().unwrap_or("recipients.xlsx").to_string();
            if let Ok(data) = field.bytes().await {
                spreadsheet = Some((filename, data.to_vec()));
            }
        }
    }

    let Some((template_name, template_bytes)) = template.filter(|(_, d)| !d.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "a template image is required");
    };
    let Some((sheet_name, sheet_bytes)) = spreadsheet.filter(|(_, d)| !d.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "a recipient spreadsheet is required");
    };

    let run_id = new_run_id();

    // Keep a copy of what was submitted next to the run id, for diagnosis.
    for (original, bytes) in [(&template_name, &template_bytes), (&sheet_name, &sheet_bytes)] {
        let staged = state
            .config
            .upload_folder
            .join(format!("{}_{}", run_id, sanitize_filename::sanitize(original)));
        if let Err(e) = std::fs::write(&staged, bytes) {
            tracing::warn!(error = %e, "failed to stage an upload copy");
        }
    }

    let fonts = state.fonts.clone();
    let output_dir = state.config.output_folder.clone();
    let task_run_id = run_id.clone();
    let result = tokio::task::spawn_blocking(move || {
        let ctx = RunContext {
            run_id: task_run_id,
            fonts: &fonts,
            output_dir: &output_dir,
        };
        pipeline::run(&ctx, &template_bytes, &sheet_bytes)
    })
    .await;

    let outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            tracing::error!(run_id = %run_id, error = %e, "pipeline run failed");
            let status = match e {
                Error::MalformedSpreadsheet(_) | Error::TemplateLoad(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            return error_response(status, &e.to_string());
        }
        Err(e) => {
            tracing::error!(run_id = %run_id, error = %e, "pipeline task aborted");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "certificate generation failed",
            );
        }
    };

    tracing::info!(
        run_id = %run_id,
        issued = outcome.report.issued.len(),
        skipped = outcome.report.skipped.len(),
        "generation complete"
    );

    Response::builder()
        .header(
            "Content-Type",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )
        .header(
            "Content-Disposition",
            format!(
                "attachment; filename=\"{}\"",
                pipeline::UPDATED_WORKBOOK_NAME
            ),
        )
        .body(axum::body::Body::from(outcome.workbook))
        .unwrap()
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn render_template(name: &str, ctx: Context) -> Response {
    let tera = crate::templates::get_tera();
    match tera.render(name, &ctx) {
        Ok(rendered) => Html(rendered).into_response(),
        Err(e) => {
            tracing::error!(template = name, error = %e, "template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}
