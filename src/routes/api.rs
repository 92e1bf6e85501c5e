use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use std::io::Write;
use std::sync::Arc;

use crate::state::AppState;

pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    if filename.contains("..") || filename.is_empty() {
        return Redirect::to("/").into_response();
    }

    let path = state.config.output_folder.join(&filename);
    let Ok(content) = std::fs::read(&path) else {
        return Redirect::to("/").into_response();
    };

    let mime = mime_guess::from_path(&filename)
        .first_raw()
        .unwrap_or("application/octet-stream");
    Response::builder()
        .header("Content-Type", mime)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(axum::body::Body::from(content))
        .unwrap()
        .into_response()
}

pub async fn download_all(State(state): State<Arc<AppState>>) -> Response {
    let entries = match std::fs::read_dir(&state.config.output_folder) {
        Ok(entries) => entries,
        Err(_) => return Redirect::to("/").into_response(),
    };

    let mut zip_data = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut zip_data));

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "pdf") {
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if let Ok(content) = std::fs::read(&path) {
                    let options =
                        zip::write::SimpleFileOptions::default().unix_permissions(0o644);
                    let _ = zip.start_file(name, options);
                    let _ = zip.write_all(&content);
                }
            }
        }

        let _ = zip.finish();
    }

    Response::builder()
        .header("Content-Type", "application/zip")
        .header(
            "Content-Disposition",
            "attachment; filename=\"certificates.zip\"",
        )
        .body(axum::body::Body::from(zip_data))
        .unwrap()
        .into_response()
}
