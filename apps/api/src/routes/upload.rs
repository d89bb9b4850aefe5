//! POST /api/upload-cv — stage the upload, extract it, assess it, answer with JSON.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::info;

use crate::assessment::{generate_assessment, PositionCategory};
use crate::errors::AppError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const POSITION_FIELD: &str = "position_type";
const STAGED_PREFIX: &str = "cv-upload-";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub raw_data: Value,
    pub processed_markdown: String,
    pub original_markdown: String,
    pub text: String,
    pub file_name: String,
}

struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    position_type: Option<String>,
}

impl UploadForm {
    /// Reads every field up front. The first file part and the first category win;
    /// a `file` part without a filename counts as a plain form field.
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some(FILE_FIELD) if form.file.is_none() => {
                    let Some(file_name) = field.file_name().map(str::to_owned) else {
                        continue;
                    };
                    let bytes = field.bytes().await?;
                    form.file = Some(UploadedFile { file_name, bytes });
                }
                Some(POSITION_FIELD) if form.position_type.is_none() => {
                    form.position_type = Some(field.text().await?);
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Temporary on-disk copy of an upload.
/// The file is deleted when this value drops, whichever way the handler exits.
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn persist(dir: &Path, original_name: &str, bytes: &[u8]) -> anyhow::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(STAGED_PREFIX)
            .suffix(&file_suffix(original_name))
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .context("Failed to write uploaded file")?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// `.ext` of the original filename, or nothing when it has no extension.
fn file_suffix(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

pub async fn handle_upload_cv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart = multipart.map_err(|_| AppError::MissingFile)?;
    let form = UploadForm::read(multipart).await?;

    let file = form.file.ok_or(AppError::MissingFile)?;
    if file.file_name.is_empty() {
        return Err(AppError::NoFileSelected);
    }
    let category = PositionCategory::from_label(form.position_type.as_deref());

    info!(
        file_name = %file.file_name,
        position_type = category.as_str(),
        size = file.bytes.len(),
        "Processing CV upload"
    );

    let staged = StagedUpload::persist(&state.config.upload_dir, &file.file_name, &file.bytes)?;

    let document = state
        .extractor
        .extract(staged.path())
        .await
        .map_err(|e| AppError::Extraction(e.to_string()))?;

    let processed_markdown = match state.llm.as_deref() {
        Some(llm) => generate_assessment(Some(llm), &document.data, category).await,
        None => document.markdown.clone(),
    };

    Ok(Json(UploadResponse {
        success: true,
        raw_data: document.data,
        processed_markdown,
        original_markdown: document.markdown,
        text: document.text,
        file_name: file.file_name,
    }))
}
