use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::v1::dto::{DataUrlResponse, FromBase64Request, SavedImageResponse};
use crate::api::AppState;
use crate::error::{KioskError, Result};
use crate::services::{images, uploads};

/// An image field pulled out of a multipart form, along with any plain
/// text fields that accompanied it.
pub struct MultipartImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub fields: Vec<(String, String)>,
}

/// Read the image (`image` or `file` field) and text fields from a
/// multipart form.
pub async fn read_multipart_image(mut multipart: Multipart) -> Result<MultipartImage> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut content_type = "application/octet-stream".to_string();
    let mut fields = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| KioskError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" | "file" => {
                if let Some(ct) = field.content_type() {
                    content_type = ct.to_string();
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| KioskError::Validation(format!("Failed to read file: {e}")))?;
                bytes = Some(data.to_vec());
            }
            _ => {
                let value = field.text().await.map_err(|e| {
                    KioskError::Validation(format!("Invalid field '{name}': {e}"))
                })?;
                fields.push((name, value));
            }
        }
    }

    let bytes =
        bytes.ok_or_else(|| KioskError::Validation("Missing image file in request".into()))?;
    if bytes.is_empty() {
        return Err(KioskError::Validation("Uploaded file is empty".into()));
    }

    Ok(MultipartImage {
        bytes,
        content_type,
        fields,
    })
}

/// `POST /api/v1/images/to-base64`
#[utoipa::path(
    post,
    path = "/api/v1/images/to-base64",
    tag = "images",
    operation_id = "images.to_base64",
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload in an `image` field"),
    responses(
        (status = 200, description = "Image as a base64 data URL", body = DataUrlResponse),
        (status = 400, description = "No file uploaded"),
    )
)]
pub async fn to_base64(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DataUrlResponse>> {
    let upload = read_multipart_image(multipart).await?;

    // Spool through the transient directory like every upload handler;
    // the guard removes the file when the request finishes.
    let temp = uploads::spool(
        upload.bytes.clone(),
        state.config.storage.upload_dir.clone(),
    )
    .await?;
    tracing::debug!(path = %temp.path().display(), "Upload spooled");

    let base64 = images::to_data_url(&upload.bytes, &upload.content_type);
    Ok(Json(DataUrlResponse { base64 }))
}

/// `POST /api/v1/images/from-base64`
#[utoipa::path(
    post,
    path = "/api/v1/images/from-base64",
    tag = "images",
    operation_id = "images.from_base64",
    request_body = FromBase64Request,
    responses(
        (status = 200, description = "Decoded image written to the output directory", body = SavedImageResponse),
        (status = 400, description = "Missing or malformed base64 payload"),
    )
)]
pub async fn from_base64(
    State(state): State<AppState>,
    Json(request): Json<FromBase64Request>,
) -> Result<Json<SavedImageResponse>> {
    let base64 = request
        .base64
        .ok_or_else(|| KioskError::Validation("Base64 string is required".into()))?;

    let (_mime, bytes) = images::decode_data_url(&base64)?;
    let filename = request.filename.unwrap_or_else(|| "output.png".to_string());
    let path = images::save_decoded(&state.config.storage.output_dir, &filename, &bytes).await?;

    Ok(Json(SavedImageResponse {
        message: "Image saved successfully".to_string(),
        path,
    }))
}

/// `POST /api/v1/images/convert`
#[utoipa::path(
    post,
    path = "/api/v1/images/convert",
    tag = "images",
    operation_id = "images.convert",
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload plus a `target_format` field"),
    responses(
        (status = 200, description = "Converted image bytes with the matching content type"),
        (status = 400, description = "Missing file or unsupported target format"),
    )
)]
pub async fn convert(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let upload = read_multipart_image(multipart).await?;

    let target = upload
        .fields
        .iter()
        .find(|(name, _)| name == "target_format" || name == "targetFormat")
        .map(|(_, value)| value.clone())
        .ok_or_else(|| KioskError::Validation("Missing target_format field".into()))?;

    let temp = uploads::spool(
        upload.bytes.clone(),
        state.config.storage.upload_dir.clone(),
    )
    .await?;
    tracing::debug!(path = %temp.path().display(), "Upload spooled");

    let (converted, content_type) = images::convert(&upload.bytes, &target)?;

    Ok(([(header::CONTENT_TYPE, content_type)], converted).into_response())
}
