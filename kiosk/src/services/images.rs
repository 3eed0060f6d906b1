use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};

use crate::error::{KioskError, Result};

/// Encode raw image bytes as a base64 data URL with the given MIME type.
pub fn to_data_url(bytes: &[u8], content_type: &str) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Decode a `data:<mime>;base64,<payload>` string into its MIME type and
/// raw bytes.
pub fn decode_data_url(input: &str) -> Result<(String, Vec<u8>)> {
    let rest = input
        .strip_prefix("data:")
        .ok_or_else(|| KioskError::Validation("Invalid base64 format".into()))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| KioskError::Validation("Invalid base64 format".into()))?;
    if mime.is_empty() || payload.is_empty() {
        return Err(KioskError::Validation("Invalid base64 format".into()));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| KioskError::Validation(format!("Invalid base64 payload: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// Decode a base64 image payload that may or may not carry a data URL
/// prefix. Used by the extract endpoints, which accept both forms.
pub fn decode_image_payload(input: &str) -> Result<Vec<u8>> {
    if input.starts_with("data:") {
        let (mime, bytes) = decode_data_url(input)?;
        if !mime.starts_with("image/") {
            return Err(KioskError::Validation(format!(
                "Expected an image payload, got {mime}"
            )));
        }
        return Ok(bytes);
    }

    STANDARD
        .decode(input.trim())
        .map_err(|e| KioskError::Validation(format!("Invalid base64 payload: {e}")))
}

/// Keep only the final path component of a client-supplied filename and
/// reject anything that could escape the output directory.
pub fn sanitize_filename(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.contains("..")
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains('\0')
    {
        return Err(KioskError::Validation(format!(
            "Invalid filename: {name}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Write decoded image bytes under the output directory, prefixing the
/// name with a millisecond timestamp so repeated uploads never clobber
/// each other. Returns the relative path of the written file.
pub async fn save_decoded(output_dir: &str, filename: &str, bytes: &[u8]) -> Result<String> {
    let filename = sanitize_filename(filename)?;
    tokio::fs::create_dir_all(output_dir).await?;

    let stamped = format!("{}-{}", chrono::Utc::now().timestamp_millis(), filename);
    let path = std::path::Path::new(output_dir).join(&stamped);
    tokio::fs::write(&path, bytes).await?;

    Ok(path.to_string_lossy().into_owned())
}

/// Target formats accepted by the converter endpoint.
pub fn parse_target_format(target: &str) -> Result<(ImageFormat, &'static str)> {
    match target.to_lowercase().as_str() {
        "jpeg" | "jpg" => Ok((ImageFormat::Jpeg, "image/jpeg")),
        "png" => Ok((ImageFormat::Png, "image/png")),
        "webp" => Ok((ImageFormat::WebP, "image/webp")),
        "gif" => Ok((ImageFormat::Gif, "image/gif")),
        "tiff" => Ok((ImageFormat::Tiff, "image/tiff")),
        "bmp" => Ok((ImageFormat::Bmp, "image/bmp")),
        _ => Err(KioskError::Validation(format!(
            "Please provide a valid target_format (jpeg, png, webp, gif, tiff, bmp), got: {target}"
        ))),
    }
}

/// Re-encode an image into the target format. Returns the converted bytes
/// and the matching content type.
pub fn convert(bytes: &[u8], target: &str) -> Result<(Vec<u8>, &'static str)> {
    let (format, content_type) = parse_target_format(target)?;

    let img = image::load_from_memory(bytes)
        .map_err(|e| KioskError::Validation(format!("Failed to decode image: {e}")))?;

    // JPEG has no alpha channel; flatten before encoding.
    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    let mut output = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut output), format)
        .map_err(|e| KioskError::Image(format!("Conversion failed: {e}")))?;

    Ok((output, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::new_rgba8(16, 16);
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn data_url_roundtrip() {
        let bytes = b"fake image";
        let url = to_data_url(bytes, "image/png");
        let (mime, decoded) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn decode_rejects_missing_prefix() {
        assert!(decode_data_url("aGVsbG8=").is_err());
    }

    #[test]
    fn decode_rejects_bad_payload() {
        assert!(decode_data_url("data:image/png;base64,???").is_err());
    }

    #[test]
    fn image_payload_accepts_bare_base64() {
        let encoded = STANDARD.encode(b"raw bytes");
        assert_eq!(decode_image_payload(&encoded).unwrap(), b"raw bytes");
    }

    #[test]
    fn image_payload_rejects_non_image_data_url() {
        let url = to_data_url(b"plain", "text/plain");
        assert!(decode_image_payload(&url).is_err());
    }

    #[test]
    fn filename_sanitization() {
        assert_eq!(sanitize_filename("out.png").unwrap(), "out.png");
        assert!(sanitize_filename("../escape.png").is_err());
        assert!(sanitize_filename("dir/inner.png").is_err());
        assert!(sanitize_filename("  ").is_err());
    }

    #[test]
    fn convert_png_to_jpeg() {
        let (converted, content_type) = convert(&png_bytes(), "jpeg").unwrap();
        assert_eq!(content_type, "image/jpeg");
        let format = image::guess_format(&converted).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
    }

    #[test]
    fn convert_rejects_unknown_format() {
        let err = convert(&png_bytes(), "heic").unwrap_err();
        assert!(matches!(err, KioskError::Validation(_)));
    }

    #[test]
    fn convert_rejects_garbage_input() {
        let err = convert(b"not an image", "png").unwrap_err();
        assert!(matches!(err, KioskError::Validation(_)));
    }

    #[tokio::test]
    async fn save_decoded_writes_under_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_decoded(dir.path().to_str().unwrap(), "out.png", b"bytes")
            .await
            .unwrap();
        assert!(path.ends_with("out.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
    }
}
