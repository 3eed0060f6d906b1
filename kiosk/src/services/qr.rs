use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use qrcode::QrCode;

use crate::error::{KioskError, Result};

/// Render `data` as a QR code PNG and return it as a base64 data URL.
pub fn generate_data_url(data: &str) -> Result<String> {
    if data.is_empty() {
        return Err(KioskError::Validation(
            "Missing \"data\" query parameter".into(),
        ));
    }

    let code = QrCode::new(data.as_bytes())
        .map_err(|e| KioskError::Validation(format!("Failed to encode QR data: {e}")))?;

    let rendered = code.render::<image::Luma<u8>>().build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(rendered)
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| KioskError::Internal(format!("Failed to encode QR image: {e}")))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}
