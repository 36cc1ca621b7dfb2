use std::io::Cursor;

use image::{imageops, imageops::FilterType, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use zoo_ticket_engine::traits::MailerError;

/// Width and height of the inline QR images, in pixels.
pub const QR_SIZE: u32 = 300;

pub fn qr_code(data: &str) -> Result<QrCode, MailerError> {
    QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| MailerError::RenderError(format!("Could not encode '{data}' as a QR code. {e}")))
}

/// Renders `data` as a `QR_SIZE` x `QR_SIZE` greyscale PNG.
pub fn qr_png(data: &str) -> Result<Vec<u8>, MailerError> {
    let code = qr_code(data)?;
    let image = code.render::<Luma<u8>>().min_dimensions(QR_SIZE, QR_SIZE).build();
    let image = imageops::resize(&image, QR_SIZE, QR_SIZE, FilterType::Nearest);
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| MailerError::RenderError(format!("Could not encode the QR code as PNG. {e}")))?;
    Ok(png)
}
