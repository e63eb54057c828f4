// routes/qrcode.rs
// GET /qrcode -> returns a PNG QR code of the logged-in account's otpauth URL.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

use crate::session::SessionUser;
use crate::totp::build_totp;

/// Builds and returns a PNG QR code so clients can scan and enroll.
pub async fn qrcode(session: SessionUser) -> Response {
    let user = session.user();
    match build_totp(&user.email, &user.secret) {
        Ok(totp) => {
            let url = totp.get_url();
            if let Ok(code) = QrCode::new(url.as_bytes()) {
                let img = code.render::<Luma<u8>>().min_dimensions(200, 200).build();

                // image 0.25: write_to requires Write + Seek -> Cursor<Vec<u8>>
                let mut cursor = Cursor::new(Vec::<u8>::new());
                if image::DynamicImage::ImageLuma8(img)
                    .write_to(&mut cursor, ImageFormat::Png)
                    .is_ok()
                {
                    let png = cursor.into_inner();
                    return Response::builder()
                        .header("Content-Type", "image/png")
                        .body(Body::from(png))
                        .unwrap();
                }
            }
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to build qr").into_response()
        }
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid secret").into_response(),
    }
}
