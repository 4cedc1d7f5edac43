//! Rasterised QR codes for the code side of a card.

use image::GrayImage;
use image::Luma;
use image::imageops::{self, FilterType};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use qrcode::{Color, EcLevel, QrCode, Version};

use crate::error::DeckError;

/// Symbol version used for every card, 45×45 modules. Together with
/// [`EC_LEVEL`] this holds 122 bytes, enough for catalog share links.
pub const QR_VERSION: i16 = 7;
pub const EC_LEVEL: EcLevel = EcLevel::M;
/// Pixels per module before resampling.
const MODULE_PX: u32 = 10;
/// Quiet zone width in modules.
const QUIET_ZONE: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Produces fixed-size code images for card payloads.
#[derive(Debug, Clone, Copy)]
pub struct CodeImageProducer {
    size_px: u32,
}

impl CodeImageProducer {
    pub fn new(size_px: u32) -> Self {
        Self { size_px }
    }

    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    /// Encode `payload` and resample it to `size_px × size_px` with Lanczos3.
    pub fn produce(&self, payload: &str) -> Result<GrayImage, DeckError> {
        if payload.is_empty() {
            return Err(DeckError::encoding(payload, "payload is empty"));
        }
        if self.size_px == 0 {
            return Err(DeckError::encoding(payload, "target size is zero"));
        }
        let code = QrCode::with_version(payload.as_bytes(), Version::Normal(QR_VERSION), EC_LEVEL)
            .map_err(|err| DeckError::encoding(payload, err))?;
        let raster = paint_modules(&code);
        Ok(imageops::resize(
            &raster,
            self.size_px,
            self.size_px,
            FilterType::Lanczos3,
        ))
    }
}

fn paint_modules(code: &QrCode) -> GrayImage {
    let modules = code.width() as u32;
    let side = (modules + 2 * QUIET_ZONE) * MODULE_PX;
    let mut image = GrayImage::from_pixel(side, side, LIGHT);
    for (idx, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let col = idx as u32 % modules;
        let row = idx as u32 / modules;
        let x = ((col + QUIET_ZONE) * MODULE_PX) as i32;
        let y = ((row + QUIET_ZONE) * MODULE_PX) as i32;
        draw_filled_rect_mut(
            &mut image,
            Rect::at(x, y).of_size(MODULE_PX, MODULE_PX),
            DARK,
        );
    }
    image
}
