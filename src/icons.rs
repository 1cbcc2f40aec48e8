//! Extension icon rasterization.
//!
//! Chrome wants PNG icons at 16, 48 and 128 px. When the document's logo is
//! embedded as a `data:image/…;base64,` URL it is decoded and fill-resized
//! (center crop, Lanczos3) to each size. Anything else, including remote logo
//! URLs that can't be fetched at export time, gets the default mark: a
//! `#3b82f6` square with a white check stroke.
//!
//! Rendering is pure arithmetic over pixel centers and PNG encoding uses fixed
//! settings, so the same input always yields the same bytes.

use crate::document::ChecklistDocument;
use crate::manifest::ICON_SIZES;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use thiserror::Error;
use tracing::{debug, warn};

pub const MAX_ICON_SIZE: u32 = 1024;

/// Fill color of the default icon.
pub const ICON_BACKGROUND: Rgba<u8> = Rgba([0x3b, 0x82, 0xf6, 0xff]);
const CHECK_COLOR: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Check mark polyline in unit coordinates.
const CHECK_STROKE: [(f32, f32); 3] = [(0.25, 0.53), (0.42, 0.70), (0.76, 0.32)];
/// Stroke half-width as a fraction of the icon edge.
const CHECK_HALF_WIDTH: f32 = 0.075;

#[derive(Error, Debug)]
pub enum IconError {
    #[error("icon size must be between 1 and {MAX_ICON_SIZE} px, got {0}")]
    InvalidSize(u32),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Why a logo could not be used as the icon source.
#[derive(Error, Debug)]
pub enum LogoError {
    #[error("not an embedded image (only data:image/…;base64 URLs are used offline)")]
    NotEmbedded,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unreadable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Where the icon pixels come from.
pub enum IconSource {
    Default,
    Logo(DynamicImage),
}

impl IconSource {
    /// Pick the icon source for a document, falling back to the default mark.
    pub fn for_document(doc: &ChecklistDocument) -> Self {
        let Some(logo) = doc.logo_url() else {
            return Self::Default;
        };
        match decode_logo(logo) {
            Ok(image) => {
                debug!(
                    width = image.width(),
                    height = image.height(),
                    "using embedded logo for icons"
                );
                Self::Logo(image)
            }
            Err(e) => {
                warn!(document = %doc.name, error = %e, "logo not usable as icon, using default");
                Self::Default
            }
        }
    }

    pub fn render(&self, size: u32) -> Result<Vec<u8>, IconError> {
        check_size(size)?;
        let pixels = match self {
            Self::Default => render_default_icon(size),
            Self::Logo(image) => image
                .resize_to_fill(size, size, FilterType::Lanczos3)
                .to_rgba8(),
        };
        encode_png(&pixels)
    }
}

/// Decode a `data:image/<type>;base64,<payload>` URL.
pub fn decode_logo(url: &str) -> Result<DynamicImage, LogoError> {
    let rest = url.trim().strip_prefix("data:").ok_or(LogoError::NotEmbedded)?;
    let (meta, payload) = rest.split_once(',').ok_or(LogoError::NotEmbedded)?;
    if !meta.starts_with("image/") || !meta.ends_with(";base64") {
        return Err(LogoError::NotEmbedded);
    }
    let bytes = BASE64.decode(payload.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// PNG bytes for the default icon at `size` px.
pub fn build_default_icon(size: u32) -> Result<Vec<u8>, IconError> {
    IconSource::Default.render(size)
}

/// PNG icons for every manifest size, smallest first.
pub fn build_icon_set(doc: &ChecklistDocument) -> Result<Vec<(u32, Vec<u8>)>, IconError> {
    let source = IconSource::for_document(doc);
    ICON_SIZES
        .iter()
        .map(|&size| Ok((size, source.render(size)?)))
        .collect()
}

fn check_size(size: u32) -> Result<(), IconError> {
    if size == 0 || size > MAX_ICON_SIZE {
        return Err(IconError::InvalidSize(size));
    }
    Ok(())
}

fn render_default_icon(size: u32) -> RgbaImage {
    let edge = size as f32;
    let half_width = (CHECK_HALF_WIDTH * edge).max(1.0);
    let points: Vec<(f32, f32)> = CHECK_STROKE
        .iter()
        .map(|&(x, y)| (x * edge, y * edge))
        .collect();

    RgbaImage::from_fn(size, size, |x, y| {
        let p = (x as f32 + 0.5, y as f32 + 0.5);
        let distance = points
            .windows(2)
            .map(|seg| distance_to_segment(p, seg[0], seg[1]))
            .fold(f32::INFINITY, f32::min);
        // One pixel of linear coverage at the stroke edge.
        let coverage = (half_width + 0.5 - distance).clamp(0.0, 1.0);
        blend(ICON_BACKGROUND, CHECK_COLOR, coverage)
    })
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

fn blend(under: Rgba<u8>, over: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let mix = |u: u8, o: u8| (u as f32 + (o as f32 - u as f32) * alpha).round() as u8;
    Rgba([
        mix(under[0], over[0]),
        mix(under[1], over[1]),
        mix(under[2], over[2]),
        0xff,
    ])
}

fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>, IconError> {
    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, PngFilter::Adaptive)
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgba8,
        )?;
    Ok(bytes)
}
