//! Popup stylesheet generation.
//!
//! The stylesheet is a fixed base sheet (`static/popup.css`, embedded at
//! compile time) preceded by a `:root` block of CSS custom properties derived
//! from the document theme. The base sheet only ever reads `var(--…)` tokens,
//! so the theme is the single input and the output is a complete stylesheet
//! for every document, never a patch.
//!
//! ## Tokens
//!
//! | Token | Source |
//! |---|---|
//! | `--primary` | `theme.primaryColor` (`#rgb` / `#rrggbb`, else `#3b82f6`) |
//! | `--primary-strong` | primary mixed 20% toward black |
//! | `--primary-soft` | primary mixed 55% toward white |
//! | `--bg`, `--surface`, `--surface-hover`, `--text`, `--text-muted`, `--border` | light or dark palette |
//! | `--font-base`, `--font-small`, `--font-tiny` | `theme.fontSize` |

use crate::document::{ChecklistDocument, DEFAULT_PRIMARY_COLOR, FontSize, Theme, ThemeMode};

const CSS_STATIC: &str = include_str!("../static/popup.css");

/// An sRGB color parsed from a hex token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive, leading `#` required).
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        }
    }

    /// Linear blend toward `other`; `weight` 0.0 keeps `self`, 1.0 yields `other`.
    pub fn mix(self, other: Rgb, weight: f32) -> Rgb {
        let w = weight.clamp(0.0, 1.0);
        let blend = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * w).round() as u8;
        Rgb::new(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
        )
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Resolve the theme's primary color, falling back to the default token.
pub fn primary_color(theme: &Theme) -> Rgb {
    Rgb::parse_hex(&theme.primary_color)
        .or_else(|| Rgb::parse_hex(DEFAULT_PRIMARY_COLOR))
        .unwrap_or(Rgb::new(0x3b, 0x82, 0xf6))
}

/// Fully resolved color tokens for one theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub primary: Rgb,
    pub primary_strong: Rgb,
    pub primary_soft: Rgb,
    pub background: Rgb,
    pub surface: Rgb,
    pub surface_hover: Rgb,
    pub text: Rgb,
    pub text_muted: Rgb,
    pub border: Rgb,
}

impl Palette {
    pub fn for_theme(theme: &Theme) -> Self {
        let primary = primary_color(theme);
        let base = Self {
            primary,
            primary_strong: primary.mix(BLACK, 0.2),
            primary_soft: primary.mix(WHITE, 0.55),
            background: Rgb::new(0xf9, 0xfa, 0xfb),
            surface: WHITE,
            surface_hover: Rgb::new(0xf3, 0xf4, 0xf6),
            text: Rgb::new(0x11, 0x18, 0x27),
            text_muted: Rgb::new(0x6b, 0x72, 0x80),
            border: Rgb::new(0xe5, 0xe7, 0xeb),
        };
        match theme.mode {
            ThemeMode::Light => base,
            ThemeMode::Dark => Self {
                primary_soft: primary.mix(BLACK, 0.45),
                background: Rgb::new(0x11, 0x18, 0x27),
                surface: Rgb::new(0x1f, 0x29, 0x37),
                surface_hover: Rgb::new(0x37, 0x41, 0x51),
                text: Rgb::new(0xf3, 0xf4, 0xf6),
                text_muted: Rgb::new(0x9c, 0xa3, 0xaf),
                border: Rgb::new(0x37, 0x41, 0x51),
                ..base
            },
        }
    }
}

/// Base, small and tiny font sizes in px.
pub fn font_scale(size: FontSize) -> (u32, u32, u32) {
    match size {
        FontSize::Small => (12, 11, 9),
        FontSize::Medium => (14, 12, 10),
        FontSize::Large => (16, 14, 12),
    }
}

/// Generate the `:root` custom-property block for a theme.
pub fn generate_theme_css(theme: &Theme) -> String {
    let palette = Palette::for_theme(theme);
    let (base, small, tiny) = font_scale(theme.font_size);
    let scheme = match theme.mode {
        ThemeMode::Light => "light",
        ThemeMode::Dark => "dark",
    };
    format!(
        r#":root {{
    color-scheme: {scheme};
    --primary: {primary};
    --primary-strong: {primary_strong};
    --primary-soft: {primary_soft};
    --on-primary: #ffffff;
    --bg: {bg};
    --surface: {surface};
    --surface-hover: {surface_hover};
    --text: {text};
    --text-muted: {text_muted};
    --border: {border};
    --success: #10b981;
    --font-base: {base}px;
    --font-small: {small}px;
    --font-tiny: {tiny}px;
}}"#,
        primary = palette.primary.to_hex(),
        primary_strong = palette.primary_strong.to_hex(),
        primary_soft = palette.primary_soft.to_hex(),
        bg = palette.background.to_hex(),
        surface = palette.surface.to_hex(),
        surface_hover = palette.surface_hover.to_hex(),
        text = palette.text.to_hex(),
        text_muted = palette.text_muted.to_hex(),
        border = palette.border.to_hex(),
    )
}

/// Complete `styles.css` for a document. Depends on `doc.theme` only.
pub fn build_stylesheet(doc: &ChecklistDocument) -> String {
    format!("{}\n\n{}", generate_theme_css(&doc.theme), CSS_STATIC)
}
