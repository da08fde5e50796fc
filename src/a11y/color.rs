//! sRGB parsing and WCAG 2.0 contrast.
//!
//! Formula: https://www.w3.org/TR/WCAG20/#relativeluminancedef

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A computed CSS color with its alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CssColor {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl CssColor {
    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }

    /// Parses `rgb()`, `rgba()`, `#rgb`, `#rrggbb` and `transparent`.
    pub fn parse(input: &str) -> Option<CssColor> {
        let s = input.trim().to_ascii_lowercase();

        if s == "transparent" {
            return Some(CssColor {
                rgb: Rgb::BLACK,
                alpha: 0.0,
            });
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map(|rgb| CssColor { rgb, alpha: 1.0 });
        }

        let (body, expects_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return None;
        };

        let body = body.strip_suffix(')')?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let alpha = match (parts.len(), expects_alpha) {
            (3, _) => 1.0,
            (4, true) => parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0),
            _ => return None,
        };

        Some(CssColor {
            rgb: Rgb {
                r: parse_channel(parts[0])?,
                g: parse_channel(parts[1])?,
                b: parse_channel(parts[2])?,
            },
            alpha,
        })
    }
}

fn parse_channel(raw: &str) -> Option<u8> {
    let value: f64 = raw.parse().ok()?;
    if !(0.0..=255.0).contains(&value) {
        return None;
    }
    Some(value.round() as u8)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.is_ascii() {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    match hex.len() {
        3 => Some(Rgb {
            r: digit(0)? * 17,
            g: digit(1)? * 17,
            b: digit(2)? * 17,
        }),
        6 => Some(Rgb {
            r: u8::from_str_radix(&hex[0..2], 16).ok()?,
            g: u8::from_str_radix(&hex[2..4], 16).ok()?,
            b: u8::from_str_radix(&hex[4..6], 16).ok()?,
        }),
        _ => None,
    }
}

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn relative_luminance(rgb: Rgb) -> f64 {
    0.2126 * linearize(rgb.r) + 0.7152 * linearize(rgb.g) + 0.0722 * linearize(rgb.b)
}

/// WCAG contrast ratio in [1.0, 21.0]. Order of arguments does not matter.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let lighter = l1.max(l2);
    let darker = l1.min(l2);
    (lighter + 0.05) / (darker + 0.05)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    Failed,
}

impl WcagLevel {
    pub fn classify(ratio: f64, aa_ratio: f64, aaa_ratio: f64) -> Self {
        if ratio >= aaa_ratio {
            WcagLevel::Aaa
        } else if ratio >= aa_ratio {
            WcagLevel::Aa
        } else {
            WcagLevel::Failed
        }
    }
}
