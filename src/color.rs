use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

use crate::plot::series::PenColor;

// ---------------------------------------------------------------------------
// Pen color → Color32
// ---------------------------------------------------------------------------

/// Resolve a pen color for egui. Unknown names fall back to gray.
pub fn to_color32(color: &PenColor) -> Color32 {
    match color {
        PenColor::Gray(level) => {
            let v = (level.clamp(0.0, 1.0) * 255.0).round() as u8;
            Color32::from_gray(v)
        }
        PenColor::Named(name) => named_color(name).unwrap_or_else(|| {
            log::debug!("unknown color '{name}'");
            Color32::GRAY
        }),
    }
}

fn named_color(name: &str) -> Option<Color32> {
    let short = match name {
        "k" => Some(Color32::BLACK),
        "w" => Some(Color32::WHITE),
        "r" => Some(Color32::from_rgb(255, 0, 0)),
        "g" => Some(Color32::from_rgb(0, 128, 0)),
        "b" => Some(Color32::from_rgb(0, 0, 255)),
        "c" => Some(Color32::from_rgb(0, 191, 191)),
        "m" => Some(Color32::from_rgb(191, 0, 191)),
        "y" => Some(Color32::from_rgb(191, 191, 0)),
        _ => None,
    };
    if short.is_some() {
        return short;
    }
    let rgb: Srgb<u8> = if name.starts_with('#') {
        Srgb::<u8>::from_str(name).ok()?
    } else {
        palette::named::from_str(&name.to_lowercase())?
    };
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

/// `#rrggbb` string for a picked color, the form series colors are stored in.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_colors() {
        assert_eq!(to_color32(&PenColor::Gray(0.0)), Color32::BLACK);
        assert_eq!(to_color32(&PenColor::Gray(1.0)), Color32::WHITE);
        assert_eq!(
            to_color32(&PenColor::Named("#9b59b6".into())),
            Color32::from_rgb(0x9b, 0x59, 0xb6)
        );
        assert_eq!(to_color32(&PenColor::Named("Red".into())), Color32::from_rgb(255, 0, 0));
        assert_eq!(to_color32(&PenColor::Named("k".into())), Color32::BLACK);
        assert_eq!(to_color32(&PenColor::Named("not-a-color".into())), Color32::GRAY);
    }

    #[test]
    fn test_hex_round_trip_through_pen_color() {
        let picked = Color32::from_rgb(0x1a, 0xbc, 0x9c);
        assert_eq!(to_hex(picked), "#1abc9c");
        assert_eq!(to_color32(&PenColor::parse(&to_hex(picked))), picked);
    }
}
