//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

// Three lottery balls with a sparkle, for the nav bar
pub const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 160 96"><circle cx="34" cy="58" r="30" fill="#6366f1" stroke="#09090b" stroke-width="2"/><circle cx="80" cy="48" r="34" fill="#818cf8" stroke="#09090b" stroke-width="2"/><circle cx="126" cy="58" r="30" fill="#c084fc" stroke="#09090b" stroke-width="2"/><circle cx="80" cy="48" r="16" fill="#ffffff"/><circle cx="34" cy="58" r="11" fill="#ffffff"/><circle cx="126" cy="58" r="11" fill="#ffffff"/><path d="M146 4 L150 14 L160 18 L150 22 L146 32 L142 22 L132 18 L142 14 Z" fill="#fbbf24"/></svg>"##;

// Square single ball, no stroke, for window/taskbar icons
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 128 128"><circle cx="64" cy="68" r="56" fill="#818cf8"/><circle cx="64" cy="68" r="26" fill="#ffffff"/><circle cx="64" cy="68" r="12" fill="#6366f1"/><path d="M110 0 L115 13 L128 18 L115 23 L110 36 L105 23 L92 18 L105 13 Z" fill="#fbbf24"/></svg>"##;

/// Rasterize the logo SVG at the given width, preserving aspect ratio.
pub fn rasterize_logo(width: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(LOGO_SVG, &resvg::usvg::Options::default()).ok()?;
    let svg_size = tree.size();
    let scale = width as f32 / svg_size.width();
    let height = (svg_size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), width, height))
}

/// Rasterize the icon SVG to a square image (for window/taskbar icons).
pub fn rasterize_logo_square(size: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).ok()?;
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// App data directory (settings, logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Probability as a percentage with two decimals, e.g. "62.00%"
pub fn format_percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

/// Contribution with explicit sign, e.g. "+0.1234"
pub fn format_signed(v: f64) -> String {
    format!("{:+.4}", v)
}

/// Integer with thousands separators, e.g. "485,094"
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Server timestamps come as ISO-8601, with or without an offset.
/// Anything unparseable is shown as-is.
pub fn format_timestamp(ts: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    match chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => ts.to_string(),
    }
}

/// Feature identifiers as readable labels: `days_since_last` -> "days since last"
pub fn humanize_feature(name: &str) -> String {
    name.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(format_percent(0.62), "62.00%");
        assert_eq!(format_percent(0.1495), "14.95%");
        assert_eq!(format_percent(0.0), "0.00%");
    }

    #[test]
    fn signed_contributions() {
        assert_eq!(format_signed(0.12344), "+0.1234");
        assert_eq!(format_signed(-0.42), "-0.4200");
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(485094), "485,094");
        assert_eq!(format_thousands(12345678), "12,345,678");
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp("2026-01-10T12:30:05.123456"), "2026-01-10 12:30:05");
        assert_eq!(format_timestamp("2026-01-10T12:30:05+05:30"), "2026-01-10 12:30:05");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn svgs_rasterize() {
        let (pixels, w, h) = rasterize_logo(160).unwrap();
        assert_eq!((w, h), (160, 96));
        assert_eq!(pixels.len(), (w * h * 4) as usize);
        let (pixels, w, h) = rasterize_logo_square(64).unwrap();
        assert_eq!((w, h), (64, 64));
        assert!(pixels.chunks(4).any(|p| p[3] == 255));
    }

    #[test]
    fn feature_names_read_as_words() {
        assert_eq!(humanize_feature("days_since_last"), "days since last");
    }
}
