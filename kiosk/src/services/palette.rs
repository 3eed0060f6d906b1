use palette::{Darken, FromColor, Hsl, Lighten, Mix, ShiftHue, Srgb};
use serde::Serialize;

use crate::error::{KioskError, Result};

/// Number of swatches produced by the gradient-based palette kinds.
const SCALE_STEPS: usize = 5;

/// Supported palette construction schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
pub enum PaletteKind {
    Analogous,
    Complementary,
    Monochromatic,
    Triadic,
}

impl PaletteKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "analogous" => Ok(PaletteKind::Analogous),
            "complementary" => Ok(PaletteKind::Complementary),
            "monochromatic" => Ok(PaletteKind::Monochromatic),
            "triadic" => Ok(PaletteKind::Triadic),
            _ => Err(KioskError::Validation(
                "Palette generation failed. Use valid hex colors and types: analogous, complementary, monochromatic, triadic.".into(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteKind::Analogous => "analogous",
            PaletteKind::Complementary => "complementary",
            PaletteKind::Monochromatic => "monochromatic",
            PaletteKind::Triadic => "triadic",
        }
    }
}

/// One seed color and the palette derived from it.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SeedPalette {
    pub seed: String,
    pub palette: Vec<String>,
}

/// Build palettes for every seed in the comma-separated list.
pub fn build(kind: PaletteKind, seeds: &[String]) -> Result<Vec<SeedPalette>> {
    seeds
        .iter()
        .map(|seed| {
            let base = parse_hex(seed)?;
            let palette = match kind {
                PaletteKind::Analogous => sample_gradient(
                    &[base.shift_hue(-30.0), base, base.shift_hue(30.0)],
                    SCALE_STEPS,
                ),
                PaletteKind::Complementary => {
                    vec![seed.clone(), to_hex(base.shift_hue(180.0))]
                }
                PaletteKind::Monochromatic => {
                    sample_gradient(&[base.darken(0.3), base.lighten(0.3)], SCALE_STEPS)
                }
                PaletteKind::Triadic => vec![
                    seed.clone(),
                    to_hex(base.shift_hue(120.0)),
                    to_hex(base.shift_hue(240.0)),
                ],
            };
            Ok(SeedPalette {
                seed: seed.clone(),
                palette,
            })
        })
        .collect()
}

fn parse_hex(seed: &str) -> Result<Hsl> {
    let srgb: Srgb<u8> = seed.trim().parse().map_err(|_| {
        KioskError::Validation(format!("Invalid hex color: {seed}"))
    })?;
    Ok(Hsl::from_color(srgb.into_format::<f32>()))
}

fn to_hex(color: Hsl) -> String {
    let rgb: Srgb<u8> = Srgb::from_color(color).into_format();
    format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
}

/// Sample `count` evenly spaced colors across a multi-stop gradient,
/// interpolating in HSL space.
fn sample_gradient(stops: &[Hsl], count: usize) -> Vec<String> {
    debug_assert!(stops.len() >= 2);
    let segments = (stops.len() - 1) as f32;

    (0..count)
        .map(|i| {
            let position = i as f32 / (count - 1) as f32 * segments;
            let index = (position.floor() as usize).min(stops.len() - 2);
            let fraction = position - index as f32;
            to_hex(stops[index].mix(stops[index + 1], fraction))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_accepts_known_kinds() {
        assert_eq!(PaletteKind::parse("analogous").unwrap(), PaletteKind::Analogous);
        assert_eq!(PaletteKind::parse("TRIADIC").unwrap(), PaletteKind::Triadic);
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert!(PaletteKind::parse("tetradic").is_err());
    }

    #[test]
    fn analogous_produces_five_swatches() {
        let palettes = build(PaletteKind::Analogous, &["#3498db".to_string()]).unwrap();
        assert_eq!(palettes.len(), 1);
        assert_eq!(palettes[0].seed, "#3498db");
        assert_eq!(palettes[0].palette.len(), 5);
        for swatch in &palettes[0].palette {
            assert!(swatch.starts_with('#') && swatch.len() == 7, "bad swatch {swatch}");
        }
    }

    #[test]
    fn complementary_echoes_seed_then_opposite() {
        let palettes = build(PaletteKind::Complementary, &["#ff0000".to_string()]).unwrap();
        assert_eq!(palettes[0].palette.len(), 2);
        assert_eq!(palettes[0].palette[0], "#ff0000");
        // Red's complement sits in cyan territory.
        assert_eq!(palettes[0].palette[1], "#00ffff");
    }

    #[test]
    fn monochromatic_produces_five_swatches() {
        let palettes = build(PaletteKind::Monochromatic, &["#3498db".to_string()]).unwrap();
        assert_eq!(palettes[0].palette.len(), 5);
    }

    #[test]
    fn triadic_produces_three_swatches() {
        let palettes = build(PaletteKind::Triadic, &["#3498db".to_string()]).unwrap();
        assert_eq!(palettes[0].palette.len(), 3);
        assert_eq!(palettes[0].palette[0], "#3498db");
    }

    #[test]
    fn multiple_seeds_yield_multiple_palettes() {
        let seeds = vec!["#3498db".to_string(), "#e74c3c".to_string()];
        let palettes = build(PaletteKind::Analogous, &seeds).unwrap();
        assert_eq!(palettes.len(), 2);
    }

    #[test]
    fn invalid_seed_is_a_client_error() {
        let err = build(PaletteKind::Analogous, &["notacolor".to_string()]).unwrap_err();
        assert!(matches!(err, KioskError::Validation(_)));
    }

    #[test]
    fn hex_roundtrip_is_stable() {
        for hex in ["#ff0000", "#00ff00", "#0000ff", "#000000", "#ffffff"] {
            let hsl = parse_hex(hex).unwrap();
            assert_eq!(to_hex(hsl), hex);
        }
    }
}
