use eframe::egui::Color32;
use palette::{Darken, Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Sample colours
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

/// Darker shade of a sample colour, used for its baseline.
pub fn baseline_color(color: Color32) -> Color32 {
    let rgb = Srgb::new(color.r(), color.g(), color.b()).into_format::<f32>();
    let hsl: Hsl = rgb.into_color();
    to_color32(hsl.darken(0.35))
}

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    let rgb = rgb.into_format::<u8>();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn baseline_shade_is_darker() {
        let c = Color32::from_rgb(200, 120, 60);
        let d = baseline_color(c);
        let luma = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(luma(d) < luma(c));
    }
}
