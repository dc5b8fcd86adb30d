use rand::Rng;

/// Normalised RGB triple in `[0, 1]^3`.
pub type Rgb = [f32; 3];

/// Palette used when the caller supplies no colours.
pub const DEFAULT_PALETTE: [&str; 3] = ["#007aff", "#0a84ff", "#5ac8fa"];

/// Substituted for any colour string that does not decode.
pub const FALLBACK_COLOR: Rgb = [1.0, 1.0, 1.0];

/// Decodes `#RRGGBB` (leading `#` optional, hex digits case-insensitive).
///
/// Anything else, including the 3-digit shorthand, maps to white.
pub fn hex_to_rgb(hex: &str) -> Rgb {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return FALLBACK_COLOR;
    }

    let channel = |offset: usize| {
        u8::from_str_radix(&digits[offset..offset + 2], 16).map(|value| value as f32 / 255.0)
    };
    match (channel(0), channel(2), channel(4)) {
        (Ok(r), Ok(g), Ok(b)) => [r, g, b],
        _ => FALLBACK_COLOR,
    }
}

/// Ordered, never-empty list of colours particles are painted with.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Resolves caller-supplied colour strings, falling back to [`DEFAULT_PALETTE`]
    /// when the list is absent or empty.
    pub fn resolve(colors: Option<&[String]>) -> Self {
        let colors: Vec<Rgb> = match colors {
            Some(list) if !list.is_empty() => list.iter().map(|hex| hex_to_rgb(hex)).collect(),
            Some(_) => {
                tracing::debug!("empty particle colour list; using default palette");
                Self::default_colors()
            }
            None => Self::default_colors(),
        };
        Self { colors }
    }

    fn default_colors() -> Vec<Rgb> {
        DEFAULT_PALETTE.iter().map(|hex| hex_to_rgb(hex)).collect()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Picks one entry uniformly at random, with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        self.colors[rng.gen_range(0..self.colors.len())]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::resolve(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_rgb_close(actual: Rgb, expected: Rgb) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-3, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn decodes_well_formed_hex() {
        assert_rgb_close(hex_to_rgb("#007aff"), [0.0, 0.478, 1.0]);
        assert_rgb_close(hex_to_rgb("#5AC8FA"), [0.353, 0.784, 0.980]);
        assert_rgb_close(hex_to_rgb("0a84ff"), [0.039, 0.518, 1.0]);
    }

    #[test]
    fn malformed_hex_falls_back_to_white() {
        assert_eq!(hex_to_rgb("not-a-color"), FALLBACK_COLOR);
        assert_eq!(hex_to_rgb("#fff"), FALLBACK_COLOR);
        assert_eq!(hex_to_rgb("#12345g"), FALLBACK_COLOR);
        assert_eq!(hex_to_rgb(" #007aff"), FALLBACK_COLOR);
        assert_eq!(hex_to_rgb(""), FALLBACK_COLOR);
        assert_eq!(hex_to_rgb("#ünïcø"), FALLBACK_COLOR);
    }

    #[test]
    fn missing_or_empty_list_uses_default_palette() {
        let default = Palette::resolve(None);
        assert_eq!(default.len(), DEFAULT_PALETTE.len());
        assert_rgb_close(default.colors()[0], [0.0, 0.478, 1.0]);

        let empty: Vec<String> = Vec::new();
        assert_eq!(Palette::resolve(Some(&empty)), default);
    }

    #[test]
    fn keeps_caller_order_and_substitutes_bad_entries() {
        let colors = vec!["#ff0000".to_string(), "bogus".to_string()];
        let palette = Palette::resolve(Some(&colors));
        assert_eq!(palette.colors(), &[[1.0, 0.0, 0.0], FALLBACK_COLOR]);
    }

    #[test]
    fn samples_only_palette_entries() {
        let colors = vec!["#ff0000".to_string(), "#00ff00".to_string()];
        let palette = Palette::resolve(Some(&colors));
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..64 {
            let color = palette.sample(&mut rng);
            assert!(palette.colors().contains(&color));
        }
    }
}
