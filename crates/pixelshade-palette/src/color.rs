use crate::error::PaletteError;

/// Straight RGB color with channels in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Color in the OKLab perceptual space (`l`, `a`, `b`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Oklab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Rgb {
    /// Parses `#rrggbb`. `line` is only used for error reporting.
    pub fn from_hex(text: &str, line: usize) -> Result<Self, PaletteError> {
        let malformed = || PaletteError::MalformedHex { line, text: text.to_string() };

        let digits = text.strip_prefix('#').ok_or_else(malformed)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| malformed())
        };

        Ok(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }

    /// Converts to OKLab.
    ///
    /// Channels are fed to the LMS matrix as-is, without sRGB linearization.
    /// The outline shader converts sampled colors the same way, so distances
    /// stay comparable.
    pub fn to_oklab(self) -> Oklab {
        let l = 0.412_221_47 * self.r + 0.536_332_55 * self.g + 0.051_445_995 * self.b;
        let m = 0.211_903_5 * self.r + 0.680_699_5 * self.g + 0.107_396_96 * self.b;
        let s = 0.088_302_46 * self.r + 0.281_718_85 * self.g + 0.629_978_7 * self.b;

        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        Oklab {
            l: 0.210_454_26 * l_ + 0.793_617_8 * m_ - 0.004_072_047 * s_,
            a: 1.977_998_5 * l_ - 2.428_592_2 * m_ + 0.450_593_7 * s_,
            b: 0.025_904_037 * l_ + 0.782_771_77 * m_ - 0.808_675_77 * s_,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn parses_lowercase_and_uppercase() {
        let c = Rgb::from_hex("#ff8000", 1).unwrap();
        assert_eq!(c.r, 1.0);
        assert!(close(c.g, 128.0 / 255.0));
        assert_eq!(c.b, 0.0);
        assert_eq!(Rgb::from_hex("#FF8000", 1).unwrap(), c);
    }

    #[test]
    fn rejects_missing_hash() {
        let err = Rgb::from_hex("ff8000", 3).unwrap_err();
        assert_eq!(err, PaletteError::MalformedHex { line: 3, text: "ff8000".into() });
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        assert!(Rgb::from_hex("#fff", 1).is_err());
        assert!(Rgb::from_hex("#ff80001", 1).is_err());
        assert!(Rgb::from_hex("#gg0000", 1).is_err());
        // Multi-byte chars must not slip through the length check.
        assert!(Rgb::from_hex("#ééé", 1).is_err());
    }

    #[test]
    fn white_is_unit_lightness() {
        let lab = Rgb::from_hex("#ffffff", 1).unwrap().to_oklab();
        assert!(close(lab.l, 1.0));
        assert!(close(lab.a, 0.0));
        assert!(close(lab.b, 0.0));
    }

    #[test]
    fn black_is_origin() {
        let lab = Rgb::from_hex("#000000", 1).unwrap().to_oklab();
        assert_eq!((lab.l, lab.a, lab.b), (0.0, 0.0, 0.0));
    }

    #[test]
    fn red_has_positive_a() {
        let lab = Rgb::from_hex("#ff0000", 1).unwrap().to_oklab();
        assert!(close(lab.l, 0.628));
        assert!(lab.a > 0.2);
    }
}
