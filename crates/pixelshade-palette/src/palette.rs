use std::fmt::Write as _;
use std::path::Path;

use crate::color::{Oklab, Rgb};
use crate::error::PaletteError;

/// Marker replaced by the generated palette in the outline shader template.
pub const PALETTE_MARKER: &str = "//#PALETTE";

/// An ordered list of palette colors, stored in OKLab.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Oklab>,
}

impl Palette {
    /// Parses palette text: one `#rrggbb` per line, blank lines skipped.
    pub fn parse(src: &str) -> Result<Self, PaletteError> {
        let mut colors = Vec::new();

        for (idx, raw) in src.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            colors.push(Rgb::from_hex(line, idx + 1)?.to_oklab());
        }

        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }

        Ok(Self { colors })
    }

    /// Reads and parses a palette file.
    ///
    /// I/O failures are returned as-is; parse failures are wrapped in
    /// `io::ErrorKind::InvalidData` so callers only deal with one error type.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::parse(&src).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn colors(&self) -> &[Oklab] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Renders the palette as WGSL module-scope declarations.
    ///
    /// ```text
    /// const PALETTE_LEN: u32 = 2u;
    /// var<private> PALETTE: array<vec3<f32>, 2> = array<vec3<f32>, 2>(
    ///     vec3<f32>(1.000000, 0.000000, 0.000000),
    ///     vec3<f32>(0.000000, 0.000000, 0.000000)
    /// );
    /// ```
    pub fn wgsl_array(&self) -> String {
        let n = self.colors.len();
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "const PALETTE_LEN: u32 = {n}u;");
        let _ = writeln!(
            out,
            "var<private> PALETTE: array<vec3<f32>, {n}> = array<vec3<f32>, {n}>("
        );
        for (i, c) in self.colors.iter().enumerate() {
            let sep = if i + 1 < n { "," } else { "" };
            let _ = writeln!(out, "    vec3<f32>({:.6}, {:.6}, {:.6}){sep}", c.l, c.a, c.b);
        }
        out.push_str(");\n");
        out
    }
}

/// Substitutes the generated palette into an outline shader template.
///
/// The template must contain [`PALETTE_MARKER`]; only the first occurrence is replaced.
pub fn compile_outline_shader(template: &str, palette: &Palette) -> Result<String, PaletteError> {
    if !template.contains(PALETTE_MARKER) {
        return Err(PaletteError::MissingMarker { marker: PALETTE_MARKER });
    }
    Ok(template.replacen(PALETTE_MARKER, &palette.wgsl_array(), 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines() {
        let p = Palette::parse("#000000\n\n   \n#ffffff\n").unwrap();
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn tolerates_crlf() {
        let p = Palette::parse("#000000\r\n#ffffff\r\n").unwrap();
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn reports_line_of_bad_entry() {
        let err = Palette::parse("#000000\n\n#12345\n").unwrap_err();
        assert_eq!(err, PaletteError::MalformedHex { line: 3, text: "#12345".into() });
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert_eq!(Palette::parse("\n \n").unwrap_err(), PaletteError::Empty);
    }

    #[test]
    fn wgsl_array_has_one_entry_per_color() {
        let p = Palette::parse("#000000\n#ffffff\n#000000").unwrap();
        let src = p.wgsl_array();
        assert!(src.contains("const PALETTE_LEN: u32 = 3u;"));
        assert!(src.contains("array<vec3<f32>, 3>("));
        assert_eq!(src.matches("    vec3<f32>(").count(), 3);
        assert!(src.starts_with("const PALETTE_LEN"));
        assert!(src.contains("\n    vec3<f32>(0.000000, 0.000000, 0.000000),\n"));
        assert!(src.ends_with("vec3<f32>(0.000000, 0.000000, 0.000000)\n);\n"));
    }

    #[test]
    fn marker_is_replaced() {
        let p = Palette::parse("#ffffff").unwrap();
        let out = compile_outline_shader("a\n//#PALETTE\nb", &p).unwrap();
        assert!(!out.contains(PALETTE_MARKER));
        assert!(out.starts_with("a\nconst PALETTE_LEN"));
        assert!(out.ends_with(");\n\nb"));
    }

    #[test]
    fn missing_marker_is_an_error() {
        let p = Palette::parse("#ffffff").unwrap();
        assert!(matches!(
            compile_outline_shader("fn main() {}", &p),
            Err(PaletteError::MissingMarker { .. })
        ));
    }
}
