use clap::Parser;
use std::path::PathBuf;

/// Renders a shadow-lit scene as outlined, palette-quantized pixel art.
#[derive(Debug, Parser)]
#[command(name = "pixelshade", version, about)]
pub struct Args {
    /// Palette file: one `#rrggbb` color per line.
    pub palette: PathBuf,

    /// Also write the compiled outline shader to this file.
    #[arg(long, value_name = "PATH")]
    pub emit_shader: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_required() {
        let err = Args::try_parse_from(["pixelshade"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn takes_exactly_one_palette() {
        let args = Args::try_parse_from(["pixelshade", "palettes/default.txt"]).unwrap();
        assert_eq!(args.palette, PathBuf::from("palettes/default.txt"));
        assert!(args.emit_shader.is_none());

        assert!(Args::try_parse_from(["pixelshade", "a.txt", "b.txt"]).is_err());
    }

    #[test]
    fn shader_output_is_an_optional_flag() {
        let args = Args::try_parse_from([
            "pixelshade",
            "--emit-shader",
            "outline-compiled.wgsl",
            "palettes/default.txt",
        ])
        .unwrap();
        assert_eq!(args.palette, PathBuf::from("palettes/default.txt"));
        assert_eq!(args.emit_shader, Some(PathBuf::from("outline-compiled.wgsl")));
    }

    #[test]
    fn help_goes_to_stdout() {
        let err = Args::try_parse_from(["pixelshade", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
