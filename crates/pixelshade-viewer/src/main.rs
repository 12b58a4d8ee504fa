use std::path::Path;

use anyhow::Context;
use clap::Parser;
use pixelshade_engine::logging::{LoggingConfig, init_logging};
use pixelshade_engine::render::OUTLINE_TEMPLATE;
use pixelshade_engine::window::Runtime;
use pixelshade_palette::{Palette, compile_outline_shader};

mod cli;
mod config;
mod controls;
mod viewer;

use config::ViewerConfig;
use viewer::Viewer;

fn main() {
    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    init_logging(LoggingConfig::default());

    if let Err(e) = run(args) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: cli::Args) -> anyhow::Result<()> {
    let palette = Palette::from_file(&args.palette)
        .with_context(|| format!("failed to read palette {}", args.palette.display()))?;
    log::info!("palette {} with {} colors", args.palette.display(), palette.len());

    let outline_source = compile_outline_shader(OUTLINE_TEMPLATE, &palette)
        .context("failed to build the outline shader")?;
    log::debug!("compiled outline shader:\n{outline_source}");
    if let Some(path) = &args.emit_shader {
        write_shader(path, &outline_source)?;
    }

    let config = ViewerConfig::default();
    let runtime = config.runtime.clone();
    let gpu = config.gpu.clone();
    Runtime::run(runtime, gpu, Viewer::new(config, outline_source))
}

fn write_shader(path: &Path, source: &str) -> anyhow::Result<()> {
    std::fs::write(path, source)
        .with_context(|| format!("failed to write shader {}", path.display()))?;
    log::info!("wrote outline shader to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_shader_is_written_verbatim() {
        let palette = Palette::parse("#000000\n#ffffff\n").unwrap();
        let source = compile_outline_shader(OUTLINE_TEMPLATE, &palette).unwrap();

        let path = std::env::temp_dir().join(format!("pixelshade-outline-{}.wgsl", std::process::id()));
        write_shader(&path, &source).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(written, source);
        assert!(written.contains("PALETTE_LEN: u32 = 2"));
        assert!(!written.contains("//#PALETTE"));
    }

    #[test]
    fn unwritable_shader_path_is_an_error() {
        let path = std::env::temp_dir().join("pixelshade-missing-dir").join("nested").join("x.wgsl");
        let err = write_shader(&path, "x").unwrap_err();
        assert!(format!("{err:#}").contains("failed to write shader"));
    }
}
