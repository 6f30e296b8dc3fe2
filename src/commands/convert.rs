use std::fs;

use monotrace::{MonotraceResult, PbmEncoding};

use crate::cli::{ConvertCommand, TRACE_BINARIZATION};

use super::utils::{build_monotrace, derive_output_path, render_svg, warn_if_tracing_dither};

/// The main function to run the convert command: one bitmap, written as PBM and traced to SVG.
pub fn run(cmd: ConvertCommand) -> MonotraceResult<()> {
    let monotrace = build_monotrace(&cmd.bitmap, TRACE_BINARIZATION);
    warn_if_tracing_dither(monotrace.bitmap_options());
    let handle = monotrace.load_bitmap(&cmd.input)?;

    let pbm_path = cmd
        .pbm_output
        .clone()
        .unwrap_or_else(|| derive_output_path(&cmd.input, "pbm"));
    let svg_path = cmd
        .svg_output
        .clone()
        .unwrap_or_else(|| derive_output_path(&cmd.input, "svg"));

    let encoding = if cmd.plain {
        PbmEncoding::Plain
    } else {
        PbmEncoding::Raw
    };
    handle.save_pbm(&pbm_path, encoding)?;
    println!("PBM saved to {}", pbm_path.display());

    let svg = render_svg(&handle, &cmd.engine)?;
    fs::write(&svg_path, &svg)?;
    println!("SVG saved to {}", svg_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use monotrace::ENV_TRACE_ENGINE;

    use super::super::utils::write_sample_png;
    use crate::cli::{Cli, Commands, EngineArg};

    fn parse(args: &[&str]) -> super::ConvertCommand {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Convert(cmd) => cmd,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn writes_pbm_and_svg_named_after_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample_png(dir.path(), "logo.png");

        let cmd = parse(&["monotrace", "convert", input.to_str().unwrap()]);
        if std::env::var_os(ENV_TRACE_ENGINE).is_none() {
            assert_eq!(cmd.engine.engine, EngineArg::Contour);
        }
        super::run(cmd).unwrap();

        let pbm = std::fs::read(dir.path().join("logo.pbm")).unwrap();
        assert!(pbm.starts_with(b"P4"));
        let bitmap = monotrace::pbm::decode(&pbm).unwrap();
        assert_eq!(bitmap.ink_count(), 64);
        let svg = std::fs::read_to_string(dir.path().join("logo.svg")).unwrap();
        assert!(svg.contains("<path"));
    }

    #[test]
    fn explicit_paths_and_plain_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample_png(dir.path(), "logo.png");
        let pbm_path = dir.path().join("out.pbm");
        let svg_path = dir.path().join("drawing.svg");

        super::run(parse(&[
            "monotrace",
            "convert",
            input.to_str().unwrap(),
            "--pbm-output",
            pbm_path.to_str().unwrap(),
            "--svg-output",
            svg_path.to_str().unwrap(),
            "--plain",
            "--engine",
            "contour",
        ]))
        .unwrap();

        assert!(std::fs::read(&pbm_path).unwrap().starts_with(b"P1"));
        assert!(std::fs::read_to_string(&svg_path).unwrap().contains("<path"));
        assert!(!dir.path().join("logo.pbm").exists());
    }
}
