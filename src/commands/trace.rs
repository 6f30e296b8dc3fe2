use std::fs;

use monotrace::MonotraceResult;

use crate::cli::{TRACE_BINARIZATION, TraceCommand};

use super::utils::{build_monotrace, derive_output_path, render_svg, warn_if_tracing_dither};

/// The main function to run the trace command.
pub fn run(cmd: TraceCommand) -> MonotraceResult<()> {
    let monotrace = build_monotrace(&cmd.bitmap, TRACE_BINARIZATION);
    warn_if_tracing_dither(monotrace.bitmap_options());
    let handle = monotrace.load_bitmap(&cmd.input)?;
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(&cmd.input, "svg"));

    let svg = render_svg(&handle, &cmd.engine)?;
    fs::write(&output_path, &svg)?;
    println!("SVG saved to {}", output_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::super::utils::write_sample_png;
    use crate::cli::{Cli, Commands};

    fn parse(args: &[&str]) -> super::TraceCommand {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Trace(cmd) => cmd,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn traces_png_with_polygon_curves() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample_png(dir.path(), "logo.png");

        super::run(parse(&[
            "monotrace",
            "trace",
            input.to_str().unwrap(),
            "--engine",
            "contour",
            "--curve",
            "polygon",
        ]))
        .unwrap();

        let svg = std::fs::read_to_string(dir.path().join("logo.svg")).unwrap();
        assert!(svg.contains("d=\"M4 4H12V12H4Z\""));
    }

    #[test]
    fn traces_pbm_input_and_dithered_images() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample_png(dir.path(), "logo.png");
        let pbm = dir.path().join("scan.pbm");
        let bitmap =
            monotrace::Bitmap::from_fn(6, 6, |x, y| (1..5).contains(&x) && (1..5).contains(&y));
        monotrace::pbm::write_pbm(&pbm, &bitmap, monotrace::PbmEncoding::Raw).unwrap();

        super::run(parse(&["monotrace", "trace", pbm.to_str().unwrap(), "--engine", "contour"]))
            .unwrap();
        let dithered = dir.path().join("dithered.svg");
        super::run(parse(&[
            "monotrace",
            "trace",
            input.to_str().unwrap(),
            "--dither",
            "--engine",
            "contour",
            "-o",
            dithered.to_str().unwrap(),
        ]))
        .unwrap();

        let traced = std::fs::read_to_string(dir.path().join("scan.svg")).unwrap();
        assert!(traced.contains("<path"));
        assert!(std::fs::read_to_string(&dithered).unwrap().contains("<svg"));
    }

    #[cfg(unix)]
    #[test]
    fn missing_potrace_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample_png(dir.path(), "logo.png");

        let err = super::run(parse(&[
            "monotrace",
            "trace",
            input.to_str().unwrap(),
            "--engine",
            "potrace",
            "--potrace-program",
            "monotrace-no-such-tracer-binary",
        ]))
        .unwrap_err();

        assert!(matches!(err, monotrace::MonotraceError::ToolNotFound { .. }));
        assert!(!dir.path().join("logo.svg").exists());
    }
}
