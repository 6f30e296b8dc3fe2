use log::warn;
use monotrace::{Binarization, MonotraceResult, PbmEncoding, has_pbm_extension};

use crate::cli::BitmapCommand;

use super::utils::{build_monotrace, derive_output_path};

/// The main function to run the bitmap command.
pub fn run(cmd: BitmapCommand) -> MonotraceResult<()> {
    let monotrace = build_monotrace(&cmd.bitmap, Binarization::Dither);
    let handle = monotrace.for_image(&cmd.input)?.bitmap();
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(&cmd.input, "pbm"));

    if has_pbm_extension(&output_path) {
        let encoding = if cmd.plain {
            PbmEncoding::Plain
        } else {
            PbmEncoding::Raw
        };
        handle.save_pbm(&output_path, encoding)?;
    } else {
        if cmd.plain {
            warn!("--plain only applies to .pbm output");
        }
        handle.save(&output_path)?;
    }
    println!("Bitmap saved to {}", output_path.display());

    Ok(())
}
