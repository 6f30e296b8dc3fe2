//! Adapter for the external `potrace` program.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use log::debug;

use super::BitmapVectorizer;
use crate::bitmap::Bitmap;
use crate::pbm::{PbmEncoding, encode};
use crate::{MonotraceError, MonotraceResult};

/// Program name looked up on `PATH` when none is configured.
pub const DEFAULT_POTRACE_PROGRAM: &str = "potrace";

/// Options forwarded to the external tracer.
#[derive(Debug, Clone, Default)]
pub struct PotraceOptions {
    /// Suppress speckles of up to this many pixels (`--turdsize`).
    pub turd_size: Option<u32>,
    /// Corner threshold (`--alphamax`).
    pub alpha_max: Option<f64>,
    /// Extra arguments appended verbatim.
    pub extra_args: Vec<String>,
}

/// Vectorizer that pipes a raw PBM into `potrace -s -o - -` and returns its SVG.
#[derive(Debug, Clone)]
pub struct PotraceSvgVectorizer {
    pub program: String,
}

impl Default for PotraceSvgVectorizer {
    fn default() -> Self {
        Self {
            program: DEFAULT_POTRACE_PROGRAM.to_string(),
        }
    }
}

impl PotraceSvgVectorizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn arguments(options: &PotraceOptions) -> Vec<String> {
        let mut args = vec!["-s".to_string(), "-o".to_string(), "-".to_string()];
        if let Some(turd_size) = options.turd_size {
            args.push("--turdsize".to_string());
            args.push(turd_size.to_string());
        }
        if let Some(alpha_max) = options.alpha_max {
            args.push("--alphamax".to_string());
            args.push(alpha_max.to_string());
        }
        args.extend(options.extra_args.iter().cloned());
        args.push("-".to_string());
        args
    }
}

impl BitmapVectorizer for PotraceSvgVectorizer {
    type Options = PotraceOptions;
    type Output = String;

    fn vectorize(&self, bitmap: &Bitmap, options: &Self::Options) -> MonotraceResult<Self::Output> {
        let args = Self::arguments(options);
        let input = encode(bitmap, PbmEncoding::Raw)?;
        debug!("running {} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| MonotraceError::ToolNotFound {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a full stdout pipe cannot stall the child.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| MonotraceError::Trace("potrace stdin unavailable".to_string()))?;
        let writer = thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .map_err(|_| MonotraceError::Trace("stdin writer panicked".to_string()))?;

        // A failing child usually breaks the pipe; its stderr is the better report.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MonotraceError::Trace(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        written?;

        String::from_utf8(output.stdout).map_err(|e| {
            MonotraceError::Trace(format!("{} produced invalid UTF-8: {e}", self.program))
        })
    }
}
