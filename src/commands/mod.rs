mod bitmap;
mod convert;
mod trace;
mod utils;

use monotrace::MonotraceResult;

use crate::cli::{Cli, Commands};

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> MonotraceResult<()> {
    dispatch(cli.command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(command: Commands) -> MonotraceResult<()> {
    match command {
        Commands::Bitmap(cmd) => bitmap::run(cmd),
        Commands::Trace(cmd) => trace::run(cmd),
        Commands::Convert(cmd) => convert::run(cmd),
    }
}
