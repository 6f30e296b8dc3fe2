use monotrace::MonotraceError;

pub fn report_error(err: &MonotraceError) {
    match err {
        MonotraceError::ToolNotFound { program, source } => {
            eprintln!("Could not run `{program}`: {source}");
            eprintln!();
            eprintln!("Install potrace, point --potrace-program at it,");
            eprintln!("or pick another engine with --engine contour.");
        }
        _ => {
            eprintln!("{err}");
        }
    }
}
