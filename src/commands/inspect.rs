use std::path::PathBuf;
use std::process::ExitCode;

use psdhtml_lib::{inspect_archive, ConvertError, PsdOutput};
use tracing::info;

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};

/// Run the inspect command.
pub fn run_inspect(archive: PathBuf, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    info!(archive = %archive.display(), "inspecting archive");
    let body = match inspect_archive(&archive) {
        Ok(out) => out,
        Err(err) => return render_error(err, format, output),
    };
    if let Err(err) = write_output(&PsdOutput::Inspect(body), format, output.clone()) {
        return render_error(
            ConvertError::Io(std::io::Error::other(err.to_string())),
            format,
            output,
        );
    }
    ExitCode::SUCCESS
}
