use std::path::PathBuf;
use std::process::ExitCode;

use psdhtml_lib::{convert_archive, ConvertError, PsdOutput};
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{format_effective_config, load_config, resolve_convert_config, ConvertOverrides};

/// Run the convert command.
pub fn run_convert(
    config_path: Option<PathBuf>,
    archive: PathBuf,
    overrides: ConvertOverrides,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref())
        .and_then(|cfg| resolve_convert_config(cfg, overrides, config_path.as_deref()))
    {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    debug!("{}", format_effective_config(&config, config_path.as_deref()));

    info!(archive = %archive.display(), "converting archive");
    let body = match convert_archive(&archive, &config) {
        Ok(out) => out,
        Err(err) => return render_error(err, format, output),
    };
    let failed = body.results.values().filter(|r| !r.success).count();
    info!(
        documents = body.results.len(),
        failed,
        output_dir = %config.output_dir.display(),
        "conversion finished"
    );

    if let Err(err) = write_output(&PsdOutput::Convert(body), format, output.clone()) {
        return render_error(
            ConvertError::Io(std::io::Error::other(err.to_string())),
            format,
            output,
        );
    }
    ExitCode::SUCCESS
}
