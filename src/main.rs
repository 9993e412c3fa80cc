mod cli;
mod commands;
mod formatting;
mod logging;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_convert, run_inspect};
use settings::ConvertOverrides;

fn main() -> ExitCode {
    let args = cli::parse();
    logging::init(args.verbose);

    match args.command {
        Commands::Convert {
            archive,
            output_dir,
            click_through_url,
            format,
            output,
        } => run_convert(
            args.config,
            archive,
            ConvertOverrides {
                output_dir,
                click_through_url,
            },
            format,
            output,
        ),
        Commands::Inspect {
            archive,
            format,
            output,
        } => run_inspect(archive, format, output),
    }
}
