use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "psdhtml")]
#[command(
    version,
    about = "PSD to HTML5 banner converter - turn layered design documents into HTML, CSS and images",
    long_about = "PSD to HTML5 banner converter\n\nModes:\n- convert: convert every design document in a ZIP archive into <output-dir>/<name>/{index.html,css/style.css,images/}.\n- inspect: print the classified layer tree of every document without writing anything.\n\nLayers are recognised by name (bg, logo, logoArea, shape, contentArea, mainHeading, subHeading, offer, contactWrap, cta, hero, hero 2, ...).\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for output dir/click-through URL/standard sizes; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every design document in a ZIP archive
    Convert {
        #[arg(value_name = "ARCHIVE", help = "ZIP archive containing <name>.psd.json documents")]
        archive: PathBuf,

        #[arg(
            long,
            value_name = "DIR",
            help = "Directory receiving one folder per document (default: output)"
        )]
        output_dir: Option<PathBuf>,

        #[arg(
            long,
            value_name = "URL",
            help = "Target of the call-to-action button (default: https://www.example.com)"
        )]
        click_through_url: Option<String>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Print the classified layer tree of every document
    Inspect {
        #[arg(value_name = "ARCHIVE", help = "ZIP archive containing <name>.psd.json documents")]
        archive: PathBuf,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
