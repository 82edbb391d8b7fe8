use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use engage_tools::config::ConverterConfig;
use engage_tools::merge::MergeMode;
use engage_tools::sync;
use engage_tools::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;
    match cli.command {
        Command::Convert(args) => execute_convert(args),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn execute_convert(args: ConvertArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }

    let config = args.resolve_config()?;

    match (args.from, args.to) {
        (SourceFormat::Excel, TargetFormat::Json) => {
            sync::excel_to_json(&args.input, &args.output, &config).map(|_| ())
        }
        (SourceFormat::Xml, TargetFormat::Json) => {
            sync::xml_to_json(&args.input, &args.output, &config).map(|_| ())
        }
        (SourceFormat::Json, TargetFormat::Excel) => sync::json_to_excel(&args.input, &args.output),
        (SourceFormat::Xml, TargetFormat::Excel) => {
            sync::xml_to_excel(&args.input, &args.output, &config)
        }
        (SourceFormat::Excel, TargetFormat::Excel) => {
            sync::excel_to_excel(&args.input, &args.output, &config)
        }
        _ => Err(ToolError::UnsupportedConversion {
            from: args.from.to_string(),
            to: args.to.to_string(),
        }),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert alert-routing workbooks and rule packages into Engage delivery flows."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert between a source representation and a target representation.
    Convert(ConvertArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Source representation.
    #[arg(long, value_enum)]
    from: SourceFormat,

    /// Input file path.
    #[arg(long)]
    input: PathBuf,

    /// Target representation.
    #[arg(long, value_enum)]
    to: TargetFormat,

    /// Output path: a directory for JSON, a file for Excel.
    #[arg(long)]
    output: PathBuf,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How rows with identical delivery behaviour are merged.
    #[arg(long, value_enum)]
    merge_mode: Option<MergeModeArg>,

    /// Legacy switch: true merges across config groups, false disables merging.
    #[arg(long)]
    merge_flows: Option<bool>,
}

impl ConvertArgs {
    fn resolve_config(&self) -> Result<ConverterConfig> {
        let mut config = match &self.config {
            Some(path) => ConverterConfig::load(path)?,
            None => ConverterConfig::default(),
        };
        if let Some(mode) = self.merge_mode {
            config.merge_mode = mode.into();
            config.merge_flows = None;
        }
        if let Some(merge) = self.merge_flows {
            config.merge_flows = Some(merge);
        }
        Ok(config)
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SourceFormat {
    Excel,
    Xml,
    Json,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Excel => write!(f, "xlsx"),
            SourceFormat::Xml => write!(f, "xml"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TargetFormat {
    Json,
    Excel,
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetFormat::Json => write!(f, "json"),
            TargetFormat::Excel => write!(f, "xlsx"),
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MergeModeArg {
    None,
    ByConfigGroup,
    AcrossConfigGroup,
}

impl From<MergeModeArg> for MergeMode {
    fn from(kind: MergeModeArg) -> Self {
        match kind {
            MergeModeArg::None => MergeMode::None,
            MergeModeArg::ByConfigGroup => MergeMode::ByConfigGroup,
            MergeModeArg::AcrossConfigGroup => MergeMode::AcrossConfigGroup,
        }
    }
}
