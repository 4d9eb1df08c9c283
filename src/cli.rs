use crate::logging::LogFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Interactively search a documentation symbol catalog", long_about = None)]
pub struct Cli {
    /// Catalog payload: a JSON object or a script assigning one
    pub catalog: PathBuf,
    /// TOML file overriding search settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Prefix for result links (overrides the config file)
    #[arg(short, long)]
    pub base_url: Option<String>,
    /// Print results as HTML list items
    #[arg(long)]
    pub html: bool,
    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
