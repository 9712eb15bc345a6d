use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::config::{validate_weight, Config};

#[derive(Parser, Debug)]
#[command(name = "pdf-similarity")]
#[command(version)]
#[command(about = "Compare two PDF documents through a similarity analysis service")]
pub struct Args {
    /// First PDF document
    #[arg(required_unless_present = "completions")]
    pub file1: Option<PathBuf>,

    /// Second PDF document
    #[arg(required_unless_present = "completions")]
    pub file2: Option<PathBuf>,

    /// Weight of text similarity against handwriting similarity, in [0, 1]
    #[arg(long, short, value_parser = parse_weight)]
    pub weight: Option<f64>,

    /// Root URL of the comparison service (overrides config and environment)
    #[arg(long)]
    pub server: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where to write the HTML report (defaults to a timestamped file in report_dir)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Skip writing the HTML report
    #[arg(long)]
    pub no_report: bool,

    /// Print the raw comparison result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,
}

fn parse_weight(s: &str) -> Result<f64, String> {
    let weight: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    validate_weight(weight).map_err(|e| e.to_string())
}

impl Args {
    /// Fold command-line overrides into a loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(weight) = self.weight {
            config.weight_text = weight;
        }
    }
}
