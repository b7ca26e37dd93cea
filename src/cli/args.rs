use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::classify::UnknownPolicy;
use crate::render::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: ProviderCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// Diagram a Google Cloud Terraform state file
    Gcp(DiagramArgs),
    /// Diagram an Oracle Cloud Terraform state file
    Oci(DiagramArgs),
}

impl ProviderCommand {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderCommand::Gcp(_) => "gcp",
            ProviderCommand::Oci(_) => "oci",
        }
    }

    pub fn args(&self) -> &DiagramArgs {
        match self {
            ProviderCommand::Gcp(args) | ProviderCommand::Oci(args) => args,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct DiagramArgs {
    /// Path to the Terraform state file
    #[arg(long, env = "TFDIAGRAM_STATE")]
    pub state: PathBuf,

    /// Output file name without extension
    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Path to configuration file (TOML)
    #[arg(long, env = "TFDIAGRAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// How to treat resource types missing from the provider table
    #[arg(long, value_enum)]
    pub unknown: Option<UnknownPolicy>,

    /// Print a node table and containment tree after rendering
    #[arg(long)]
    pub summary: bool,
}
