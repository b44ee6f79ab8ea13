use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ghscout")]
#[command(bin_name = "ghscout")]
#[command(version)]
#[command(about = "Search GitHub accounts, browse their repositories and read READMEs")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Write a diagnostics log under ~/.config/ghscout/diagnostics"
    )]
    pub diagnostics: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Run environment and configuration checks")]
    Doctor,
}
