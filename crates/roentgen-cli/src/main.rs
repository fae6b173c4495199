mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roentgen", about = "X-ray image viewing and processing tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show image file metadata
    Info(commands::info::InfoArgs),
    /// Convert a raw capture to a viewable image
    Convert(commands::convert::ConvertArgs),
    /// Apply the viewer's filter chain to an image
    Filter(commands::filter::FilterArgs),
    /// Bake saved annotations into an image
    Annotate(commands::annotate::AnnotateArgs),
    /// Print or save the default viewer configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Filter(args) => commands::filter::run(args),
        Commands::Annotate(args) => commands::annotate::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
