pub mod replay;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use replay::handle_replay;
use touch2pad::config::GestureConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replay a recorded touch trace and print the synthesized mouse reports
    Replay {
        /// Path to a YAML touch trace
        trace: PathBuf,
        /// Path to a YAML gesture configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the default gesture configuration
    Config,
}

pub async fn main_cli(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(cmd) = args.cmd else {
        log::info!("No command given, see --help");
        return Ok(());
    };

    match cmd {
        Commands::Replay { trace, config } => {
            let config = match config {
                Some(path) => GestureConfig::from_yaml_path(path)?,
                None => GestureConfig::default(),
            };
            handle_replay(trace, config).await?
        }
        Commands::Config => print!("{}", GestureConfig::default().to_yaml()?),
    }

    Ok(())
}
