use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tmpl_i18n::commands;
use tmpl_i18n::config::Config;
use tmpl_i18n::logging::{self, LogLevel};

#[derive(Parser)]
#[command(name = "i18n")]
#[command(author, version, about = "i18n tool", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity of progress output
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract i18n messages from templates
    Extract {
        /// Directory to scan for templates (overrides config)
        #[arg(long)]
        dir: Option<String>,

        /// JSON catalog output path, empty to skip (overrides config)
        #[arg(long)]
        out: Option<String>,

        /// Synthetic Go file for gotext extract/update (overrides config)
        #[arg(long = "gofile")]
        go_file: Option<String>,

        /// Package name for the generated Go file (overrides config)
        #[arg(long)]
        pkg: Option<String>,

        /// Template extensions, comma or space separated (overrides config)
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        ext: Option<Vec<String>>,

        /// Keep running and re-extract when templates change
        #[arg(short, long)]
        watch: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(level) = cli.log_level {
        logging::set_level(level);
    }

    match cli.command {
        Commands::Extract {
            dir,
            out,
            go_file,
            pkg,
            ext,
            watch,
        } => {
            let config = Config::load_or_default(cli.config.as_ref())?;
            let overrides = commands::extract::Overrides {
                dir,
                out,
                go_file,
                pkg,
                ext,
            };
            commands::extract::run(&config, overrides, watch)?;
        }
        Commands::Init { force } => {
            commands::init::run(cli.config.as_deref(), force)?;
        }
    }

    Ok(())
}
