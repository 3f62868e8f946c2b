use clap::{Args, Parser, Subcommand};
use config::{Configuration, ReportOptions};
use log::info;
use std::path::Path;

use crate::error::exit_code;

#[derive(Debug, Parser, Clone)]
#[command(author, about, version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// The trace to analyze: a file path, an `http(s)` URL or the name of a bundled trace.
    ///
    /// Default value: `kahadb.log`
    #[arg(env = "KAHADB_TRACE")]
    source: Option<String>,

    /// Suppress stage lines that retired no data file.
    #[arg(long, env = "KAHADB_CONCISE")]
    concise: bool,

    /// Print the timestamp of every full candidate set.
    #[arg(long, env = "KAHADB_TIME")]
    time: bool,

    /// Print candidate set sizes of every checkpoint line.
    #[arg(long, env = "KAHADB_DEBUG")]
    debug: bool,

    /// Append the ids of retired data files to every stage line.
    #[arg(long, env = "KAHADB_VERBOSE")]
    verbose: bool,

    /// Path to the configuration file in YAML format.
    #[arg(long, env = "KAHADB_CONFIG")]
    config: Option<String>,

    /// Path to the log4rs configuration file in YAML format.
    ///
    /// Without it, logs go to stderr at the level named by `KAHADB_LOG_LEVEL`.
    #[arg(long, env = "KAHADB_LOG_CONFIG")]
    log: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Report data file usage per GC scan step and destination.
    Analyze(AnalyzeArgs),
    BuildInfo,
}

impl AnalyzeArgs {
    pub fn init_log(&self) -> anyhow::Result<()> {
        let config = match self.log.as_deref() {
            Some(config) => config,
            None => return crate::logging::init_console_log(),
        };
        let config_path = Path::new(config);

        if !config_path.exists() {
            eprintln!("Log configuration file {} does not exist", config);
            // Exit with errno set
            std::process::exit(exit_code::SOURCE_NOT_FOUND);
        };

        if !config_path.is_file() {
            eprintln!("{} is not a file", config);
            // Exit with errno set
            std::process::exit(exit_code::INVALID_CONFIGURATION);
        }

        log4rs::init_file(config_path, Default::default())?;
        info!("Log initialized");
        Ok(())
    }

    /// Build the immutable configuration handed to the analyzer.
    ///
    /// Values of the configuration file are the base. A source given on the command line
    /// replaces it, and a report flag given on the command line turns the option on.
    pub fn create_config(&self) -> anyhow::Result<Configuration> {
        let mut configuration = match &self.config {
            Some(path) => Configuration::from_file(Path::new(path))?,
            None => Configuration::default(),
        };

        if let Some(source) = &self.source {
            configuration.source = source.clone();
        }

        configuration.report.merge(&ReportOptions {
            concise: self.concise,
            time: self.time,
            debug: self.debug,
            verbose: self.verbose,
        });

        configuration.check_and_apply()?;
        Ok(configuration)
    }
}
