use std::{error::Error, io};

use clap::Parser;
use log::{error, info};
use trace_analyzer::{cli::Commands, error::exit_code, Cli};

fn main() {
    let cli = Cli::parse();

    let (args, config) = match cli.command {
        Commands::Analyze(args) => {
            if let Err(e) = args.init_log() {
                eprintln!("Failed to initialize log. Cause: {:?}", e);
                std::process::exit(exit_code::INVALID_CONFIGURATION);
            }
            match args.create_config() {
                Ok(config) => (args, config),
                Err(e) => {
                    eprintln!(
                        "Failed to create configuration from the specified arguments. Cause: {:?}",
                        e
                    );
                    std::process::exit(exit_code::INVALID_CONFIGURATION);
                }
            }
        }

        Commands::BuildInfo => {
            display_built_info();
            return;
        }
    };
    info!("Analyzing with {:?}", args);

    if let Err(e) = trace_analyzer::analyze(&config, io::stdout().lock()) {
        error!("Analysis of `{}` failed: {}", config.source, e);
        eprintln!("{}", e);
        let mut cause = e.source();
        while let Some(e) = cause {
            eprintln!("  Caused by: {}", e);
            cause = e.source();
        }
        std::process::exit(e.exit_code());
    }
}

// Additively prints the built info to both stdout and log.
macro_rules! build_info {
    ($($st:tt)*) => {
        println!($($st)*);
        info!($($st)*);
    };
}

/// Display the built information.
///
/// The build information is additively printed to both stdout and log.
fn display_built_info() {
    build_info!(
        "Trace Analyzer v{}, built for {} by {}.",
        trace_analyzer::built_info::PKG_VERSION,
        trace_analyzer::built_info::TARGET,
        trace_analyzer::built_info::RUSTC_VERSION
    );

    let built_time = built::util::strptime(trace_analyzer::built_info::BUILT_TIME_UTC);
    build_info!(
        "Built with profile \"{}\", on {} ({} days ago).",
        trace_analyzer::built_info::PROFILE,
        built_time.with_timezone(&built::chrono::offset::Local),
        (built::chrono::offset::Utc::now() - built_time).num_days(),
    );

    if let (Some(v), Some(dirty), Some(hash)) = (
        trace_analyzer::built_info::GIT_VERSION,
        trace_analyzer::built_info::GIT_DIRTY,
        trace_analyzer::built_info::GIT_COMMIT_HASH,
    ) {
        build_info!(
            "Built from git `{}`, commit {}; the working directory was \"{}\".",
            v,
            hash,
            if dirty { "dirty" } else { "clean" }
        );
    }
}
