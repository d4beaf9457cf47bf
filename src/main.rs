mod charts;
mod cli;
mod dataset;
mod error;
mod filter;
mod fmt;
mod models;
mod pipeline;
mod session;
mod settings;
mod tui;

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: bool, interactive: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("TILLVIEW_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    if interactive {
        // The dashboard owns the terminal; logs go to a file or nowhere.
        let _ = std::fs::create_dir_all(settings::config_dir());
        if let Ok(file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(settings::log_path())
        {
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        return;
    }
    let _ = builder.with_writer(std::io::stderr).try_init();
}

fn main() {
    let cli = Cli::parse();
    let data = cli.data.as_deref();
    let command = cli.command.unwrap_or(Commands::Dashboard);

    init_logging(cli.verbose, matches!(command, Commands::Dashboard));

    let result = match command {
        Commands::Dashboard => cli::dashboard::run(data),
        Commands::Summary {
            locations,
            gender,
            format,
        } => cli::summary::run(data, &locations, &gender, format),
        Commands::Options => cli::options::run(data),
        Commands::Load { path } => cli::load::run(&path),
        Commands::Demo { rows, seed, output } => cli::demo::run(rows, seed, output.as_deref()),
        Commands::Status => cli::status::run(data),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tillview", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
