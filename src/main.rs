use bookmerge::{App, Cli, Config, Result};
use clap::Parser;
use log::{error, info};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }

    let pretty = cli.pretty_output(config.pretty_output);
    let app = App::new(config, cli.verbose, pretty);
    app.run(cli.command)
}

fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
