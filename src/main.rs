use clap::Parser;
use log::{debug, info};

use doodleboard::{App, BoardStore, Cli, Config, Result};

fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logger(cli.verbose);
    info!("DoodleBoard starting up");

    let mut config = Config::default();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let mut store = BoardStore::new(config.clone());
    store.load()?;

    let mut app = App::new(store, config, cli.verbose);
    app.run(cli.command).await?;

    Ok(())
}
