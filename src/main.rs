use clap::Parser;

use sky_viewer::cli::CliArgs;
use sky_viewer::config::ViewerConfig;
use sky_viewer::error::ViewerError;

fn main() {
    let args = CliArgs::parse();

    let mut config = match args.config.as_deref().map(ViewerConfig::load) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        None => ViewerConfig::default(),
    };
    config.apply_cli_overrides(&args);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Err(e) = pollster::block_on(sky_viewer::app::run(config)) {
        report(&e);
        std::process::exit(1);
    }
}

fn report(e: &ViewerError) {
    log::error!("{e}");
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        log::error!("  caused by: {cause}");
        source = cause.source();
    }
}
