mod app;
mod config;
mod emit;
mod error;
mod font;
mod preview;

use clap::Parser;

fn run() -> Result<(), error::FontgenError> {
    let args = config::Args::parse();
    let cfg = config::Config::resolve(args)?;
    log::set_max_level(cfg.log_level.as_level_filter());

    let out = app::run(&cfg)?;
    log::info!(
        "Done: '{}' and '{}'.",
        out.table.display(),
        out.preview.display()
    );
    Ok(())
}

fn main() {
    // Install logger immediately, then set runtime max level from config after resolving it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    log::set_max_level(log::LevelFilter::Warn);

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
