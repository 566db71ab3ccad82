use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    log::info!("jitterbug {} starting", env!("CARGO_PKG_VERSION"));

    if let Err(err) = jitterbug::app::run() {
        log::error!("fatal: {err}");
        std::process::exit(1);
    }
}
