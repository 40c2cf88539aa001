//! Jenga - native entry point
//!
//! Usage:
//!   jenga                          # standard tower, ./jenga.toml if present
//!   JENGA_VARIANT=gentle jenga     # slower physics, longer removal delay
//!   JENGA_CONFIG=tower.toml jenga  # explicit config file

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Jenga starting...");

    let config = jenga_app::HostConfig::load();
    config.print_summary();

    if let Err(e) = jenga_app::run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }

    log::info!("Jenga shutdown complete");
}

// The browser build starts from `web::start`
#[cfg(target_arch = "wasm32")]
fn main() {}
