/// Body Explorer entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use body_explorer::ViewerConfig;

    let config = ViewerConfig::load_from_default_path().unwrap_or_default();

    // RUST_LOG overrides the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(config.preferences.log_level.to_level_filter().as_str()),
    )
    .init();

    if let Some(path) = ViewerConfig::default_path() {
        log::debug!("Config path: {:?}", path);
    }
    match config.to_json() {
        Ok(json) => log::debug!("Effective configuration:\n{}", json),
        Err(e) => log::warn!("Failed to serialize configuration: {}", e),
    }

    if let Err(e) = body_explorer::native::run(config) {
        log::error!("Application error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
