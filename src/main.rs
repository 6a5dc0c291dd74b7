use std::process;
use std::sync::Arc;

use hijri_clock::config;
use hijri_clock::ingest::aladhan::AladhanClient;
use hijri_clock::logging::{self, Component};
use hijri_clock::router::PrayerRouter;
use hijri_clock::server;

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load()?;

    logging::init_logger(
        cfg.logging.min_level()?,
        cfg.logging.file.as_deref(),
        cfg.logging.timestamps,
    );
    logging::info(
        Component::System,
        None,
        &format!(
            "Hijri Clock API v{} (provider {}, timeout {}s)",
            env!("CARGO_PKG_VERSION"),
            cfg.provider.base_url,
            cfg.provider.timeout_secs
        ),
    );

    // The blocking client owns its own runtime; build it (and drop it) outside
    // of tokio.
    let provider = Arc::new(AladhanClient::new(&cfg.provider.base_url, cfg.provider.timeout())?);
    let router = PrayerRouter::new(provider.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(&cfg.bind_addr, router))?;
    drop(runtime);

    logging::info(Component::System, None, "Stopped");
    drop(provider);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
