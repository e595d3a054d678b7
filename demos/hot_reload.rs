//! Example demonstrating selective hot-reload of server credentials.
//!
//! This example shows how to:
//! - Watch a properties file for changes
//! - Read reloadable keys from a lock-free live snapshot
//! - Subscribe to reload notifications
//!
//! Run with: cargo run --example hot_reload
//!
//! While running, edit demos/conf/server.conf. Changes to `pg.password` are
//! applied; changes to `http.bind.to` are logged and ignored.

use hotswap_props::prelude::*;
use hotswap_props::sources::{FileSource, PropertySource};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Hot Reload Example ===\n");

    let conf_root = std::path::Path::new("demos/conf");
    let config_path = conf_root.join("server.conf");
    if !config_path.exists() {
        std::fs::create_dir_all(conf_root).map_err(|e| ReloadError::Io {
            path: conf_root.to_path_buf(),
            source: e,
        })?;
        std::fs::write(
            &config_path,
            "http.bind.to=0.0.0.0:9000\npg.user=admin\npg.password=quest\n",
        )
        .map_err(|e| ReloadError::Io {
            path: config_path.clone(),
            source: e,
        })?;
        println!("Created {}", config_path.display());
    }

    // The server reads the file once at startup; the engine keeps it current
    let startup = FileSource::new(&config_path).load()?;
    let live = Arc::new(LiveProperties::new(startup));

    let reload_count = Arc::new(AtomicUsize::new(0));
    let reload_count_clone = Arc::clone(&reload_count);
    let _subscription = live.subscribe(move |snapshot| {
        let count = reload_count_clone.fetch_add(1, Ordering::SeqCst) + 1;
        println!("\n[Event] Configuration reloaded (reload #{}, {} keys)", count, snapshot.len());
    });

    let engine = ReloadEngine::builder()
        .with_conf_root(conf_root)
        .with_watch_strategy(WatchStrategy::Auto)
        .build(Arc::clone(&live))?;
    let (handle, join) = engine.spawn()?;

    println!("Watching: {}", config_path.display());
    println!("Reloadable keys: pg.user, pg.password, pg.readonly.*");
    println!("\nThe example exits after two minutes\n");

    for _ in 0..24 {
        std::thread::sleep(Duration::from_secs(5));

        println!("[Status] reloads: {}", reload_count.load(Ordering::SeqCst));
        println!(
            "  pg.user={:?} pg.password={:?}",
            live.value_of(PropertyKey::PgUser),
            live.value_of(PropertyKey::PgPassword)
        );
    }

    handle.close();
    let _ = join.join();
    Ok(())
}
