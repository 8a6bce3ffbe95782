//! SiltDB server binary.
//!
//! Configuration comes from environment variables with sensible defaults:
//!
//! ```text
//! SILT_ADDR            listen address          (default: 127.0.0.1:4000)
//! SILT_WAL_PATH        WAL file path           (default: "wal.log")
//! SILT_DATA_DIR        SSTable directory       (default: "data")
//! SILT_MEMTABLE_LIMIT  keys that trigger flush (default: 100)
//! SILT_BLOOM_BYTES     filter bitset size      (default: 1024)
//! SILT_WAL_SYNC        fsync every WAL append  (default: "false")
//! RUST_LOG             tracing filter          (e.g. "info")
//! ```

use anyhow::Result;
use engine::{Config, Engine};
use server::serve;
use std::net::TcpListener;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr = env_or("SILT_ADDR", "127.0.0.1:4000");
    let config = Config {
        wal_path: env_or("SILT_WAL_PATH", "wal.log").into(),
        data_dir: env_or("SILT_DATA_DIR", "data").into(),
        memtable_limit: env_or("SILT_MEMTABLE_LIMIT", "100").parse().unwrap_or(100),
        bloom_bytes: env_or("SILT_BLOOM_BYTES", "1024").parse().unwrap_or(1024),
        wal_sync: env_or("SILT_WAL_SYNC", "false").parse().unwrap_or(false),
    };

    info!(
        %addr,
        memtable_limit = config.memtable_limit,
        bloom_bytes = config.bloom_bytes,
        "siltdb starting"
    );

    let engine = Arc::new(Engine::open(config)?);
    let listener = TcpListener::bind(&addr)?;
    serve(listener, engine)
}
