//! Create a sample SQLite database with demo projection data

use pv_data::StoreConfig;
use rusqlite::Connection;

/// Rows the generator writes.
const SAMPLE_ROWS: usize = 2000;

/// Cluster centers the sample projections scatter around.
const CLUSTERS: [(f64, f64, &str); 4] = [
    (-4.0, 3.0, "north-west"),
    (3.5, 2.5, "north-east"),
    (-2.5, -3.5, "south-west"),
    (4.0, -2.0, "south-east"),
];

/// Configuration the generator falls back to when the environment is
/// missing: `./data/projections.db`, table `pca_records`.
pub fn default_config() -> StoreConfig {
    StoreConfig::new("data", "projections", "pca_records")
}

/// Create and populate the sample database; returns the row count.
pub fn create_sample_database(config: &StoreConfig) -> anyhow::Result<usize> {
    std::fs::create_dir_all(&config.root)?;
    let conn = Connection::open(config.database_path())?;

    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};
         CREATE TABLE {table} (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             Xpca REAL,
             Ypca REAL,
             label TEXT,
             cluster TEXT,
             score REAL
         );",
        table = config.collection
    ))?;

    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} (Xpca, Ypca, label, cluster, score) VALUES (?1, ?2, ?3, ?4, ?5)",
        config.collection
    ))?;

    let mut rng = 42u32;
    for i in 0..SAMPLE_ROWS {
        let (cx, cy, cluster) = CLUSTERS[i % CLUSTERS.len()];

        // Two jitter terms per axis give a rough bell shape around the
        // cluster center.
        let x = cx
            + (random_float(&mut rng) - 0.5) * 3.0
            + (random_float(&mut rng) - 0.5) * 1.5;
        let y = cy
            + (random_float(&mut rng) - 0.5) * 3.0
            + (random_float(&mut rng) - 0.5) * 1.5;

        let label = format!("SAMPLE_{:04}", i + 1);
        let score = random_float(&mut rng) * 100.0;

        stmt.execute((x, y, label, cluster, score))?;
    }

    tracing::info!(
        "sample database created at {} ({} rows)",
        config.database_path().display(),
        SAMPLE_ROWS
    );

    Ok(SAMPLE_ROWS)
}

fn random_float(seed: &mut u32) -> f64 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    (*seed as f64) / (u32::MAX as f64)
}
