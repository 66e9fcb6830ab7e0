//! Pool gauges exported through the default Prometheus registry

use once_cell::sync::Lazy;
use prometheus::{register_int_gauge_vec, IntGaugeVec};
use sqlx::PgPool;

static DB_POOL_CONNECTIONS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "devcommunity_db_pool_connections",
        "PostgreSQL pool connections by state (idle, in_use, max)",
        &["service", "state"]
    )
    .expect("failed to register devcommunity_db_pool_connections")
});

pub(crate) fn update_pool_metrics(pool: &PgPool, service: &str) {
    let idle = pool.num_idle() as i64;
    let in_use = pool.size() as i64 - idle;
    let max = pool.options().get_max_connections() as i64;

    for (state, value) in [("idle", idle), ("in_use", in_use), ("max", max)] {
        DB_POOL_CONNECTIONS
            .with_label_values(&[service, state])
            .set(value);
    }
}
