mod isolation;
mod leasing;
mod queries;
mod transactions;

pub use isolation::isolation;
pub use leasing::leasing;
pub use queries::queries;
pub use transactions::{nested_transactions, root_commit, usage_errors};

use log::LevelFilter;
use moor::{Database, Driver};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run every driver-generic suite against the given database.
///
/// Sessions are single-task by contract: overlapping unsynchronized calls on
/// one session are unsupported and deliberately not exercised here.
pub async fn execute_tests<D: Driver>(database: &Database<D>) {
    queries(database).await;
    leasing(database).await;
    nested_transactions(database).await;
    root_commit(database).await;
    usage_errors(database).await;
    isolation(database).await;
}
