pub mod postgres;
pub mod query_log;

pub use postgres::create_pool;
pub use query_log::{MemoryQueryLog, PgQueryLog, QueryLog};
