pub mod diesel_pool;
pub mod in_memory;
pub mod store;

pub use diesel_pool::{
    check_diesel_health, create_diesel_pool, mask_connection_string, DieselDatabaseConfig,
    DieselPool, PoolHealth,
};
pub use in_memory::InMemoryStore;
pub use store::PgStore;
