/// Entity name constants to ensure consistency across the codebase.
/// These map each entity to its source table and destination table.

// Entity names (used in CLI and reports)
pub const USERS_ENTITY: &str = "users";
pub const CARDS_ENTITY: &str = "cards";
pub const STORES_ENTITY: &str = "stores";
pub const PRODUCTS_ENTITY: &str = "products";
pub const ORDERS_ENTITY: &str = "orders";
pub const DATE_EVENTS_ENTITY: &str = "date_events";

// Destination tables in the centralised store
pub const DIM_USERS: &str = "dim_users";
pub const DIM_CARD_DETAILS: &str = "dim_card_details";
pub const DIM_STORE_DETAILS: &str = "dim_store_details";
pub const DIM_PRODUCTS: &str = "dim_products";
pub const ORDERS_TABLE: &str = "orders_table";
pub const DIM_DATE_TIMES: &str = "dim_date_times";

// Directory where every extracted table is cached as CSV
pub const CSV_CACHE_DIR: &str = "csv_files";

/// Get all supported entity names, in pipeline order
pub fn supported_entities() -> Vec<&'static str> {
    vec![
        USERS_ENTITY,
        CARDS_ENTITY,
        STORES_ENTITY,
        PRODUCTS_ENTITY,
        ORDERS_ENTITY,
        DATE_EVENTS_ENTITY,
    ]
}
