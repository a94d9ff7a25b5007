#[macro_export]
macro_rules! include_res {
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Tables, index and the twenty seeded exercises. Safe to run on every start.
pub const SCHEMA: &str = include_res!(str, "/schema.sql");
