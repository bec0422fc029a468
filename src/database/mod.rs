// # Database Module
//
// Connection pooling, schema migrations, entity models, and store
// operations for users and movies.

pub mod connection;
pub mod models;
pub mod store;
