pub mod query_store;

pub use query_store::GraphqlQuery;
