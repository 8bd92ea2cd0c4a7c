// Adapters layer: concrete implementations for external systems (page loading, storage).

pub mod http;
pub mod page;
pub mod storage;
