// Domain layer: models and ports. Parsing, HTTP and file access live in adapters.

pub mod model;
pub mod ports;
