// Domain layer: mapping model, transaction records and ports (interfaces).

pub mod defaults;
pub mod mapping;
pub mod model;
pub mod ports;
pub mod transaction;
