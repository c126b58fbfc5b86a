//! Domain model: regions, credential sets, orders and the ports the router talks through.

pub mod credentials;
pub mod order;
pub mod ports;
pub mod region;
pub mod resolver;
