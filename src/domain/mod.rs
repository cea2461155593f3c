// Domain layer: property entities, default assumptions, and the ports the
// model is written against. No I/O here.

pub mod model;
pub mod ports;
