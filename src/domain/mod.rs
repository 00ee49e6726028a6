// Domain layer: wire types, the headless page model and the ports the
// pipeline components plug into.

pub mod model;
pub mod ports;
