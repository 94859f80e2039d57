// Domain layer: value types and ports (interfaces). The search core depends only on this.

pub mod model;
pub mod ports;
