// Domain layer: payloads and ports (interfaces). Adapters live under crate::adapters.

pub mod model;
pub mod ports;
