// Domain layer: models, the exclusion set and ports. No I/O here.

pub mod exclusion;
pub mod model;
pub mod ports;
