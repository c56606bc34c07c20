// Domain layer: core models and ports (interfaces) for stores, sinks and scheduled jobs.

pub mod model;
pub mod ports;
