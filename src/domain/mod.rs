// Domain layer: core models and ports (interfaces) shared by the run controller,
// the downloader and the adapters.

pub mod model;
pub mod ports;
