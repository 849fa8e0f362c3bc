// Domain layer: entities, the status state machine, request/response shapes and ports.

pub mod dto;
pub mod model;
pub mod ports;
pub mod status;
