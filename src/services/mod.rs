/// Admin editor operations over the station table.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Route graph rendering and integrity checks.
pub mod graph;
/// Health check service.
pub mod health_service;
/// Participant session actions.
pub mod hunt_service;
/// Station QR payload encoding and decoding.
pub mod qr;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Clue video link helpers.
pub mod video;
