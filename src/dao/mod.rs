/// Database model definitions for station records.
pub mod models;
/// Normalisation of loosely-shaped station rows into [`models::StationEntity`].
pub mod records;
/// Station storage backends and the [`station_store::StationStore`] abstraction.
pub mod station_store;
/// Storage abstraction layer errors.
pub mod storage;
