pub mod ingest;
pub mod normalize;
pub mod store;

pub use ingest::{columns_for, csv_to_raws, items_to_csv};
pub use normalize::{IngestSource, MigrationStep, migrate, normalize, steps_for};
pub use store::{CollectionStore, StoreError};
