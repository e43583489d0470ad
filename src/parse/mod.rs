pub mod backup;
pub mod csv_decoder;
pub mod csv_encoder;

pub use backup::{read_backup, write_backup};
pub use csv_decoder::decode_csv;
pub use csv_encoder::{encode_cell, encode_csv};
