pub mod data_dir;
pub mod lock;
pub mod recovery;
pub mod seed;
pub mod storage;
