pub mod data_source_index;
pub mod data_source_key;
pub mod data_source_version;

pub use data_source_index::IndexDataSource;
pub use data_source_key::KeyDataSource;
pub use data_source_version::VersionDataSource;
