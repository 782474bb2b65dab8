pub mod resource_index;
pub mod resource_key;

pub use resource_index::IndexResource;
pub use resource_key::KeyResource;
