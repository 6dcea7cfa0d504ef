pub mod entity_ops;

pub use entity_ops::EntityOps;
