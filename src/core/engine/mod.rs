pub mod traits;
pub mod registry;

pub use traits::{Generator, NestedLogits};
pub use registry::{
    is_available, load, register, EngineLoader, EngineRegistry, EngineUnavailable, REGISTRY,
};
