pub mod fs_store;
pub mod memory_store;
pub mod object_store;

pub use fs_store::FsObjectStore;
pub use memory_store::MemoryObjectStore;
pub use object_store::{ObjectBody, ObjectStorage, PutOutcome, VersionToken};
