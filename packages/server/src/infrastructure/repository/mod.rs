pub mod inmemory;

pub use inmemory::{IdCollisionPolicy, InMemoryRoomRepository};
