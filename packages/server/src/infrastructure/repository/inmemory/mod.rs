pub mod room;

pub use room::{IdCollisionPolicy, InMemoryRoomRepository};
