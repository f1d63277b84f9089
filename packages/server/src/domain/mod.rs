//! ドメイン層
//!
//! エンティティ・値オブジェクト・ファクトリと、Infrastructure 層が実装する
//! インターフェース（Repository, RoomPersistence, MessagePusher, SessionRegistry）を定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod message_pusher;
pub mod persistence;
pub mod policy;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{Annotation, AnnotationShape, Room};
pub use error::{MessagePushError, PersistenceError, RepositoryError, ValueObjectError};
pub use event::RelayEvent;
pub use factory::{
    AnnotationDraft, AnnotationFactory, AnnotationIdFactory, MIN_RESTRICTED_VERTICES,
    ROOM_CODE_CAPACITY, RoomCodeAllocator,
};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use persistence::RoomPersistence;
pub use policy::{BoundRoomPolicy, RoomAccessPolicy, TrustPayloadPolicy};
pub use repository::RoomRepository;
pub use session::{SessionBinding, SessionRegistry};
pub use value_object::{
    AnnotationId, ConnectionId, DeviceRole, MotionData, Position, ROOM_CODE_LENGTH, RoomCode,
    Severity, Timestamp, Vertex,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
