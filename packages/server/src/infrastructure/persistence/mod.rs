//! ルームの永続化実装
//!
//! - `json_file`: ルームごとに 1 つの JSON ファイルへ書き込む
//! - `noop`: 何も保存しない（`--data-dir` 未指定時）

pub mod json_file;
pub mod noop;

pub use json_file::JsonFileRoomPersistence;
pub use noop::NoopRoomPersistence;
