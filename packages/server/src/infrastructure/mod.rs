//! Infrastructure 層
//!
//! ドメイン層が定義する trait の具体的な実装を提供します。
//!
//! - `dto`: ワイヤ形式・永続化形式とドメインモデルの変換
//! - `message_pusher`: WebSocket によるイベント送信
//! - `persistence`: ルームレコードの永続化
//! - `repository`: ルーム表の実装
//! - `session`: 接続 ↔ ルームの対応表

pub mod dto;
pub mod message_pusher;
pub mod persistence;
pub mod repository;
pub mod session;
