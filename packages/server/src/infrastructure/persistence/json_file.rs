//! JSON ファイルによるルームの永続化
//!
//! ```text
//! <data_dir>/rooms/<code>.json
//! ```
//!
//! 書き込みは一時ファイルに書いてから rename するため、
//! 途中でプロセスが落ちても壊れたレコードは残りません。
//!
//! 読み込めなかったレコードは `<code>.json.corrupt` に退避します。
//! 同じコードが新しいルームに割り当てられても、壊れたレコードは上書きされません。

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::{
    domain::{PersistenceError, Room, RoomCode, RoomPersistence},
    infrastructure::dto::persistence::RoomRecord,
};

const ROOMS_DIR: &str = "rooms";
const RECORD_EXTENSION: &str = "json";
const CORRUPT_EXTENSION: &str = "corrupt";

/// ルームごとに 1 つの JSON ファイルへ書き込む永続化実装
#[derive(Debug, Clone)]
pub struct JsonFileRoomPersistence {
    rooms_dir: PathBuf,
}

impl JsonFileRoomPersistence {
    /// # Arguments
    ///
    /// * `data_dir` - データディレクトリ（配下の `rooms/` にレコードを置く）
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            rooms_dir: data_dir.as_ref().join(ROOMS_DIR),
        }
    }

    pub fn rooms_dir(&self) -> &Path {
        &self.rooms_dir
    }

    fn record_path(&self, code: &RoomCode) -> PathBuf {
        self.rooms_dir
            .join(format!("{}.{}", code.as_str(), RECORD_EXTENSION))
    }

    async fn read_record(path: &Path) -> Result<Option<Room>, PersistenceError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let parsed = serde_json::from_slice::<RoomRecord>(&bytes)
            .map_err(|e| e.to_string())
            .and_then(|record| Room::try_from(record).map_err(|e| e.to_string()));
        match parsed {
            Ok(room) => Ok(Some(room)),
            Err(reason) => {
                Self::quarantine(path).await;
                Err(PersistenceError::CorruptedRecord(
                    path.display().to_string(),
                    reason,
                ))
            }
        }
    }

    /// 壊れたレコードを `<code>.json.corrupt` に移す
    async fn quarantine(path: &Path) {
        let aside = path.with_extension(format!("{}.{}", RECORD_EXTENSION, CORRUPT_EXTENSION));
        match tokio::fs::rename(path, &aside).await {
            Ok(()) => tracing::warn!("Moved corrupted room record to {}", aside.display()),
            Err(e) => tracing::error!(
                "Failed to move corrupted room record {}: {}",
                path.display(),
                e
            ),
        }
    }
}

#[async_trait]
impl RoomPersistence for JsonFileRoomPersistence {
    async fn save(&self, room: &Room) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.rooms_dir).await?;

        let record = RoomRecord::from(room.clone());
        let json = serde_json::to_vec_pretty(&record)?;

        let path = self.record_path(&room.code);
        let tmp_path = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        tracing::debug!("Room '{}' saved to {}", room.code, path.display());
        Ok(())
    }

    async fn load(&self, code: &RoomCode) -> Result<Option<Room>, PersistenceError> {
        let path = self.record_path(code);
        match Self::read_record(&path).await? {
            Some(room) if &room.code != code => {
                Self::quarantine(&path).await;
                Err(PersistenceError::CorruptedRecord(
                    code.to_string(),
                    format!("record holds room '{}'", room.code),
                ))
            }
            other => Ok(other),
        }
    }

    async fn load_all(&self) -> Result<Vec<Room>, PersistenceError> {
        let mut entries = match tokio::fs::read_dir(&self.rooms_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rooms = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            // 壊れたレコードが 1 件あっても他のルームは復元する
            match Self::read_record(&path).await {
                Ok(Some(room)) => rooms.push(room),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping room record {}: {}", path.display(), e),
            }
        }

        rooms.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rooms)
    }
}
