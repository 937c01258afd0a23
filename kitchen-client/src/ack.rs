//! 确认记录存储 - 操作员已确认的订单
//!
//! 以 JSON 文件保存 `order_id -> 确认时间 (Unix millis)`，重新加载看板时
//! 不会对已确认的订单再次报警。超过保留期的记录在加载和保存时清除。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use shared::OrderId;

use crate::error::ClientResult;

const HOUR_MILLIS: i64 = 60 * 60 * 1000;

/// 确认记录
#[derive(Debug, Clone)]
pub struct AckStore {
    path: Option<PathBuf>,
    retention_ms: i64,
    entries: HashMap<OrderId, i64>,
}

impl AckStore {
    /// 仅内存 (不持久化)
    pub fn in_memory(retention_hours: i64) -> Self {
        Self {
            path: None,
            retention_ms: retention_hours * HOUR_MILLIS,
            entries: HashMap::new(),
        }
    }

    /// 从文件加载，文件不存在时为空
    ///
    /// 损坏的文件被视为空记录 (记录警告)，不会阻止看板启动。
    pub fn load(path: impl Into<PathBuf>, retention_hours: i64, now: i64) -> ClientResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt acknowledgment file, starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        let mut store = Self {
            path: Some(path),
            retention_ms: retention_hours * HOUR_MILLIS,
            entries,
        };
        if store.evict_expired(now) > 0 {
            store.save()?;
        }
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_acknowledged(&self, id: OrderId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 只在内存中记录确认，持久化由调用方安排 (见 [`AckStore::save`])
    pub fn record(&mut self, id: OrderId, now: i64) {
        self.entries.insert(id, now);
        self.evict_expired(now);
    }

    /// 记录确认并立即持久化
    ///
    /// 内存中的记录总是生效，持久化失败时返回错误。
    pub fn acknowledge(&mut self, id: OrderId, now: i64) -> ClientResult<()> {
        self.record(id, now);
        self.save()
    }

    /// 清除过期记录，返回清除数量
    pub fn evict_expired(&mut self, now: i64) -> usize {
        let before = self.entries.len();
        let cutoff = now - self.retention_ms;
        self.entries.retain(|_, acked_at| *acked_at >= cutoff);
        before - self.entries.len()
    }

    /// 原子写入 (临时文件 + rename)
    ///
    /// 阻塞 I/O；异步上下文中应克隆后放到 `spawn_blocking` 里执行。
    pub fn save(&self) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(&self.entries)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn acknowledgments_survive_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acks.json");

        let mut store = AckStore::load(&path, 48, NOW).unwrap();
        assert!(store.is_empty());
        store.acknowledge(42, NOW).unwrap();
        store.acknowledge(7, NOW).unwrap();

        let reloaded = AckStore::load(&path, 48, NOW + 1000).unwrap();
        assert!(reloaded.is_acknowledged(42));
        assert!(reloaded.is_acknowledged(7));
        assert!(!reloaded.is_acknowledged(1));
        assert!(!dir.path().join("acks.tmp").exists());
    }

    #[test]
    fn old_entries_are_evicted_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acks.json");

        let mut store = AckStore::load(&path, 48, NOW).unwrap();
        store.acknowledge(1, NOW - 49 * HOUR_MILLIS).unwrap();
        store.acknowledge(2, NOW - HOUR_MILLIS).unwrap();

        let reloaded = AckStore::load(&path, 48, NOW).unwrap();
        assert!(!reloaded.is_acknowledged(1));
        assert!(reloaded.is_acknowledged(2));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acks.json");
        fs::write(&path, "not json").unwrap();

        let store = AckStore::load(&path, 48, NOW).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn in_memory_store_never_touches_disk() {
        let mut store = AckStore::in_memory(48);
        store.acknowledge(3, NOW).unwrap();
        assert!(store.is_acknowledged(3));
        assert!(store.path().is_none());
    }
}
