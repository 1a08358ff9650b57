//! 历史试卷库 - 业务能力层
//!
//! 有上限、最新在前的试卷历史，保存在单个 JSON 文件中
//!
//! - `add` 插入到最前并截断到上限，最旧的被淘汰
//! - `remove` 最多删除一份，id 不存在时不做任何事
//! - 条目是只读快照，重新打开需要新建编辑会话
//! - 文件缺失或损坏时视为空库，只记录警告

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::Paper;

/// 历史试卷库
#[derive(Debug)]
pub struct HistoryVault {
    path: PathBuf,
    capacity: usize,
    entries: Vec<Paper>,
}

impl HistoryVault {
    /// 从文件加载历史记录
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let mut entries = read_entries(&path);
        if entries.len() > capacity {
            debug!("历史记录 {} 份超过上限 {}，截断", entries.len(), capacity);
            entries.truncate(capacity);
        }
        info!("📚 已加载历史试卷 {} 份 (上限 {})", entries.len(), capacity);

        Self {
            path,
            capacity,
            entries,
        }
    }

    /// 新增一份试卷（插入到最前）
    pub fn add(&mut self, paper: Paper) -> AppResult<()> {
        debug!("保存试卷到历史记录: {}", paper.id);
        self.entries.insert(0, paper);
        if self.entries.len() > self.capacity {
            let evicted = self.entries.split_off(self.capacity);
            for old in &evicted {
                debug!("历史记录已满，淘汰: {} ({})", old.id, old.title);
            }
        }
        self.persist()
    }

    /// 按 id 删除一份试卷，返回是否删除
    pub fn remove(&mut self, id: &str) -> AppResult<bool> {
        match self.entries.iter().position(|p| p.id == id) {
            Some(index) => {
                let removed = self.entries.remove(index);
                info!("🗑️ 已从历史记录删除: {}", removed.title);
                self.persist()?;
                Ok(true)
            }
            None => {
                debug!("历史记录中不存在 {}", id);
                Ok(false)
            }
        }
    }

    /// 当前历史记录（最新在前）
    pub fn list(&self) -> &[Paper] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Paper> {
        self.entries.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 同步写回文件
    fn persist(&self) -> AppResult<()> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e.into()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::file_write_failed(parent.display().to_string(), e)
                })?;
            }
        }

        fs::write(&self.path, json)
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))
    }
}

fn read_entries(path: &Path) -> Vec<Paper> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("历史记录文件不可读 ({}): {}，视为空库", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Paper>>(&content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("⚠️ 历史记录文件已损坏 ({}): {}，视为空库", path.display(), e);
            Vec::new()
        }
    }
}
