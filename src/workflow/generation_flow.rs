//! 生成流程 - 流程层
//!
//! 核心职责：定义"一次生成"的完整流程
//!
//! 流程顺序：
//! 1. 校验源文件 → 占用忙碌标记
//! 2. 构建请求 → 调用生成服务（带超时）
//! 3. 组装试卷 → 写入历史记录
//!
//! 每一步开始时发送一条 `StatusEvent`，失败时记录日志并原样返回错误

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, GenerationError};
use crate::models::{GeneratorSettings, Paper, SourceFile};
use crate::services::{assemble, build_request, ContentGenerator, HistoryVault};

/// 生成阶段
///
/// 每个阶段对应流程中实际执行的一步
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    /// 构建请求
    Ingesting,
    /// 等待生成服务返回
    Analyzing,
    /// 把返回结果整理为分区、题目与考点
    Mapping,
    /// 已写入历史记录
    Saved,
}

impl GenerationStage {
    pub fn message(self) -> &'static str {
        match self {
            GenerationStage::Ingesting => "Ingesting Content...",
            GenerationStage::Analyzing => "Analyzing Pedagogy...",
            GenerationStage::Mapping => "Mapping Syllabus...",
            GenerationStage::Saved => "Saved to History",
        }
    }
}

/// 进度事件
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub stage: GenerationStage,
    pub at: DateTime<Utc>,
}

/// 忙碌标记守卫，离开作用域时自动释放
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 生成流程
///
/// - 同一时间只允许一个生成请求
/// - 凭证失效时标记为未选择，等待调用方重新选择
/// - 不持有任何试卷状态，结果交给调用方和历史记录
pub struct GenerationFlow<G: ContentGenerator> {
    generator: G,
    timeout: Duration,
    busy: AtomicBool,
    credential_ready: AtomicBool,
    status_tx: Option<UnboundedSender<StatusEvent>>,
}

impl<G: ContentGenerator> GenerationFlow<G> {
    pub fn new(generator: G, timeout: Duration) -> Self {
        Self {
            generator,
            timeout,
            busy: AtomicBool::new(false),
            credential_ready: AtomicBool::new(true),
            status_tx: None,
        }
    }

    /// 按配置中的超时创建
    pub fn from_config(generator: G, config: &Config) -> Self {
        Self::new(generator, Duration::from_secs(config.generation_timeout_secs))
    }

    /// 订阅进度事件
    pub fn with_status_sender(mut self, tx: UnboundedSender<StatusEvent>) -> Self {
        self.status_tx = Some(tx);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn credential_ready(&self) -> bool {
        self.credential_ready.load(Ordering::Acquire)
    }

    /// 调用方重新选择凭证后调用
    pub fn mark_credential_selected(&self) {
        self.credential_ready.store(true, Ordering::Release);
        info!("🔑 已重新选择凭证");
    }

    /// 执行一次完整生成，成功后写入历史记录
    pub async fn generate(
        &self,
        sources: &[SourceFile],
        settings: &GeneratorSettings,
        vault: &mut HistoryVault,
    ) -> AppResult<Paper> {
        if sources.is_empty() {
            warn!("⚠️ 未选择任何源文件，不发起生成");
            return Err(AppError::configuration("至少需要上传一个源文件"));
        }

        let _guard = BusyGuard::acquire(&self.busy)
            .ok_or(AppError::Generation(GenerationError::Busy))?;

        info!("{}", "=".repeat(60));
        info!("🚀 开始生成试卷: {} ({} 个源文件)", settings.subject, sources.len());
        info!("{}", "=".repeat(60));

        let result = self.run(sources, settings, vault).await;
        match &result {
            Ok(paper) => info!(
                "✅ 试卷生成完成: {} ({} 道题, {} 分)",
                paper.title,
                paper.question_count(),
                paper.total_marks
            ),
            Err(e) if e.is_credential_error() => {
                self.credential_ready.store(false, Ordering::Release);
                warn!("🔑 凭证失效，需要重新选择: {}", e);
            }
            Err(e) => error!("❌ 试卷生成失败: {}", e),
        }
        result
    }

    async fn run(
        &self,
        sources: &[SourceFile],
        settings: &GeneratorSettings,
        vault: &mut HistoryVault,
    ) -> AppResult<Paper> {
        self.emit(GenerationStage::Ingesting);
        let request = build_request(settings, sources)?;

        self.emit(GenerationStage::Analyzing);
        let raw = tokio::time::timeout(self.timeout, self.generator.generate(&request))
            .await
            .map_err(|_| {
                AppError::Generation(GenerationError::Timeout {
                    seconds: self.timeout.as_secs(),
                })
            })??;

        self.emit(GenerationStage::Mapping);
        let paper = assemble(raw, settings)?;

        vault.add(paper.clone())?;
        self.emit(GenerationStage::Saved);

        Ok(paper)
    }

    fn emit(&self, stage: GenerationStage) {
        info!("⏳ {}", stage.message());
        if let Some(tx) = &self.status_tx {
            // 接收方已关闭时不影响生成
            let _ = tx.send(StatusEvent {
                stage,
                at: Utc::now(),
            });
        }
    }
}
