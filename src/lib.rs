//! # Paper Studio
//!
//! 根据上传的教材页面（PDF / 图片）生成结构化试卷，支持编辑、多套打乱与双模式导出
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（文件系统、无头浏览器 Page），只暴露能力
//! - `source_ingestor` - 并发读取源材料
//! - `PdfExporter` / `HtmlExporter` - 把视图导出为 PDF 或可打印 HTML
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `request_builder` - 出卷设置 + 源材料 → 生成请求
//! - `LlmService` - 调用生成服务
//! - `paper_assembler` - 返回结果 → `Paper`
//! - `VariantGenerator` - 分区内打乱生成套卷
//! - `renderer` / `html_writer` - 学生卷 / 教师卷视图
//! - `HistoryVault` - 有上限的历史记录
//!
//! ### ③ 流程层（Workflow）
//! - `GenerationFlow` - 忙碌标记、超时、凭证状态、进度事件、入库
//! - `EditingSession` - 修改题目并重算总分
//! - `VariantFlow` - 多套试卷顺序导出
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 一次完整出卷，管理浏览器资源
//! - `orchestrator/export_processor` - 单份试卷双模式导出
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Paper, Question, QuestionPatch, Section};
pub use orchestrator::App;
pub use utils::logging;
pub use workflow::{EditingSession, GenerationFlow, VariantFlow};
