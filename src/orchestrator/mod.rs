//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源管理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `pipeline` - 完整流水线
//! - 管理应用生命周期（初始化、运行）
//! - 持有 Browser 与导出器
//! - 读取设置与源材料，委托 GenerationFlow 生成
//! - 输出全局统计信息
//!
//! ### `export_processor` - 单份试卷导出
//! - 学生卷 / 教师卷各导出一次
//! - PDF 失败时改用直接打印
//!
//! ## 层次关系
//!
//! ```text
//! pipeline (一次完整出卷)
//!     ↓
//! export_processor (一份试卷的两种模式)
//!     ↓
//! workflow (GenerationFlow / VariantFlow / EditingSession)
//!     ↓
//! services (能力层：request / assemble / render / vault)
//!     ↓
//! infrastructure (基础设施：源文件、浏览器、导出器)
//! ```

pub mod export_processor;
pub mod pipeline;

// 重新导出主要类型
pub use export_processor::{export_both_modes, ExportStats};
pub use pipeline::App;
