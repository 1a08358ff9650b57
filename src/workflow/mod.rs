//! 流程层（Workflow Layer）
//!
//! - `generation_flow` - 一次生成：请求 → 生成 → 组装 → 入库
//! - `editing_session` - 一份试卷的编辑会话
//! - `variant_flow` - 多套试卷的顺序导出

pub mod editing_session;
pub mod generation_flow;
pub mod variant_flow;

pub use editing_session::EditingSession;
pub use generation_flow::{GenerationFlow, GenerationStage, StatusEvent};
pub use variant_flow::{VariantAttempt, VariantFlow, VariantReport};
