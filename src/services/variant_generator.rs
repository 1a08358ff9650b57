//! 套卷生成 - 业务能力层
//!
//! 为试卷生成带标签的 A/B/C 套卷：每个分区内部独立打乱题目顺序，
//! 不跨分区移动题目，不改变分区顺序

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::Paper;

/// 默认套卷标签
pub const DEFAULT_SET_LABELS: [&str; 3] = ["Set A", "Set B", "Set C"];

/// 在每个分区内部打乱题目顺序（Fisher-Yates）
pub fn shuffle_sections<R: Rng + ?Sized>(paper: &mut Paper, rng: &mut R) {
    for section in paper.sections.iter_mut() {
        section.questions.shuffle(rng);
    }
}

/// 套卷生成器
///
/// 随机源由调用方注入，测试中可传入固定种子
pub struct VariantGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> VariantGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// 生成一套试卷：深拷贝、打标签、分区内打乱，原试卷不变
    pub fn make_variant(&mut self, paper: &Paper, label: &str) -> Paper {
        let mut variant = paper.clone();
        variant.set_label = Some(label.to_string());
        shuffle_sections(&mut variant, &mut self.rng);
        debug!("已生成套卷 {} ({} 道题)", label, variant.question_count());
        variant
    }

    /// 按标签顺序生成全部套卷
    pub fn make_variants(&mut self, paper: &Paper, labels: &[String]) -> Vec<Paper> {
        labels
            .iter()
            .map(|label| self.make_variant(paper, label))
            .collect()
    }
}
