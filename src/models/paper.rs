use serde::{Deserialize, Serialize};

use crate::models::question::Question;

/// 试卷分区（例如 "Section A: MCQs"）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            questions,
        }
    }
}

/// 完整试卷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: String,
    /// 创建时间（Unix 毫秒）
    pub created_at: i64,
    pub title: String,
    pub subject: String,
    pub institution_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// 总分，按 u64 累加，单题分值再大也不会溢出
    pub total_marks: u64,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_total_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics_covered: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<String>,
    /// 套卷标签，例如 "Set A"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_label: Option<String>,
    pub sections: Vec<Section>,
}

impl Paper {
    /// 遍历全部题目（按分区顺序）
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// 所有题目的分值之和
    pub fn sum_marks(&self) -> u64 {
        self.questions().map(|q| u64::from(q.marks)).sum()
    }

    /// 所有题目预计用时之和
    pub fn sum_estimated_time(&self) -> u64 {
        self.questions().map(|q| u64::from(q.estimated_time)).sum()
    }

    /// 从头重新计算总分与总用时
    ///
    /// 每次修改后都全量重算，不做增量更新
    pub fn recompute_aggregates(&mut self) {
        self.total_marks = self.sum_marks();
        self.estimated_total_time = Some(self.sum_estimated_time());
    }

    /// 总分与总用时是否与题目一致
    pub fn aggregates_consistent(&self) -> bool {
        self.total_marks == self.sum_marks()
            && self
                .estimated_total_time
                .map_or(true, |t| t == self.sum_estimated_time())
    }
}
