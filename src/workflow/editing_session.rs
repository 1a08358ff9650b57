//! 编辑会话
//!
//! 会话独占一份试卷，所有修改都经过这里：合并字段后全量重算总分与总用时。
//! 从历史记录打开时复制一份，历史条目本身不会被修改。

use rand::Rng;
use tracing::{debug, info};

use crate::error::{AppResult, EditError};
use crate::models::{Paper, Question, QuestionPatch};
use crate::services::variant_generator::shuffle_sections;

/// 编辑会话
#[derive(Debug, Clone)]
pub struct EditingSession {
    paper: Paper,
}

impl EditingSession {
    /// 以一份新组装的试卷开始编辑
    pub fn new(mut paper: Paper) -> Self {
        paper.recompute_aggregates();
        Self { paper }
    }

    /// 从历史记录重新打开：编辑的是副本
    pub fn open_from_history(entry: &Paper) -> Self {
        info!("📂 重新打开历史试卷: {}", entry.title);
        Self::new(entry.clone())
    }

    pub fn paper(&self) -> &Paper {
        &self.paper
    }

    pub fn into_paper(self) -> Paper {
        self.paper
    }

    pub fn question(&self, section_index: usize, question_index: usize) -> AppResult<&Question> {
        let section_count = self.paper.sections.len();
        let section = self.paper.sections.get(section_index).ok_or(EditError::IndexOutOfRange {
            section_index,
            question_index,
            section_count,
            question_count: 0,
        })?;
        let question = section.questions.get(question_index).ok_or(EditError::IndexOutOfRange {
            section_index,
            question_index,
            section_count,
            question_count: section.questions.len(),
        })?;
        Ok(question)
    }

    /// 修改一道题：只替换补丁中给出的字段，然后全量重算
    ///
    /// 位置不存在时返回 `IndexOutOfRange`，试卷保持不变
    pub fn update_question(
        &mut self,
        section_index: usize,
        question_index: usize,
        patch: QuestionPatch,
    ) -> AppResult<&Paper> {
        let section_count = self.paper.sections.len();
        let section = self
            .paper
            .sections
            .get_mut(section_index)
            .ok_or(EditError::IndexOutOfRange {
                section_index,
                question_index,
                section_count,
                question_count: 0,
            })?;
        let question_count = section.questions.len();
        let question = section
            .questions
            .get_mut(question_index)
            .ok_or(EditError::IndexOutOfRange {
                section_index,
                question_index,
                section_count,
                question_count,
            })?;

        question.apply(patch);
        debug!(
            "已修改题目 {} (分区 {}, 第 {} 题)",
            question.id,
            section_index + 1,
            question_index + 1
        );

        self.paper.recompute_aggregates();
        debug!(
            "总分 {}, 预计总用时 {:?} 分钟",
            self.paper.total_marks, self.paper.estimated_total_time
        );
        Ok(&self.paper)
    }

    /// 打乱当前试卷每个分区内的题目顺序
    pub fn shuffle_questions<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Paper {
        shuffle_sections(&mut self.paper, rng);
        info!("🔀 已打乱题目顺序");
        &self.paper
    }
}
