//! 试卷渲染 - 核心模块
//!
//! 分两段：`layout` 负责确定性的排版（可单测），`pdf` 负责把排好的
//! 行画成 PDF 字节。

pub mod layout;
pub mod pdf;

use tracing::debug;

use crate::error::AppError;
use crate::models::question::{ExamInfo, QuestionSet};

/// 渲染整份试卷为 PDF 字节
pub fn render_exam(set: &QuestionSet, exam_info: Option<&ExamInfo>) -> Result<Vec<u8>, AppError> {
    let lines = layout::compose(set, exam_info);
    debug!(
        "排版完成: {} 行, 预计 {} 页",
        lines.len(),
        pdf::page_count(&lines)
    );
    pdf::emit(&lines)
}
