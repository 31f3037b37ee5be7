//! 版面排布 - 渲染核心
//!
//! 把题目集合 + 试卷元信息排成一串物理行（文本、对齐、字体、行高），
//! 与 PDF 字节生成解耦，排版逻辑可以直接做单元测试。
//!
//! 版面固定：页眉两行（左右对齐成对出现）→ 居中大标题 → A/B/C 三个
//! 分区，每区居中区标题 + 居中副标题，题目编号在区内从 1 重新开始。

use crate::models::question::{ExamInfo, QuestionSet, OPTION_LABELS};

/// A4 页宽（毫米）
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 页高（毫米）
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// 左右/上下边距（毫米）
pub const MARGIN_MM: f64 = 15.0;
/// 正文可用宽度（毫米）
pub const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const PT_TO_MM: f64 = 0.352_778;
// Helvetica 平均字符宽度约 0.5 em，用于估算换行位置和居中偏移
const AVG_CHAR_WIDTH_EM: f64 = 0.5;

/// 字体样式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// 字号（pt）
    pub size: f64,
    pub bold: bool,
}

/// 页眉行样式
pub const STYLE_HEADER: TextStyle = TextStyle { size: 16.0, bold: true };
/// 大标题样式
pub const STYLE_TITLE: TextStyle = TextStyle { size: 18.0, bold: true };
/// 分区标题样式
pub const STYLE_SECTION: TextStyle = TextStyle { size: 16.0, bold: true };
/// 分区副标题样式
pub const STYLE_SUBHEADING: TextStyle = TextStyle { size: 14.0, bold: true };
/// 正文样式
pub const STYLE_BODY: TextStyle = TextStyle { size: 12.0, bold: false };

/// 对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// 行内容
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// 单段文本
    Text { text: String, align: Align },
    /// 同一基线上的左右对齐成对文本（页眉专用）
    Pair { left: String, right: String },
    /// 纯竖向留白
    Spacer,
}

/// 一条物理行：内容 + 样式 + 行高（毫米）
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub kind: LineKind,
    pub style: TextStyle,
    pub height: f64,
}

impl Line {
    fn text(text: impl Into<String>, align: Align, style: TextStyle, height: f64) -> Self {
        Self {
            kind: LineKind::Text {
                text: text.into(),
                align,
            },
            style,
            height,
        }
    }

    fn pair(left: impl Into<String>, right: impl Into<String>, style: TextStyle) -> Self {
        Self {
            kind: LineKind::Pair {
                left: left.into(),
                right: right.into(),
            },
            style,
            height: 10.0,
        }
    }

    fn spacer(height: f64) -> Self {
        Self {
            kind: LineKind::Spacer,
            style: STYLE_BODY,
            height,
        }
    }
}

/// 估算单个字符宽度（毫米）
fn char_width_mm(style: TextStyle) -> f64 {
    style.size * PT_TO_MM * AVG_CHAR_WIDTH_EM
}

/// 估算整段文本宽度（毫米），PDF 层据此计算居中/右对齐的起笔位置
pub fn text_width_mm(text: &str, style: TextStyle) -> f64 {
    text.chars().count() as f64 * char_width_mm(style)
}

/// 单行最多容纳的字符数
fn max_chars_per_line(style: TextStyle) -> usize {
    let n = (CONTENT_WIDTH_MM / char_width_mm(style)) as usize;
    n.max(1)
}

/// 贪心按词换行
///
/// 先按输入中已有的换行切段，再在边距内逐词填充；超长单词硬切，
/// 任何内容都不截断丢弃。
pub fn wrap_text(text: &str, style: TextStyle) -> Vec<String> {
    let limit = max_chars_per_line(style);
    let mut wrapped = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len > limit {
                wrapped.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if word_len > limit {
                // 超长单词：先结清当前行，再按行宽硬切
                if current_len > 0 {
                    wrapped.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(limit) {
                    let piece: String = chunk.iter().collect();
                    if chunk.len() == limit {
                        wrapped.push(piece);
                    } else {
                        current_len = chunk.len();
                        current = piece;
                    }
                }
                continue;
            }

            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }

        wrapped.push(current);
    }

    wrapped
}

/// 按正文样式输出一段可换行文本，每行行高 8mm（对应 fpdf 的 multi_cell）
fn push_body_text(lines: &mut Vec<Line>, text: &str) {
    for row in wrap_text(text, STYLE_BODY) {
        lines.push(Line::text(row, Align::Left, STYLE_BODY, 8.0));
    }
}

/// 输出一个分区的标题 + 副标题
fn push_section_heading(lines: &mut Vec<Line>, section: &str, subheading: &str) {
    lines.push(Line::text(section, Align::Center, STYLE_SECTION, 10.0));
    lines.push(Line::text(subheading, Align::Center, STYLE_SUBHEADING, 10.0));
    lines.push(Line::spacer(5.0));
}

/// 把题目集合排成物理行序列
///
/// 这是渲染的确定性核心：同样的输入永远得到同样的行序列。
pub fn compose(set: &QuestionSet, exam_info: Option<&ExamInfo>) -> Vec<Line> {
    let mut lines = Vec::new();

    // 页眉：日期/时间、试卷名/总分，各占一行，左右对齐在同一基线
    if let Some(info) = exam_info {
        lines.push(Line::pair(
            format!("Date: {}", info.date),
            format!("Time: {}", info.time),
            STYLE_HEADER,
        ));
        lines.push(Line::pair(
            format!("Exam: {}", info.title),
            format!("Total Marks: {}", info.total_marks),
            STYLE_HEADER,
        ));
        lines.push(Line::spacer(10.0));
    }

    lines.push(Line::text("Question Paper", Align::Center, STYLE_TITLE, 10.0));
    lines.push(Line::spacer(5.0));

    // ===== Section A: 选择题 =====
    push_section_heading(&mut lines, "Section A", "Multiple Choice Questions (MCQs)");

    if set.mcqs.is_empty() {
        // 选择题为空时必须显式声明，而不是静默省略分区
        lines.push(Line::text(
            "No MCQs generated.",
            Align::Left,
            STYLE_BODY,
            10.0,
        ));
        lines.push(Line::spacer(5.0));
    }
    for (idx, mcq) in set.mcqs.iter().enumerate() {
        push_body_text(&mut lines, &format!("{}. {}", idx + 1, mcq.question));
        lines.push(Line::spacer(1.0));
        for label in OPTION_LABELS {
            if let Some(option) = mcq.options.get(&label) {
                push_body_text(&mut lines, &format!("{}) {}", label, option));
            }
        }
        lines.push(Line::spacer(2.0));
    }

    // ===== Section B: 简答题 =====
    // 注意与 Section A 的不对称：这里为空时没有兜底行
    push_section_heading(&mut lines, "Section B", "Short Answer Questions - 2 Marks");

    for (idx, question) in set.short.iter().enumerate() {
        push_body_text(&mut lines, &format!("{}. {}", idx + 1, question));
        lines.push(Line::spacer(2.0));
    }

    // ===== Section C: 论述题 =====
    push_section_heading(&mut lines, "Section C", "Long Answer Questions");

    if !set.long.is_empty() {
        push_body_text(
            &mut lines,
            &format!("How many questions: {}", set.long.len()),
        );
        push_body_text(
            &mut lines,
            &format!("How many need to answer: {}", set.long_must_answer()),
        );
        lines.push(Line::spacer(5.0));
    }
    for (idx, question) in set.long.iter().enumerate() {
        push_body_text(&mut lines, &format!("{}. {}", idx + 1, question));
        lines.push(Line::spacer(2.0));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::McqRecord;
    use std::collections::BTreeMap;

    fn mcq(question: &str, opts: [&str; 4], answer: &str) -> McqRecord {
        let mut options = BTreeMap::new();
        for (label, text) in OPTION_LABELS.iter().zip(opts) {
            options.insert(*label, text.to_string());
        }
        McqRecord {
            question: question.to_string(),
            options,
            answer: answer.to_string(),
        }
    }

    /// 拍平所有文本内容，便于断言
    fn all_text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|line| match &line.kind {
                LineKind::Text { text, .. } => Some(text.clone()),
                LineKind::Pair { left, right } => Some(format!("{} | {}", left, right)),
                LineKind::Spacer => None,
            })
            .collect()
    }

    fn position_of(texts: &[String], needle: &str) -> usize {
        texts
            .iter()
            .position(|t| t.contains(needle))
            .unwrap_or_else(|| panic!("未找到: {}", needle))
    }

    #[test]
    fn test_wrap_text_respects_margins() {
        let long = "word ".repeat(200);
        let rows = wrap_text(&long, STYLE_BODY);
        assert!(rows.len() > 1);
        let limit = max_chars_per_line(STYLE_BODY);
        for row in &rows {
            assert!(row.chars().count() <= limit);
        }
        // 不截断：所有词都还在
        let rejoined = rows.join(" ");
        assert_eq!(rejoined.split_whitespace().count(), 200);
    }

    #[test]
    fn test_wrap_text_hard_breaks_overlong_word() {
        let word = "x".repeat(500);
        let rows = wrap_text(&word, STYLE_BODY);
        assert!(rows.len() > 1);
        let total: usize = rows.iter().map(|r| r.chars().count()).sum();
        assert_eq!(total, 500);
    }

    #[test]
    fn test_header_only_with_exam_info() {
        let set = QuestionSet::default();
        let with_header = compose(&set, Some(&ExamInfo::default()));
        let without = compose(&set, None);

        assert!(matches!(with_header[0].kind, LineKind::Pair { .. }));
        assert!(all_text(&with_header)[0].starts_with("Date:"));
        assert!(all_text(&with_header)[1].starts_with("Exam:"));
        // 没有元信息时第一行直接是大标题
        assert_eq!(
            without[0].kind,
            LineKind::Text {
                text: "Question Paper".to_string(),
                align: Align::Center,
            }
        );
    }

    #[test]
    fn test_empty_set_emits_no_mcq_line_only() {
        let texts = all_text(&compose(&QuestionSet::default(), None));
        assert!(texts.iter().any(|t| t == "No MCQs generated."));
        // Section B/C 没有兜底行，也没有论述题统计行
        assert!(!texts.iter().any(|t| t.contains("How many questions")));
        assert!(!texts.iter().any(|t| t.contains("How many need to answer")));
        // 三个分区标题都在
        for heading in ["Section A", "Section B", "Section C"] {
            assert!(texts.iter().any(|t| t == heading));
        }
    }

    #[test]
    fn test_no_mcq_line_absent_when_mcqs_exist() {
        let set = QuestionSet {
            mcqs: vec![mcq("2+2?", ["3", "4", "5", "6"], "B")],
            ..Default::default()
        };
        let texts = all_text(&compose(&set, None));
        assert!(!texts.iter().any(|t| t.contains("No MCQs generated")));
        assert!(texts.iter().any(|t| t.contains("1. 2+2?")));
        for expected in ["A) 3", "B) 4", "C) 5", "D) 6"] {
            assert!(texts.iter().any(|t| t.contains(expected)));
        }
    }

    #[test]
    fn test_long_summary_single_question_boundary() {
        let set = QuestionSet {
            long: vec!["Explain thermodynamics.".to_string()],
            ..Default::default()
        };
        let texts = all_text(&compose(&set, None));
        assert!(texts.iter().any(|t| t == "How many questions: 1"));
        // 恰好一题时必答数仍是 1，不是 0
        assert!(texts.iter().any(|t| t == "How many need to answer: 1"));
    }

    #[test]
    fn test_long_summary_n_minus_one() {
        let set = QuestionSet {
            long: vec!["一".to_string(), "二".to_string(), "三".to_string()],
            ..Default::default()
        };
        let texts = all_text(&compose(&set, None));
        assert!(texts.iter().any(|t| t == "How many questions: 3"));
        assert!(texts.iter().any(|t| t == "How many need to answer: 2"));
    }

    #[test]
    fn test_numbering_restarts_per_section() {
        let set = QuestionSet {
            mcqs: vec![
                mcq("q1", ["a", "b", "c", "d"], "A"),
                mcq("q2", ["a", "b", "c", "d"], "B"),
            ],
            short: vec!["s1".to_string()],
            long: vec!["l1".to_string()],
        };
        let texts = all_text(&compose(&set, None));
        assert!(texts.iter().any(|t| t.contains("2. q2")));
        assert!(texts.iter().any(|t| t.contains("1. s1")));
        assert!(texts.iter().any(|t| t.contains("1. l1")));
    }

    #[test]
    fn test_round_trip_ordering_preserved() {
        let raw = "## MCQ\nQuestion: 2+2? A) 3 B) 4 C) 5 D) 6 Correct Answer: B\n## SHORT\nQuestion: Define energy.\n## SHORT\nQuestion: Define power.\n## LONG\nQuestion: Explain thermodynamics.\n";
        let set = crate::parser::parse_questions(raw);
        let texts = all_text(&compose(&set, None));

        // 每道题的文本和每个选项的文本都出现在输出里
        for expected in [
            "2+2?",
            "A) 3",
            "B) 4",
            "C) 5",
            "D) 6",
            "Define energy.",
            "Define power.",
            "Explain thermodynamics.",
        ] {
            assert!(
                texts.iter().any(|t| t.contains(expected)),
                "输出缺少: {}",
                expected
            );
        }
        // 分区内保持原始顺序
        assert!(position_of(&texts, "Define energy.") < position_of(&texts, "Define power."));
        assert!(position_of(&texts, "2+2?") < position_of(&texts, "Define energy."));
    }

    #[test]
    fn test_example_scenario_section_c() {
        // 恰好一道论述题：仍然输出 "1" 的必答统计行
        let raw = "## MCQ\nQuestion: 2+2? A) 3 B) 4 C) 5 D) 6 Correct Answer: B\n## SHORT\nQuestion: Define energy.\n## LONG\nQuestion: Explain thermodynamics.\n";
        let set = crate::parser::parse_questions(raw);
        let texts = all_text(&compose(&set, None));
        assert!(texts.iter().any(|t| t == "How many need to answer: 1"));
        let mcq_lines: Vec<_> = texts.iter().filter(|t| t.contains(". 2+2?")).collect();
        assert_eq!(mcq_lines.len(), 1);
    }
}
