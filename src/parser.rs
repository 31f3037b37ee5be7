//! 模型输出解析 - 核心模块
//!
//! 把模型返回的弱结构化文本解析为结构化题目集合。
//!
//! ## 解析策略
//!
//! 1. 词法扫描：先定位所有行首标记（`## MCQ` / `## SHORT` / `## LONG`），
//!    再按相邻标记位置切出区块体——区块是扁平顺序的，任何标记都会
//!    终止前一个区块，不存在嵌套
//! 2. 字段抽取：在区块内按标签切片（标签大小写不敏感、允许跨行）
//! 3. 尽力而为：单个区块缺字段只丢弃该区块并记日志，绝不中断整卷解析

use regex::RegexBuilder;
use tracing::{debug, warn};

use crate::models::question::{
    BlockKind, McqRecord, QuestionSet, RawBlock, ANSWER_PLACEHOLDER, OPTION_LABELS,
};
use crate::utils::logging::truncate_text;

/// 把整段模型输出解析为题目集合
///
/// 空输入或没有任何可识别标记时返回三个空序列，不报错——
/// "未生成任何题目"是合法终态，由渲染层负责呈现。
pub fn parse_questions(text: &str) -> QuestionSet {
    let blocks = scan_blocks(text);
    debug!("扫描到 {} 个区块", blocks.len());

    let mut set = QuestionSet::default();

    for block in &blocks {
        match block.kind {
            BlockKind::Mcq => match parse_mcq_block(&block.body) {
                Some(record) => set.mcqs.push(record),
                None => {
                    warn!(
                        "跳过不完整的选择题区块: {}",
                        truncate_text(block.body.trim(), 100)
                    );
                }
            },
            BlockKind::Short => match parse_question_label(&block.body) {
                Some(q) => set.short.push(q),
                None => {
                    warn!(
                        "跳过缺少题干标签的简答题区块: {}",
                        truncate_text(block.body.trim(), 100)
                    );
                }
            },
            BlockKind::Long => match parse_question_label(&block.body) {
                Some(q) => set.long.push(q),
                None => {
                    warn!(
                        "跳过缺少题干标签的论述题区块: {}",
                        truncate_text(block.body.trim(), 100)
                    );
                }
            },
        }
    }

    debug!(
        "解析完成: 选择题 {}, 简答题 {}, 论述题 {}",
        set.mcqs.len(),
        set.short.len(),
        set.long.len()
    );

    set
}

/// 词法扫描：把文本切成有序的 (类型, 区块体) 序列
///
/// 区块体从标记字面量之后开始，到下一个任意类型的标记行或文本末尾结束。
pub fn scan_blocks(text: &str) -> Vec<RawBlock> {
    // 第一遍：定位所有行首标记 (行起始偏移, 区块体起始偏移, 类型)
    let mut marks: Vec<(usize, usize, BlockKind)> = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let stripped = line.strip_suffix('\n').unwrap_or(line);
        // SHORT 在前避免任何前缀歧义，三个字面量本身互不为前缀
        for kind in [BlockKind::Short, BlockKind::Long, BlockKind::Mcq] {
            if stripped.starts_with(kind.marker()) {
                marks.push((offset, offset + kind.marker().len(), kind));
                break;
            }
        }
        offset += line.len();
    }

    // 第二遍：按相邻标记位置切出区块体
    let mut blocks = Vec::with_capacity(marks.len());
    for (i, &(_, body_start, kind)) in marks.iter().enumerate() {
        let body_end = marks
            .get(i + 1)
            .map(|&(next_start, _, _)| next_start)
            .unwrap_or(text.len());
        blocks.push(RawBlock {
            kind,
            body: text[body_start..body_end].to_string(),
        });
    }

    blocks
}

/// 解析单个选择题区块
///
/// 题干和 A-D 四个选项齐全才算有效；正确答案缺失不影响有效性，
/// 回落为 "N/A"。
fn parse_mcq_block(body: &str) -> Option<McqRecord> {
    let question = capture(body, r"Question:\s*(.*?)\s*[A-D]\)")?;
    if question.is_empty() {
        return None;
    }

    let mut options = std::collections::BTreeMap::new();
    let option_patterns = [
        ('A', r"A\)(.*?)\s*B\)"),
        ('B', r"B\)(.*?)\s*C\)"),
        ('C', r"C\)(.*?)\s*D\)"),
        // D 的终结符允许退化为区块末尾：缺少答案标签不应使整题无效
        ('D', r"D\)(.*?)\s*(?:Correct Answer:|$)"),
    ];
    for (label, pattern) in option_patterns {
        options.insert(label, capture(body, pattern)?);
    }
    debug_assert!(OPTION_LABELS.iter().all(|l| options.contains_key(l)));

    let answer = capture(body, r"Correct Answer:\s*(.*)")
        .unwrap_or_else(|| ANSWER_PLACEHOLDER.to_string());

    Some(McqRecord {
        question,
        options,
        answer,
    })
}

/// 抽取简答题/论述题题干：`Question:` 标签之后到区块末尾
fn parse_question_label(body: &str) -> Option<String> {
    capture(body, r"Question:(.*)")
}

/// 在区块内做一次标签切片
///
/// 标签大小写不敏感，`.` 允许匹配换行，返回首个捕获组去除首尾空白
/// 后的内容；不匹配时返回 None（匹配到空串仍是 Some("")）。
fn capture(body: &str, pattern: &str) -> Option<String> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .ok()?;
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "## MCQ\nQuestion: 2+2? A) 3 B) 4 C) 5 D) 6 Correct Answer: B\n## SHORT\nQuestion: Define energy.\n## LONG\nQuestion: Explain thermodynamics.\n";

    #[test]
    fn test_scan_blocks_flat_and_ordered() {
        let blocks = scan_blocks(WELL_FORMED);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::Mcq);
        assert_eq!(blocks[1].kind, BlockKind::Short);
        assert_eq!(blocks[2].kind, BlockKind::Long);
        // 任意标记终止前一个区块
        assert!(!blocks[0].body.contains("Define energy"));
        assert!(blocks[1].body.contains("Define energy"));
    }

    #[test]
    fn test_scan_blocks_empty_input() {
        assert!(scan_blocks("").is_empty());
        assert!(scan_blocks("没有任何标记的普通文本\n第二行").is_empty());
    }

    #[test]
    fn test_scan_blocks_marker_must_be_line_initial() {
        // 行中间出现的标记字样不算区块边界
        let text = "## MCQ\nQuestion: what is ## SHORT about? A) x B) y C) z D) w Correct Answer: A\n";
        let blocks = scan_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].body.contains("## SHORT about?"));
    }

    #[test]
    fn test_parse_example_scenario() {
        let set = parse_questions(WELL_FORMED);
        assert_eq!(set.mcqs.len(), 1);
        assert_eq!(set.short, vec!["Define energy.".to_string()]);
        assert_eq!(set.long, vec!["Explain thermodynamics.".to_string()]);

        let mcq = &set.mcqs[0];
        assert_eq!(mcq.question, "2+2?");
        assert_eq!(mcq.options[&'A'], "3");
        assert_eq!(mcq.options[&'B'], "4");
        assert_eq!(mcq.options[&'C'], "5");
        assert_eq!(mcq.options[&'D'], "6");
        assert_eq!(mcq.answer, "B");
        assert!(mcq.is_complete());
    }

    #[test]
    fn test_parse_mcq_multiline_fields() {
        let text = "## MCQ\nQuestion: 下列哪个是\n可再生能源?\nA) 煤炭\nB) 石油\nC) 太阳能\n发电\nD) 天然气\nCorrect Answer: C\n";
        let set = parse_questions(text);
        assert_eq!(set.mcqs.len(), 1);
        let mcq = &set.mcqs[0];
        // 跨行字段取匹配内容后整体去除首尾空白
        assert_eq!(mcq.question, "下列哪个是\n可再生能源?");
        assert_eq!(mcq.options[&'C'], "太阳能\n发电");
        assert_eq!(mcq.answer, "C");
    }

    #[test]
    fn test_parse_mcq_labels_case_insensitive() {
        let text = "## MCQ\nquestion: 1+1? a) 1 b) 2 c) 3 d) 4 correct answer: B\n";
        let set = parse_questions(text);
        assert_eq!(set.mcqs.len(), 1);
        assert_eq!(set.mcqs[0].question, "1+1?");
        assert_eq!(set.mcqs[0].answer, "B");
    }

    #[test]
    fn test_parse_mcq_missing_option_dropped() {
        // 缺选项 C：整个区块被丢弃，不报错
        let text = "## MCQ\nQuestion: 2+2? A) 3 B) 4 D) 6 Correct Answer: B\n";
        let set = parse_questions(text);
        assert!(set.mcqs.is_empty());
    }

    #[test]
    fn test_parse_mcq_missing_question_dropped() {
        let text = "## MCQ\nA) 3 B) 4 C) 5 D) 6 Correct Answer: B\n";
        let set = parse_questions(text);
        assert!(set.mcqs.is_empty());
    }

    #[test]
    fn test_parse_mcq_missing_answer_falls_back() {
        // 整个 "Correct Answer:" 标签缺失：题目仍然有效，答案回落占位符
        let text = "## MCQ\nQuestion: 2+2? A) 3 B) 4 C) 5 D) 6\n## MCQ\nQuestion: 3+3? A) 5 B) 6 C) 7 D) 8 Correct Answer: B\n";
        let set = parse_questions(text);
        assert_eq!(set.mcqs.len(), 2);
        assert_eq!(set.mcqs[0].answer, ANSWER_PLACEHOLDER);
        assert_eq!(set.mcqs[0].options[&'D'], "6");
        assert_eq!(set.mcqs[1].answer, "B");
    }

    #[test]
    fn test_parse_mcq_answer_label_present_but_empty() {
        // 标签匹配但内容为空：得到空串而非占位符（与标签完全缺失不同）
        let text = "## MCQ\nQuestion: 2+2? A) 3 B) 4 C) 5 D) 6 Correct Answer:\n";
        let set = parse_questions(text);
        assert_eq!(set.mcqs.len(), 1);
        assert_eq!(set.mcqs[0].answer, "");
    }

    #[test]
    fn test_parse_short_long_missing_label_dropped() {
        let text = "## SHORT\n这里没有题干标签\n## LONG\nQuestion: 论述牛顿三定律。\n";
        let set = parse_questions(text);
        assert!(set.short.is_empty());
        assert_eq!(set.long, vec!["论述牛顿三定律。".to_string()]);
    }

    #[test]
    fn test_parse_preserves_order_within_kind() {
        let text = "## SHORT\nQuestion: 第一题\n## MCQ\nQuestion: q A) 1 B) 2 C) 3 D) 4 Correct Answer: A\n## SHORT\nQuestion: 第二题\n## SHORT\nQuestion: 第三题\n";
        let set = parse_questions(text);
        assert_eq!(
            set.short,
            vec![
                "第一题".to_string(),
                "第二题".to_string(),
                "第三题".to_string()
            ]
        );
        assert_eq!(set.mcqs.len(), 1);
    }

    #[test]
    fn test_parse_empty_blob_is_valid_terminal_state() {
        let set = parse_questions("");
        assert!(set.is_empty());
        assert_eq!(set.total(), 0);
    }

    #[test]
    fn test_malformed_block_never_aborts_remaining_exam() {
        // 第一个区块残缺，后面的区块必须照常解析
        let text = "## MCQ\n完全是垃圾内容\n## MCQ\nQuestion: ok? A) 1 B) 2 C) 3 D) 4 Correct Answer: D\n## SHORT\nQuestion: 简述光合作用。\n";
        let set = parse_questions(text);
        assert_eq!(set.mcqs.len(), 1);
        assert_eq!(set.mcqs[0].question, "ok?");
        assert_eq!(set.short.len(), 1);
    }

    #[test]
    fn test_must_answer_counts() {
        let mut set = QuestionSet::default();
        assert_eq!(set.long_must_answer(), 0);
        set.long.push("一".to_string());
        assert_eq!(set.long_must_answer(), 1);
        set.long.push("二".to_string());
        assert_eq!(set.long_must_answer(), 1);
        set.long.push("三".to_string());
        assert_eq!(set.long_must_answer(), 2);
    }
}
