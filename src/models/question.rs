use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 答案缺失时的占位符
pub const ANSWER_PLACEHOLDER: &str = "N/A";

/// 选择题选项标签，按固定顺序 A-D
pub const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// 单道选择题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqRecord {
    /// 题干
    pub question: String,
    /// 选项，A-D 四个键必须齐全记录才算有效
    pub options: BTreeMap<char, String>,
    /// 正确答案，解析失败时为 "N/A"
    pub answer: String,
}

impl McqRecord {
    /// 判断选项是否齐全（A-D 四个键都存在）
    pub fn is_complete(&self) -> bool {
        OPTION_LABELS.iter().all(|label| self.options.contains_key(label))
    }
}

impl std::fmt::Display for McqRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干以便显示（最多80个字符）
        let preview = if self.question.chars().count() > 80 {
            self.question.chars().take(80).collect::<String>() + "..."
        } else {
            self.question.clone()
        };
        write!(f, "{} [答案: {}]", preview, self.answer)
    }
}

/// 解析后的题目集合
///
/// 每个请求构造一次，之后不可变；各序列内部保持模型输出中的出现顺序。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSet {
    /// 选择题
    pub mcqs: Vec<McqRecord>,
    /// 简答题题干
    pub short: Vec<String>,
    /// 论述题题干
    pub long: Vec<String>,
}

impl QuestionSet {
    /// 三个序列是否全部为空（"未生成任何题目"的合法终态）
    pub fn is_empty(&self) -> bool {
        self.mcqs.is_empty() && self.short.is_empty() && self.long.is_empty()
    }

    /// 题目总数
    pub fn total(&self) -> usize {
        self.mcqs.len() + self.short.len() + self.long.len()
    }

    /// 论述题"需作答题数"，按"答 N 选 N-1"惯例：
    /// 多于一题时为 N-1，恰好一题时仍为 1
    pub fn long_must_answer(&self) -> usize {
        let total = self.long.len();
        if total > 1 {
            total - 1
        } else {
            total
        }
    }
}

/// 试卷元信息，全部字段独立可选，默认为空串
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamInfo {
    pub title: String,
    pub date: String,
    pub time: String,
    pub course_code: String,
    pub course_name: String,
    pub total_marks: String,
}

/// 区块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Mcq,
    Short,
    Long,
}

impl BlockKind {
    /// 区块在模型输出中的行首标记
    pub fn marker(self) -> &'static str {
        match self {
            BlockKind::Mcq => "## MCQ",
            BlockKind::Short => "## SHORT",
            BlockKind::Long => "## LONG",
        }
    }
}

/// 解析中间产物：一段被标记的模型输出
///
/// 只存在于解析过程中，不序列化、不落盘。
#[derive(Debug, Clone)]
pub struct RawBlock {
    pub kind: BlockKind,
    pub body: String,
}
