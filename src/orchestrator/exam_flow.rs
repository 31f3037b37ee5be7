//! 出卷流程 - 编排层
//!
//! 定义一次出卷请求的完整线性流程：
//! 校验数量 → 提取文本 → 生成（外部调用，仅一次）→ 保存原始输出
//! → 解析 → 渲染 → 保存 PDF
//!
//! 只有两种情况会把错误返回给调用方：没有可用输入文本、题目数量
//! 不是非负整数，且都发生在外部生成调用之前。其余失败一律就地降级：
//! 提取失败当作没有文本，生成失败当作空响应，残缺区块被解析器丢弃，
//! 最终都收敛成一份"可能偏空但始终良构"的题目集合。

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::question::QuestionSet;
use crate::models::request::{GenerateRequest, GenerateResponse};
use crate::parser::parse_questions;
use crate::renderer::render_exam;
use crate::services::{
    build_prompt, sanitize_base_name, ArtifactStore, DocumentKind, GenerationPort, TextExtractor,
    DEFAULT_BASE_NAME,
};
use crate::utils::logging::truncate_text;

/// 三个分区的请求数量
#[derive(Debug, Clone, Copy)]
struct QuestionCounts {
    mcqs: u32,
    short: u32,
    long: u32,
}

/// 出卷流程
///
/// 职责：
/// - 按固定顺序串起提取、生成、解析、渲染
/// - 把失败映射为面向调用方的响应
/// - 不持有请求间共享的可变状态（产物目录的同名覆盖是接受的竞态）
pub struct ExamFlow {
    extractor: TextExtractor,
    generation: Arc<dyn GenerationPort>,
    artifacts: ArtifactStore,
    verbose_logging: bool,
}

impl ExamFlow {
    /// 创建新的出卷流程
    pub fn new(config: &Config, generation: Arc<dyn GenerationPort>) -> Self {
        Self {
            extractor: TextExtractor::new(),
            generation,
            artifacts: ArtifactStore::new(&config.results_dir),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理一次出卷请求，同步顺序执行到底
    pub async fn run(&self, request: GenerateRequest) -> AppResult<GenerateResponse> {
        // ========== 阶段 1: 校验题目数量 ==========
        let counts = parse_counts(&request)?;
        info!(
            "📋 请求数量: 选择题 {}, 简答题 {}, 论述题 {}",
            counts.mcqs, counts.short, counts.long
        );

        // ========== 阶段 2: 提取输入文本 ==========
        let (source_text, base_name) = self.resolve_source_text(&request);
        let source_text = match source_text {
            Some(text) if !text.is_empty() => text,
            _ => {
                warn!("⚠️ 没有可用的输入文本，流程终止");
                return Err(AppError::no_usable_text());
            }
        };
        info!("📄 输入文本就绪: {} 字符", source_text.chars().count());

        // ========== 阶段 3: 外部生成调用（仅一次，不重试）==========
        info!("🤖 正在请求模型出卷...");
        let prompt = build_prompt(&source_text, counts.mcqs, counts.short, counts.long);
        let raw_response = match self.generation.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                // 生成失败与"模型什么都没产出"对下游不可区分
                warn!("⚠️ 模型调用失败，按空响应继续: {}", e);
                String::new()
            }
        };
        if self.verbose_logging {
            info!("模型输出预览: {}", truncate_text(&raw_response, 200));
        }

        // ========== 阶段 4: 保存模型原始输出 ==========
        let txt_filename = ArtifactStore::txt_filename(&base_name);
        self.artifacts.save_text(&txt_filename, &raw_response)?;

        // ========== 阶段 5: 解析 ==========
        let questions = parse_questions(&raw_response);
        log_parse_result(&questions);
        if self.verbose_logging {
            for (i, mcq) in questions.mcqs.iter().enumerate() {
                debug!("选择题 {}: {}", i + 1, mcq);
            }
        }

        // ========== 阶段 6: 渲染并保存 PDF ==========
        let pdf_filename = ArtifactStore::pdf_filename(&base_name);
        let pdf_bytes = render_exam(&questions, Some(&request.exam_info))?;
        self.artifacts.save_bytes(&pdf_filename, &pdf_bytes)?;

        info!("✅ 出卷完成: {} / {}", txt_filename, pdf_filename);

        Ok(GenerateResponse {
            questions,
            exam_info: request.exam_info,
            txt_filename,
            pdf_filename,
        })
    }

    /// 选取输入文本并派生产物基础标识
    ///
    /// 上传文件提取成功时文件文本优先于粘贴文本；文件不在扩展名
    /// 白名单内或提取失败则回落到粘贴文本。基础标识只在文件可用时
    /// 取自文件名。
    fn resolve_source_text(&self, request: &GenerateRequest) -> (Option<String>, String) {
        let fallback_text = || {
            if request.input_text.is_empty() {
                None
            } else {
                Some(request.input_text.clone())
            }
        };

        if let Some(file) = &request.file {
            match DocumentKind::from_filename(&file.filename) {
                Some(kind) => {
                    // 文件一旦被接受，基础标识就取自文件名，
                    // 提取失败只影响文本来源，不影响产物命名
                    let base = sanitize_base_name(&file.filename);
                    match self.extractor.extract(&file.bytes, kind) {
                        Some(text) if !text.is_empty() => return (Some(text), base),
                        _ => {
                            warn!("⚠️ 文件 {} 提取失败，回落到粘贴文本", file.filename);
                            return (fallback_text(), base);
                        }
                    }
                }
                None => {
                    warn!("⚠️ 文件 {} 不在扩展名白名单内，忽略", file.filename);
                }
            }
        }

        (fallback_text(), DEFAULT_BASE_NAME.to_string())
    }
}

/// 校验三个数量字段：缺省为 0，出现内容则必须是非负整数
fn parse_counts(request: &GenerateRequest) -> AppResult<QuestionCounts> {
    Ok(QuestionCounts {
        mcqs: parse_count("section_a_count", &request.mcq_count)?,
        short: parse_count("section_b_count", &request.short_count)?,
        long: parse_count("section_c_count", &request.long_count)?,
    })
}

fn parse_count(field: &str, raw: &str) -> AppResult<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| AppError::invalid_count(field, raw))
}

fn log_parse_result(set: &QuestionSet) {
    if set.is_empty() {
        // 合法终态：渲染层会显式呈现"未生成题目"
        info!("📭 未解析出任何题目");
    } else {
        info!(
            "📝 解析结果: 选择题 {}, 简答题 {}, 论述题 {}",
            set.mcqs.len(),
            set.short.len(),
            set.long.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_defaults_and_rejects() {
        assert_eq!(parse_count("f", "").unwrap(), 0);
        assert_eq!(parse_count("f", "  ").unwrap(), 0);
        assert_eq!(parse_count("f", "5").unwrap(), 5);
        assert_eq!(parse_count("f", " 12 ").unwrap(), 12);
        assert!(parse_count("f", "-1").is_err());
        assert!(parse_count("f", "3.5").is_err());
        assert!(parse_count("f", "abc").is_err());
    }
}
