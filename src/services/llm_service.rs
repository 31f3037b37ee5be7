//! LLM 出题服务 - 业务能力层
//!
//! 只负责"调用模型生成试卷文本"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;

/// 出题能力接口
///
/// 编排层只依赖这个接口，测试时可以注入固定文本的假实现，
/// 解析/渲染核心无需任何网络依赖即可验证。
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// 发送拼好的提示词，返回模型的原始文本输出
    ///
    /// 只尝试一次，不重试；失败由调用方降级处理。
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// 按模型输出契约拼接提示词
///
/// 输出契约（区块标记、字段标签）必须与解析器的扫描语法保持一致。
pub fn build_prompt(source_text: &str, num_mcqs: u32, num_short: u32, num_long: u32) -> String {
    format!(
        r###"
You are an AI assistant. Generate a professional exam paper from the text below:

Text: {source_text}

Requirements:
1. Generate exactly {num_mcqs} MCQs, each with 4 options (A-D) and correct answer.
2. Generate exactly {num_short} short answer questions (2 marks each).
3. Generate exactly {num_long} long answer questions.

Output format:
- Each MCQ must start with "## MCQ"
- Each short answer must start with "## SHORT"
- Each long answer must start with "## LONG"

Example:

## MCQ
Question: <question text>
A) option A
B) option B
C) option C
D) option D
Correct Answer: <A/B/C/D>

## SHORT
Question: <short answer question text>

## LONG
Question: <long answer question text>

Repeat blocks to match the number of questions requested.
"###
    )
}

/// LLM 出题服务
///
/// 职责：
/// - 调用 LLM API 生成试卷文本
/// - 只处理单次请求，不出现 QuestionSet
/// - 不关心流程顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 出题服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }
}

#[async_trait]
impl GenerationPort for LlmService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.chars().count());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content("You are an AI assistant that writes exam papers.")
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.3)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}
