//! # Exam Paper Generator
//!
//! 一个从文档/文本自动生成试卷 PDF 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构，数据单向流动：
//! 原始字节 → 纯文本 → 模型响应文本 → 结构化题目 → PDF 产物
//!
//! ### ① 纯函数核心（Parser / Renderer）
//! - `parser` - 把模型的弱结构化输出解析为 `QuestionSet`
//! - `renderer` - 把 `QuestionSet` + 元信息排版并画成 PDF
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次请求
//! - `TextExtractor` - pdf / docx / txt 文本提取能力
//! - `LlmService` - 模型出卷能力（`GenerationPort` 的默认实现）
//! - `ArtifactStore` - 产物读写能力
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/exam_flow` - 一次出卷请求的完整线性流程
//!
//! ### ④ 接入层（App）
//! - `app` - HTTP 路由与 multipart 装配，薄胶水
//!
//! ## 失败策略
//!
//! 只有"无输入文本"和"数量字段非法"两种失败会返回给调用方，
//! 其余失败全部就地降级为更空的结果，保证流水线走到底。

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod renderer;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::question::{ExamInfo, McqRecord, QuestionSet};
pub use models::request::{GenerateRequest, GenerateResponse, UploadedFile};
pub use orchestrator::ExamFlow;
pub use parser::parse_questions;
pub use renderer::render_exam;
pub use services::{GenerationPort, LlmService, TextExtractor};
