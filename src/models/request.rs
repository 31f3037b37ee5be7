use serde::Serialize;

use crate::models::question::{ExamInfo, QuestionSet};

/// 一次出卷请求
///
/// 由 HTTP 层从 multipart 表单组装，编排层消费。
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// 上传的文件（文件名 + 原始字节）
    pub file: Option<UploadedFile>,
    /// 直接粘贴的原始文本
    pub input_text: String,
    /// 三个题目数量字段（保持原始字符串，由编排层校验）
    pub mcq_count: String,
    pub short_count: String,
    pub long_count: String,
    /// 试卷元信息
    pub exam_info: ExamInfo,
}

/// 上传的文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// 出卷成功的响应
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    /// 解析出的结构化题目
    pub questions: QuestionSet,
    /// 试卷元信息（原样回显）
    pub exam_info: ExamInfo,
    /// 模型原始输出的文本产物名
    pub txt_filename: String,
    /// 渲染后的 PDF 产物名
    pub pdf_filename: String,
}
