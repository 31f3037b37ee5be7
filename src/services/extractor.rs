//! 文本提取服务 - 业务能力层
//!
//! 只负责"把上传文档变成纯文本"能力，不关心流程
//!
//! 任何提取失败都收敛为 `None`，由编排层按"没有输入文本"处理，
//! 绝不向上抛出独立的错误类型。

use tracing::{debug, warn};

/// 允许上传的文档类型（由文件扩展名判定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    /// 按扩展名白名单判定文档类型，不在白名单内返回 None
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::Txt),
            _ => None,
        }
    }
}

/// 文本提取服务
///
/// 职责：
/// - 把 pdf / docx / txt 字节转成纯文本
/// - 失败时返回 None 并记日志，不报错
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 提取文档文本
    ///
    /// 部分页面失败时由底层库尽力拼接，这里不感知页级粒度。
    pub fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Option<String> {
        let text = match kind {
            DocumentKind::Pdf => match pdf_extract::extract_text_from_mem(bytes) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("PDF 文本提取失败: {}", e);
                    None
                }
            },
            DocumentKind::Docx => extract_docx(bytes),
            DocumentKind::Txt => match std::str::from_utf8(bytes) {
                Ok(text) => Some(text.to_string()),
                Err(e) => {
                    warn!("TXT 不是合法的 UTF-8: {}", e);
                    None
                }
            },
        };

        if let Some(text) = &text {
            debug!("提取到 {} 字符 ({:?})", text.chars().count(), kind);
        }
        text
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 遍历 docx 段落，把所有 run 文本按段拼接（段间用空格）
fn extract_docx(bytes: &[u8]) -> Option<String> {
    let docx = match docx_rs::read_docx(bytes) {
        Ok(docx) => docx,
        Err(e) => {
            warn!("DOCX 解析失败: {}", e);
            return None;
        }
    };

    let mut paragraphs = Vec::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            let mut text = String::new();
            for pc in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = pc {
                    for rc in run.children {
                        if let docx_rs::RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            paragraphs.push(text);
        }
    }

    Some(paragraphs.join(" "))
}
