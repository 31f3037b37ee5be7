use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 输入错误（用户可见，流水线在生成前终止）
    Input(InputError),
    /// 配置/参数错误（用户可见，流水线在生成前终止）
    Config(ConfigError),
    /// 文件操作错误
    File(FileError),
    /// LLM 服务错误
    Llm(LlmError),
    /// PDF 渲染错误
    Render(RenderError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input(e) => write!(f, "输入错误: {}", e),
            AppError::Config(e) => write!(f, "参数错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Llm(e) => write!(f, "LLM错误: {}", e),
            AppError::Render(e) => write!(f, "渲染错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Input(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Llm(e) => Some(e),
            AppError::Render(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 输入错误
///
/// 对应"上传文件无法提取文本，且没有提供原始文本"的情况，
/// 是仅有的两个直接返回给调用方的错误之一。
#[derive(Debug)]
pub enum InputError {
    /// 提取失败或未提供任何文本
    NoUsableText,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NoUsableText => {
                write!(f, "Failed to extract text or no text provided.")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// 配置/参数错误
#[derive(Debug)]
pub enum ConfigError {
    /// 题目数量字段无法解析为非负整数
    InvalidCount {
        field: String,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCount { .. } => {
                write!(
                    f,
                    "Invalid input for number of questions. Please enter integers."
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件不存在
    NotFound {
        path: String,
    },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文件名非法（为空或包含路径分隔符）
    InvalidFilename {
        name: String,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "文件不存在: {}", path),
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::InvalidFilename { name } => write!(f, "文件名非法: {}", name),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } | FileError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// LLM 服务错误
///
/// 注意：编排层会把这类错误就地降级为空响应文本（见 exam_flow），
/// 它们不会越过编排层边界。
#[derive(Debug)]
pub enum LlmError {
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyContent {
        model: String,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ApiCallFailed { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            LlmError::EmptyContent { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::ApiCallFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// PDF 渲染错误
#[derive(Debug)]
pub enum RenderError {
    /// 内置字体加载失败
    FontLoadFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// PDF 文档生成失败
    PdfBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FontLoadFailed { source } => {
                write!(f, "内置字体加载失败: {}", source)
            }
            RenderError::PdfBuildFailed { source } => {
                write!(f, "PDF生成失败: {}", source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::FontLoadFailed { source } | RenderError::PdfBuildFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 无可用输入文本
    pub fn no_usable_text() -> Self {
        AppError::Input(InputError::NoUsableText)
    }

    /// 题目数量解析失败
    pub fn invalid_count(field: impl Into<String>, value: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidCount {
            field: field.into(),
            value: value.into(),
        })
    }

    /// 写入文件失败
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// LLM API 调用失败
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 是否属于直接返回给调用方的终止性错误
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::Input(_) | AppError::Config(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
