/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 服务监听地址
    pub bind_addr: String,
    /// 上传文件存放目录
    pub upload_dir: String,
    /// 生成结果存放目录
    pub results_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            upload_dir: "uploads".to_string(),
            results_dir: "results".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gemini-2.5-pro".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(default.bind_addr),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or(default.upload_dir),
            results_dir: std::env::var("RESULTS_DIR").unwrap_or(default.results_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}
