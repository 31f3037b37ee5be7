//! HTTP 接入层 - 薄胶水
//!
//! 负责把 multipart 表单装配成 `GenerateRequest`、把流程结果映射成
//! HTTP 响应、按名提供产物下载。业务都在编排层以下，这里不做判断。

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::request::{GenerateRequest, UploadedFile};
use crate::orchestrator::ExamFlow;
use crate::services::{sanitize_base_name, ArtifactStore, DocumentKind, LlmService};
use crate::utils::logging::log_startup;

/// 元信息缺省的试卷名
const DEFAULT_EXAM_TITLE: &str = "Exam Paper";

/// 共享状态：每个请求自身顺序执行，请求间只共享只读能力
struct AppState {
    flow: ExamFlow,
    artifacts: ArtifactStore,
    upload_dir: String,
}

/// 应用主结构
pub struct App {
    config: Config,
    state: Arc<AppState>,
}

impl App {
    /// 初始化应用：准备目录、装配能力层
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.upload_dir)?;

        let artifacts = ArtifactStore::new(&config.results_dir);
        artifacts.ensure_dir()?;

        let generation = Arc::new(LlmService::new(&config));
        let flow = ExamFlow::new(&config, generation);

        let state = Arc::new(AppState {
            flow,
            artifacts,
            upload_dir: config.upload_dir.clone(),
        });

        Ok(Self { config, state })
    }

    /// 运行 HTTP 服务
    pub async fn run(self) -> anyhow::Result<()> {
        log_startup(&self.config.bind_addr);

        let router = Router::new()
            .route("/", get(index))
            .route("/generate", post(generate_exam))
            .route("/download/:filename", get(download_file))
            .with_state(self.state);

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

/// 首页：最小上传表单
async fn index() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
<body>
  <h1>Exam Paper Generator</h1>
  <form action="/generate" method="post" enctype="multipart/form-data">
    <p>File (pdf / docx / txt): <input type="file" name="file"></p>
    <p>Or paste text:<br><textarea name="input_text" rows="8" cols="60"></textarea></p>
    <p>MCQs: <input name="section_a_count" value="5" size="3">
       Short: <input name="section_b_count" value="5" size="3">
       Long: <input name="section_c_count" value="3" size="3"></p>
    <p>Exam: <input name="exam"> Date: <input name="date"> Time: <input name="time"></p>
    <p>Course code: <input name="course_code"> Course name: <input name="course_name">
       Total marks: <input name="total_marks"></p>
    <p><button type="submit">Generate</button></p>
  </form>
</body>
</html>"#,
    )
}

/// 出卷入口：装配请求 → 跑流程 → 映射响应
async fn generate_exam(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Response {
    let request = match build_request(state.as_ref(), multipart).await {
        Ok(request) => request,
        Err(msg) => {
            warn!("表单解析失败: {}", msg);
            return (StatusCode::BAD_REQUEST, msg).into_response();
        }
    };

    match state.flow.run(request).await {
        Ok(response) => Json(response).into_response(),
        // 仅有的两个面向调用方的终止：无输入文本、数量非法
        Err(e) if e.is_user_facing() => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            error!("出卷流程内部错误: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error.".to_string()).into_response()
        }
    }
}

/// 从 multipart 表单装配 `GenerateRequest`
async fn build_request(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<GenerateRequest, String> {
    let mut request = GenerateRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Malformed multipart form: {}", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read uploaded file: {}", e))?;
                if !filename.is_empty() && !bytes.is_empty() {
                    save_upload(state, &filename, &bytes);
                    request.file = Some(UploadedFile {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "input_text" => request.input_text = read_text(field).await?,
            "section_a_count" => request.mcq_count = read_text(field).await?,
            "section_b_count" => request.short_count = read_text(field).await?,
            "section_c_count" => request.long_count = read_text(field).await?,
            "exam" => request.exam_info.title = read_text(field).await?,
            "date" => request.exam_info.date = read_text(field).await?,
            "time" => request.exam_info.time = read_text(field).await?,
            "course_code" => request.exam_info.course_code = read_text(field).await?,
            "course_name" => request.exam_info.course_name = read_text(field).await?,
            "total_marks" => request.exam_info.total_marks = read_text(field).await?,
            _ => {}
        }
    }

    if request.exam_info.title.is_empty() {
        request.exam_info.title = DEFAULT_EXAM_TITLE.to_string();
    }

    Ok(request)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, String> {
    field
        .text()
        .await
        .map_err(|e| format!("Malformed multipart field: {}", e))
}

/// 把上传文件落到上传目录（留档，不参与后续流程）
fn save_upload(state: &AppState, filename: &str, bytes: &[u8]) {
    if DocumentKind::from_filename(filename).is_none() {
        return;
    }
    let safe_name = format!(
        "{}.{}",
        sanitize_base_name(filename),
        filename.rsplit('.').next().unwrap_or_default().to_ascii_lowercase()
    );
    let path = std::path::Path::new(&state.upload_dir).join(&safe_name);
    match std::fs::write(&path, bytes) {
        Ok(()) => info!("📥 已保存上传文件: {}", path.display()),
        Err(e) => warn!("⚠️ 上传文件保存失败 ({}): {}", path.display(), e),
    }
}

/// 按名下载产物
async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    let path = match state.artifacts.resolve_download(&filename) {
        Ok(path) => path,
        Err(e) => {
            warn!("下载请求被拒绝 ({}): {}", filename, e);
            return (StatusCode::NOT_FOUND, "File not found.").into_response();
        }
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = if filename.ends_with(".pdf") {
                "application/pdf"
            } else {
                "text/plain; charset=utf-8"
            };
            (
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            error!("读取产物失败 ({}): {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error.").into_response()
        }
    }
}
