//! 产物存储服务 - 业务能力层
//!
//! 只负责"往结果目录写产物 / 按名取产物"能力，不关心流程
//!
//! 产物名由请求的基础标识确定性地派生，同名直接覆盖（按名幂等，
//! 不做内容级的新旧检测）。

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, AppResult, FileError};

/// 没有上传文件时使用的基础标识
pub const DEFAULT_BASE_NAME: &str = "generated_exam";

/// 产物存储服务
pub struct ArtifactStore {
    results_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// 确保结果目录存在
    pub fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.results_dir).map_err(|e| {
            AppError::file_write_failed(self.results_dir.to_string_lossy(), e)
        })
    }

    /// 模型原始输出的产物名
    pub fn txt_filename(base: &str) -> String {
        format!("exam_{}.txt", base)
    }

    /// 渲染后 PDF 的产物名
    pub fn pdf_filename(base: &str) -> String {
        format!("exam_{}.pdf", base)
    }

    /// 写入文本产物，同名覆盖
    pub fn save_text(&self, filename: &str, content: &str) -> AppResult<PathBuf> {
        self.save_bytes(filename, content.as_bytes())
    }

    /// 写入字节产物，同名覆盖
    pub fn save_bytes(&self, filename: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        let path = self.results_dir.join(filename);
        fs::write(&path, bytes)
            .map_err(|e| AppError::file_write_failed(path.to_string_lossy(), e))?;
        debug!("产物已写入: {} ({} 字节)", path.display(), bytes.len());
        Ok(path)
    }

    /// 按名解析下载路径
    ///
    /// 拒绝带路径成分的文件名，产物必须已存在。
    pub fn resolve_download(&self, filename: &str) -> AppResult<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(AppError::File(FileError::InvalidFilename {
                name: filename.to_string(),
            }));
        }

        let path = self.results_dir.join(filename);
        if !path.is_file() {
            return Err(AppError::File(FileError::NotFound {
                path: path.to_string_lossy().to_string(),
            }));
        }
        Ok(path)
    }
}

/// 从上传文件名派生安全的基础标识
///
/// 去掉路径成分和扩展名，只保留字母数字和 `._-`（空格折叠成下划线），
/// 清洗后为空则回落到默认标识。
pub fn sanitize_base_name(filename: &str) -> String {
    let name = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut base = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
            base.push(c);
        } else if c.is_whitespace() {
            base.push('_');
        }
    }

    if base.trim_matches(|c| c == '.' || c == '_').is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filenames_are_deterministic() {
        assert_eq!(ArtifactStore::txt_filename("physics_ch1"), "exam_physics_ch1.txt");
        assert_eq!(ArtifactStore::pdf_filename("physics_ch1"), "exam_physics_ch1.pdf");
    }

    #[test]
    fn test_sanitize_base_name() {
        assert_eq!(sanitize_base_name("physics ch1.pdf"), "physics_ch1");
        assert_eq!(sanitize_base_name("../../etc/passwd.txt"), "passwd");
        assert_eq!(sanitize_base_name("物理第一章.docx"), "物理第一章");
        assert_eq!(sanitize_base_name("###.pdf"), DEFAULT_BASE_NAME);
        assert_eq!(sanitize_base_name(""), DEFAULT_BASE_NAME);
    }

    #[test]
    fn test_save_overwrites_silently() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.save_text("exam_a.txt", "第一版").unwrap();
        let path = store.save_text("exam_a.txt", "第二版").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "第二版");
    }

    #[test]
    fn test_resolve_download_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save_text("exam_a.txt", "内容").unwrap();

        assert!(store.resolve_download("exam_a.txt").is_ok());
        assert!(store.resolve_download("../exam_a.txt").is_err());
        assert!(store.resolve_download("a/b.txt").is_err());
        assert!(store.resolve_download("不存在.txt").is_err());
    }
}
