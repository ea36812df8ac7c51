use crate::error::FileError;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

/// 列出提交目录中的所有文件名（不读取文件内容）
///
/// 隐藏文件和 Office 临时文件（`~$` 开头）会被忽略，结果按文件名排序
pub async fn list_submission_files(folder_path: &str) -> Result<Vec<String>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut filenames = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || name.starts_with("~$") {
            continue;
        }
        filenames.push(name);
    }

    filenames.sort();
    tracing::debug!("提交目录 {} 中共有 {} 个文件", folder_path, filenames.len());

    Ok(filenames)
}
