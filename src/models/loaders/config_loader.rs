use crate::error::{AppError, AppResult, FileError};
use crate::models::assignment::{AssignmentConfig, StoredAssignmentConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Semaphore;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

fn config_format(path: &Path) -> Option<ConfigFormat> {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Some(ConfigFormat::Json),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Some(ConfigFormat::Toml),
        _ => None,
    }
}

/// 解析作业配置内容，旧版标记会在这里完成迁移
pub fn parse_assignment_config(content: &str, path: &Path) -> AppResult<AssignmentConfig> {
    let path_str = path.display().to_string();
    let stored: StoredAssignmentConfig = match config_format(path) {
        Some(ConfigFormat::Json) => {
            serde_json::from_str(content).map_err(|source| FileError::JsonParseFailed {
                path: path_str,
                source,
            })?
        }
        Some(ConfigFormat::Toml) => {
            toml::from_str(content).map_err(|source| FileError::TomlParseFailed {
                path: path_str,
                source,
            })?
        }
        None => return Err(FileError::UnsupportedFormat { path: path_str }.into()),
    };

    Ok(stored.into_config())
}

/// 从文件加载单个作业配置
pub async fn load_assignment_config(path: &Path) -> Result<AssignmentConfig> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let config = parse_assignment_config(&content, path)
        .with_context(|| format!("无法加载作业配置: {}", path.display()))?;

    let summary = config.point_summary();
    if !summary.is_balanced() {
        tracing::warn!(
            "⚠️ 作业《{}》分值不平衡: 已分配 {} / 总分 {}",
            config.title,
            summary.assigned(),
            summary.total_points
        );
    }

    Ok(config)
}

/// 从文件夹中并发加载所有作业配置
///
/// 单个文件加载失败只记录警告，不影响其它文件
pub async fn load_all_assignment_configs(
    folder_path: &str,
    max_concurrent: usize,
) -> Result<Vec<AssignmentConfig>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut config_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if config_format(&path).is_some() {
            config_files.push(path);
        }
    }
    config_files.sort();

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut handles = Vec::with_capacity(config_files.len());

    for path in config_files {
        let permit = semaphore.clone().acquire_owned().await?;
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            let result = load_assignment_config(&path).await;
            (path, result)
        }));
    }

    let mut configs = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok((path, Ok(config))) => {
                tracing::info!(
                    "✓ 已加载《{}》: {} 个分段 ({})",
                    config.title,
                    config.markers.len(),
                    path.file_name().unwrap_or_default().to_string_lossy()
                );
                configs.push(config);
            }
            Ok((path, Err(e))) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
            Err(e) => {
                tracing::error!("加载任务执行失败: {}", e);
            }
        }
    }

    Ok(configs)
}
