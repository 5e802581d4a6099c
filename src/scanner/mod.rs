use crate::error::{FridgeError, Result};
use crate::upload::FileBlob;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
}

impl ImageInfo {
    /// ファイルを読み込みアップロード用の Blob にする
    pub fn read_blob(&self) -> Result<FileBlob> {
        let bytes = std::fs::read(&self.path)?;
        Ok(FileBlob::new(self.file_name.clone(), self.content_type, bytes)
            .with_preview(self.path.display().to_string()))
    }
}

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// 拡張子からContent-Typeを判定（大文字小文字は無視）
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn image_info(path: &Path) -> Option<ImageInfo> {
    let content_type = content_type_for(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Some(ImageInfo {
        path: path.to_path_buf(),
        file_name,
        content_type,
    })
}

/// フォルダ直下の画像を列挙（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(FridgeError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| image_info(e.path()))
        .collect();

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 指定パス（ファイルまたはフォルダ）から画像を収集
///
/// 指定順を保持する。フォルダはその直下の画像をファイル名順で展開する。
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_dir() {
            images.extend(scan_folder(path)?);
        } else if path.is_file() {
            match image_info(path) {
                Some(info) => images.push(info),
                None => tracing::warn!(path = %path.display(), "Skipping unsupported file type"),
            }
        } else {
            return Err(FridgeError::FileNotFound(path.display().to_string()));
        }
    }

    Ok(images)
}
