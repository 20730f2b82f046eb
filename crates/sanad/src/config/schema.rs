use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "default_library_directory")]
    pub library_directory: String,
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            library_directory: default_library_directory(),
            database_path: None,
            ocr: OcrConfig::default(),
            extraction: ExtractionConfig::default(),
            render: RenderConfig::default(),
            progress: ProgressConfig::default(),
            upload: UploadConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Resolves the SQLite path, falling back to `~/.sanad/data/sanad.db`.
    pub fn database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => PathBuf::from(path),
            None => crate::db::default_database_path()
                .unwrap_or_else(|| PathBuf::from("sanad.db")),
        }
    }
}

fn default_library_directory() -> String {
    dirs::home_dir()
        .map(|h| h.join(".sanad").join("library"))
        .unwrap_or_else(|| PathBuf::from("library"))
        .to_string_lossy()
        .into_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_ocr_dpi")]
    pub dpi: u32,
    #[serde(default = "default_page_segmentation_mode")]
    pub page_segmentation_mode: u32,
    #[serde(default = "default_true")]
    pub preserve_interword_spaces: bool,
    /// Contrast multiplier applied after grayscale conversion (1.0 = unchanged).
    #[serde(default = "default_contrast")]
    pub contrast: f32,
}

fn default_true() -> bool {
    true
}

fn default_languages() -> Vec<String> {
    vec!["ara".to_string()]
}

fn default_ocr_dpi() -> u32 {
    300
}

fn default_page_segmentation_mode() -> u32 {
    6
}

fn default_contrast() -> f32 {
    2.0
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: default_languages(),
            dpi: default_ocr_dpi(),
            page_segmentation_mode: default_page_segmentation_mode(),
            preserve_interword_spaces: true,
            contrast: default_contrast(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_large_file_chunk_size")]
    pub large_file_chunk_size: usize,
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold_bytes: u64,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_chunk_size() -> usize {
    10
}

fn default_large_file_chunk_size() -> usize {
    5
}

fn default_large_file_threshold() -> u64 {
    20 * 1024 * 1024
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}

fn default_max_pages() -> usize {
    1000
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            large_file_chunk_size: default_large_file_chunk_size(),
            large_file_threshold_bytes: default_large_file_threshold(),
            max_file_size_bytes: default_max_file_size(),
            max_pages: default_max_pages(),
        }
    }
}

impl ExtractionConfig {
    /// Pages per chunk for a file of the given size.
    pub fn chunk_size_for(&self, file_size: u64) -> usize {
        if file_size > self.large_file_threshold_bytes {
            self.large_file_chunk_size
        } else {
            self.chunk_size
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_render_dpi")]
    pub dpi: f32,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,
}

fn default_render_dpi() -> f32 {
    150.0
}

fn default_min_zoom() -> f32 {
    0.25
}

fn default_max_zoom() -> f32 {
    3.0
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: default_render_dpi(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_task_ttl")]
    pub task_ttl_secs: u64,
    #[serde(default = "default_result_ttl")]
    pub result_ttl_secs: u64,
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
    #[serde(default = "default_max_tasks")]
    pub max_tasks: u64,
}

fn default_task_ttl() -> u64 {
    3600
}

fn default_result_ttl() -> u64 {
    300
}

fn default_preview_limit() -> usize {
    10
}

fn default_max_tasks() -> u64 {
    10_000
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            task_ttl_secs: default_task_ttl(),
            result_ttl_secs: default_result_ttl(),
            preview_limit: default_preview_limit(),
            max_tasks: default_max_tasks(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_upload_max_size")]
    pub max_size_bytes: u64,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_upload_max_size() -> u64 {
    412 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "doc".to_string(), "docx".to_string()]
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_upload_max_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Type tag of a library document, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Other,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "doc" | "docx" => Self::Docx,
            _ => Self::Other,
        }
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Other => "other",
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
