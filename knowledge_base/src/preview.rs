//! Classificação de pré-visualização de arquivos
//!
//! Somente as quatro listas fechadas abaixo decidem o tipo de preview.
//! Qualquer outra extensão é `Unknown` (apenas link de download), inclusive
//! extensões curtas como `.ico` ou `.exe`.

use serde::Serialize;
use url::Url;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mov", "avi", "mkv"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "csv", "json", "md", "log", "xml"];

/// Mensagem exibida quando não há preview
pub const NO_PREVIEW_NOTICE: &str = "Pré-visualização não disponível para este tipo de arquivo.";

/// Tipo de preview inline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    Image,
    Video,
    Pdf,
    Text,
    Unknown,
}

impl PreviewKind {
    pub fn has_inline_preview(&self) -> bool {
        !matches!(self, PreviewKind::Unknown)
    }
}

/// Extensão (minúscula) do caminho da URL, ignorando query e fragmento
pub fn extension_of(location: &str) -> Option<String> {
    let path = match Url::parse(location) {
        Ok(url) => url.path().to_string(),
        // Caminho relativo ou local
        Err(_) => location
            .split(['?', '#'])
            .next()
            .unwrap_or(location)
            .to_string(),
    };

    let file_name = path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Classifica a URL nas quatro listas fechadas
pub fn classify_extension(location: &str) -> PreviewKind {
    let Some(ext) = extension_of(location) else {
        return PreviewKind::Unknown;
    };
    let ext = ext.as_str();

    if IMAGE_EXTENSIONS.contains(&ext) {
        PreviewKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        PreviewKind::Video
    } else if PDF_EXTENSIONS.contains(&ext) {
        PreviewKind::Pdf
    } else if TEXT_EXTENSIONS.contains(&ext) {
        PreviewKind::Text
    } else {
        PreviewKind::Unknown
    }
}

/// Descrição de preview de um arquivo armazenado
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePreview {
    pub kind: PreviewKind,
    pub file_name: String,
    /// Link de download, sempre oferecido
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl FilePreview {
    pub fn for_url(location: &str) -> Self {
        let kind = classify_extension(location);
        let file_name = crate::codec::FileHandle::from_input(location)
            .map(|f| f.name)
            .unwrap_or_default();

        Self {
            kind,
            file_name,
            download_url: location.to_string(),
            notice: (!kind.has_inline_preview()).then(|| NO_PREVIEW_NOTICE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_lists() {
        assert_eq!(classify_extension("https://cdn.io/a/foto.JPG"), PreviewKind::Image);
        assert_eq!(classify_extension("https://cdn.io/v.mp4?token=abc"), PreviewKind::Video);
        assert_eq!(classify_extension("https://cdn.io/contrato.pdf#page=2"), PreviewKind::Pdf);
        assert_eq!(classify_extension("/media/export.csv"), PreviewKind::Text);
    }

    #[test]
    fn test_short_unknown_extensions_are_not_text() {
        assert_eq!(classify_extension("https://cdn.io/favicon.ico"), PreviewKind::Unknown);
        assert_eq!(classify_extension("https://cdn.io/setup.exe"), PreviewKind::Unknown);
        assert_eq!(classify_extension("https://cdn.io/arquivo"), PreviewKind::Unknown);
        assert_eq!(classify_extension("https://cdn.io/.env"), PreviewKind::Unknown);
    }

    #[test]
    fn test_query_does_not_leak_into_extension() {
        assert_eq!(
            extension_of("https://cdn.io/doc.txt?name=x.exe").as_deref(),
            Some("txt")
        );
    }

    #[test]
    fn test_file_preview_notice() {
        let preview = FilePreview::for_url("https://cdn.io/planilha.xlsx");
        assert_eq!(preview.kind, PreviewKind::Unknown);
        assert_eq!(preview.file_name, "planilha.xlsx");
        assert_eq!(preview.notice.as_deref(), Some(NO_PREVIEW_NOTICE));

        let preview = FilePreview::for_url("https://cdn.io/logo.png");
        assert!(preview.notice.is_none());
        assert_eq!(preview.download_url, "https://cdn.io/logo.png");
    }
}
