use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::summarize::SummarizerKind;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub search: Option<SearchConfig>,
    pub summarizer: Option<SummarizerConfig>,
    pub chunking: Option<ChunkingConfig>,
    pub pdf: Option<PdfConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub search_url: Option<String>,
    pub pdf_base_url: Option<String>,
    pub save_path: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub backend: Option<SummarizerKind>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: Option<usize>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

/// Page bands dropped during text extraction, as fractions of page height.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfConfig {
    pub header_exclusion: Option<f32>,
    pub footer_exclusion: Option<f32>,
}

/// Platform config directory path: `<config_dir>/paperdigest/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paperdigest").join("config.toml"))
}

/// Load config by cascading CWD `.paperdigest.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".paperdigest.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist; a file that exists but fails to parse is logged and ignored.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let search = match (base.search, overlay.search) {
        (Some(b), Some(o)) => Some(SearchConfig {
            search_url: o.search_url.or(b.search_url),
            pdf_base_url: o.pdf_base_url.or(b.pdf_base_url),
            save_path: o.save_path.or(b.save_path),
            http_timeout_secs: o.http_timeout_secs.or(b.http_timeout_secs),
        }),
        (b, o) => o.or(b),
    };
    let summarizer = match (base.summarizer, overlay.summarizer) {
        (Some(b), Some(o)) => Some(SummarizerConfig {
            backend: o.backend.or(b.backend),
            model: o.model.or(b.model),
            base_url: o.base_url.or(b.base_url),
            api_token: o.api_token.or(b.api_token),
        }),
        (b, o) => o.or(b),
    };
    let chunking = match (base.chunking, overlay.chunking) {
        (Some(b), Some(o)) => Some(ChunkingConfig {
            chunk_size: o.chunk_size.or(b.chunk_size),
            min_length: o.min_length.or(b.min_length),
            max_length: o.max_length.or(b.max_length),
        }),
        (b, o) => o.or(b),
    };
    let pdf = match (base.pdf, overlay.pdf) {
        (Some(b), Some(o)) => Some(PdfConfig {
            header_exclusion: o.header_exclusion.or(b.header_exclusion),
            footer_exclusion: o.footer_exclusion.or(b.footer_exclusion),
        }),
        (b, o) => o.or(b),
    };
    ConfigFile {
        search,
        summarizer,
        chunking,
        pdf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_toml() {
        let config = ConfigFile {
            summarizer: Some(SummarizerConfig {
                backend: Some(SummarizerKind::Ollama),
                model: Some("mistral".into()),
                ..Default::default()
            }),
            chunking: Some(ChunkingConfig {
                chunk_size: Some(1024),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        let summarizer = parsed.summarizer.unwrap();
        assert_eq!(summarizer.backend, Some(SummarizerKind::Ollama));
        assert_eq!(summarizer.model.as_deref(), Some("mistral"));
        assert_eq!(parsed.chunking.unwrap().chunk_size, Some(1024));
        assert!(parsed.search.is_none());
    }

    #[test]
    fn parses_hand_written_file() {
        let toml_str = r#"
[search]
save_path = "/tmp/paper.pdf"
http_timeout_secs = 30

[summarizer]
backend = "huggingface"

[chunking]
min_length = 20
max_length = 120
"#;
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let search = parsed.search.unwrap();
        assert_eq!(search.save_path.as_deref(), Some("/tmp/paper.pdf"));
        assert_eq!(search.http_timeout_secs, Some(30));
        assert!(search.search_url.is_none());
        assert_eq!(
            parsed.summarizer.unwrap().backend,
            Some(SummarizerKind::HuggingFace)
        );
        let chunking = parsed.chunking.unwrap();
        assert_eq!(chunking.min_length, Some(20));
        assert_eq!(chunking.max_length, Some(120));
        assert!(chunking.chunk_size.is_none());
    }

    #[test]
    fn unknown_backend_fails_to_parse() {
        let toml_str = "[summarizer]\nbackend = \"gpt\"\n";
        assert!(toml::from_str::<ConfigFile>(toml_str).is_err());
    }

    #[test]
    fn merge_overlay_wins_per_field() {
        let base = ConfigFile {
            search: Some(SearchConfig {
                save_path: Some("/base/paper.pdf".into()),
                http_timeout_secs: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            search: Some(SearchConfig {
                save_path: Some("/overlay/paper.pdf".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).search.unwrap();
        assert_eq!(merged.save_path.as_deref(), Some("/overlay/paper.pdf"));
        assert_eq!(merged.http_timeout_secs, Some(10));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            chunking: Some(ChunkingConfig {
                chunk_size: Some(512),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.chunking.unwrap().chunk_size, Some(512));
        assert!(merged.summarizer.is_none());
    }

    #[test]
    fn pdf_bands_parse_and_merge() {
        let base: ConfigFile =
            toml::from_str("[pdf]\nheader_exclusion = 0.05\nfooter_exclusion = 0.08\n").unwrap();
        let overlay: ConfigFile = toml::from_str("[pdf]\nfooter_exclusion = 0.0\n").unwrap();
        let pdf = merge(base, overlay).pdf.unwrap();
        assert_eq!(pdf.header_exclusion, Some(0.05));
        assert_eq!(pdf.footer_exclusion, Some(0.0));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());
    }

    #[test]
    fn garbage_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is [not toml").unwrap();
        assert!(load_from_path(&path).is_none());
    }
}
