//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use vitrine_core::SiteDocument;
use vitrine_store::{SiteRepository, StoreError};

use crate::renderer::{RenderMode, RenderOptions, SiteRenderer};

/// Configuration for building every stored site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Output directory
    pub output_dir: PathBuf,

    /// Base URL the output is served under
    pub base_url: String,

    /// Minify inline stylesheets
    pub minify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            base_url: "/".to_string(),
            minify: true,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of site pages written
    pub pages: usize,

    /// Sites that failed to render, with the reason
    pub failed: Vec<(String, String)>,

    /// Sites that rendered with the default template
    pub fallbacks: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read sites: {0}")]
    ReadError(#[from] StoreError),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {path}: {message}")]
    WriteError { path: String, message: String },
}

/// Renders every stored site to static files.
pub struct SiteBuilder {
    config: BuildConfig,
    renderer: SiteRenderer,
}

impl SiteBuilder {
    pub fn new(config: BuildConfig) -> Self {
        let renderer = SiteRenderer::new(RenderOptions {
            base_url: config.base_url.clone(),
            minify: config.minify,
        });
        Self { config, renderer }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build every site in the repository.
    pub fn build_all(&self, repo: &SiteRepository) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| write_error(&self.config.output_dir, e))?;

        let sites = repo.list()?;
        tracing::info!("Building {} sites", sites.len());

        let results: Vec<(&SiteDocument, Result<bool, BuildError>)> = sites
            .par_iter()
            .map(|doc| (doc, self.build_site(doc)))
            .collect();

        let mut built = Vec::new();
        let mut failed = Vec::new();
        let mut fallbacks = 0;
        for (doc, result) in results {
            match result {
                Ok(fell_back) => {
                    if fell_back {
                        fallbacks += 1;
                    }
                    built.push(doc.clone());
                }
                Err(e) => {
                    tracing::error!("Failed to build site {}: {}", doc.client_id, e);
                    failed.push((doc.client_id.clone(), e.to_string()));
                }
            }
        }

        self.generate_index(&built)?;
        self.generate_not_found()?;
        self.generate_sitemap(&built)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: built.len(),
            failed,
            fallbacks,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Render one site to `<output>/sites/<clientId>/index.html`.
    ///
    /// Returns whether the site fell back to the default template.
    pub fn build_site(&self, doc: &SiteDocument) -> Result<bool, BuildError> {
        let page = self
            .renderer
            .render(doc, RenderMode::Live)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        let dir = self.site_dir(&doc.client_id);
        fs::create_dir_all(&dir).map_err(|e| write_error(&dir, e))?;

        let path = dir.join("index.html");
        fs::write(&path, page.html).map_err(|e| write_error(&path, e))?;

        tracing::debug!("Wrote {}", path.display());
        Ok(page.fell_back)
    }

    fn site_dir(&self, client_id: &str) -> PathBuf {
        self.config.output_dir.join("sites").join(client_id)
    }

    fn generate_index(&self, sites: &[SiteDocument]) -> Result<(), BuildError> {
        let html = self
            .renderer
            .render_index(sites)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        let path = self.config.output_dir.join("index.html");
        fs::write(&path, html).map_err(|e| write_error(&path, e))
    }

    fn generate_not_found(&self) -> Result<(), BuildError> {
        let html = self
            .renderer
            .render_not_found("")
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        let path = self.config.output_dir.join("404.html");
        fs::write(&path, html).map_err(|e| write_error(&path, e))
    }

    /// Generate sitemap.
    fn generate_sitemap(&self, sites: &[SiteDocument]) -> Result<(), BuildError> {
        let urls: Vec<String> = sites
            .iter()
            .map(|doc| {
                format!(
                    "  <url>\n    <loc>{}</loc>\n  </url>",
                    self.renderer.site_href(&doc.client_id)
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        let path = self.config.output_dir.join("sitemap.xml");
        fs::write(&path, sitemap).map_err(|e| write_error(&path, e))?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}sitemap.xml",
            self.renderer.options().base_url
        );
        let path = self.config.output_dir.join("robots.txt");
        fs::write(&path, robots).map_err(|e| write_error(&path, e))?;

        Ok(())
    }
}

fn write_error(path: &Path, e: std::io::Error) -> BuildError {
    BuildError::WriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;
    use vitrine_core::{get_site_model, SiteEditor};
    use vitrine_store::{FileStore, MemoryStore};

    fn repo_with(client_ids: &[&str]) -> SiteRepository {
        let repo = SiteRepository::new(Arc::new(MemoryStore::new()));
        for id in client_ids {
            let editor = SiteEditor::from_model(get_site_model("landing-page").unwrap(), *id);
            repo.save(&editor.snapshot()).unwrap();
        }
        repo
    }

    #[test]
    fn builds_every_site() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("dist");
        let builder = SiteBuilder::new(BuildConfig {
            output_dir: out.clone(),
            minify: false,
            ..Default::default()
        });

        let result = builder.build_all(&repo_with(&["ana", "bob"])).unwrap();

        assert_eq!(result.pages, 2);
        assert!(result.failed.is_empty());
        assert!(out.join("sites/ana/index.html").exists());
        assert!(out.join("sites/bob/index.html").exists());
        assert!(out.join("404.html").exists());

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains("/sites/ana/"));
        assert!(index.contains("/sites/bob/"));
    }

    #[test]
    fn generates_sitemap_and_robots() {
        let temp = tempdir().unwrap();
        let out = temp.path().to_path_buf();
        let builder = SiteBuilder::new(BuildConfig {
            output_dir: out.clone(),
            base_url: "https://exemplo.com.br/".to_string(),
            minify: false,
        });

        builder.build_all(&repo_with(&["ana"])).unwrap();

        let sitemap = fs::read_to_string(out.join("sitemap.xml")).unwrap();
        let robots = fs::read_to_string(out.join("robots.txt")).unwrap();
        assert!(sitemap.contains("<loc>https://exemplo.com.br/sites/ana/</loc>"));
        assert!(robots.contains("Sitemap: https://exemplo.com.br/sitemap.xml"));
    }

    #[test]
    fn builds_from_file_store() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path().join("data")).unwrap();
        let repo = SiteRepository::new(Arc::new(store));
        let mut doc =
            SiteEditor::from_model(get_site_model("portfolio").unwrap(), "carla").into_document();
        doc.template = Some("nao-existe".to_string());
        repo.save(&doc).unwrap();

        let builder = SiteBuilder::new(BuildConfig {
            output_dir: temp.path().join("dist"),
            ..Default::default()
        });
        let result = builder.build_all(&repo).unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.fallbacks, 1);
        let html = fs::read_to_string(temp.path().join("dist/sites/carla/index.html")).unwrap();
        assert!(html.contains("tpl-geral"));
    }

    #[test]
    fn empty_repository_still_writes_index() {
        let temp = tempdir().unwrap();
        let builder = SiteBuilder::new(BuildConfig {
            output_dir: temp.path().to_path_buf(),
            ..Default::default()
        });

        let result = builder.build_all(&repo_with(&[])).unwrap();

        assert_eq!(result.pages, 0);
        let index = fs::read_to_string(temp.path().join("index.html")).unwrap();
        assert!(index.contains("Nenhum site publicado"));
    }
}
