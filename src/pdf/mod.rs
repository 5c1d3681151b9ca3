use async_trait::async_trait;
use thiserror::Error;

mod chromium;

pub use chromium::ChromiumEngine;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to launch browser: {0}")]
    Launch(#[source] anyhow::Error),
    #[error("pdf render failed: {0}")]
    Render(#[source] anyhow::Error),
    #[error("renderer timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("render workspace I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which side of the page footer carries the page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterSide {
    Left,
    Right,
}

/// Physical page configuration passed through to the rendering engine.
/// Page size, orientation and margins travel inside the document's `@page`
/// rule; only direction-dependent footer placement is decided here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub footer_numbers: FooterSide,
}

impl PageSetup {
    pub fn for_direction(rtl: bool) -> Self {
        let footer_numbers = if rtl {
            FooterSide::Right
        } else {
            FooterSide::Left
        };
        Self { footer_numbers }
    }
}

/// The HTML-to-PDF collaborator. Injected into the request handlers as a
/// shared handle with an explicit lifecycle: health-checked at startup,
/// closed on shutdown.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn render_pdf(&self, html: &str, setup: &PageSetup) -> Result<Vec<u8>, PdfError>;

    async fn health_check(&self) -> Result<(), PdfError>;

    async fn shutdown(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn footer_numbers_follow_text_direction() {
        assert_eq!(
            PageSetup::for_direction(true).footer_numbers,
            FooterSide::Right
        );
        assert_eq!(
            PageSetup::for_direction(false).footer_numbers,
            FooterSide::Left
        );
    }
}
