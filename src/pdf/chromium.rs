use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{FooterSide, PageSetup, PdfEngine, PdfError};

const MM_PER_INCH: f64 = 25.4;

fn mm(value: f64) -> f64 {
    value / MM_PER_INCH
}

/// Footer markup substituted by chromium at print time; `pageNumber` and
/// `totalPages` are the class names chromium fills in. The numbers sit on
/// the reading-direction start side of the page.
fn footer_template(side: FooterSide) -> String {
    let align = match side {
        FooterSide::Right => "right",
        FooterSide::Left => "left",
    };
    format!(
        "<div style=\"width:100%; font-size:9px; color:#666; padding:0 10mm;\">\
         <div style=\"width:100%; text-align:{align};\">\
         <span class=\"pageNumber\"></span> / <span class=\"totalPages\"></span>\
         </div></div>"
    )
}

/// Print settings for a table report: A4 landscape comes from the
/// document's `@page` rule (`prefer_css_page_size`), the footer from the
/// template above. Chromium wants margins in inches.
fn print_options(setup: &PageSetup) -> PrintToPdfOptions {
    PrintToPdfOptions {
        landscape: Some(true),
        display_header_footer: Some(true),
        print_background: Some(true),
        prefer_css_page_size: Some(true),
        header_template: Some("<div style=\"font-size:1px;\"></div>".to_string()),
        footer_template: Some(footer_template(setup.footer_numbers)),
        margin_top: Some(mm(12.0)),
        margin_bottom: Some(mm(12.0)),
        margin_left: Some(mm(10.0)),
        margin_right: Some(mm(10.0)),
        ..Default::default()
    }
}

fn launch(binary: PathBuf) -> Result<Browser, PdfError> {
    let options = LaunchOptions::default_builder()
        .path(Some(binary))
        .headless(true)
        .sandbox(false)
        .idle_browser_timeout(Duration::from_secs(86_400))
        .build()
        .map_err(|e| PdfError::Launch(anyhow::anyhow!(e)))?;

    Browser::new(options).map_err(PdfError::Launch)
}

/// PDF backend speaking the devtools protocol to one shared headless
/// chromium process. The browser launches on first use and lives until
/// `shutdown`; each render opens and closes its own tab.
pub struct ChromiumEngine {
    binary: PathBuf,
    timeout: Duration,
    browser: Mutex<Option<Arc<Browser>>>,
}

impl ChromiumEngine {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            browser: Mutex::new(None),
        }
    }

    async fn browser(&self) -> Result<Arc<Browser>, PdfError> {
        let mut guard = self.browser.lock().await;
        if let Some(browser) = guard.as_ref() {
            return Ok(browser.clone());
        }

        let binary = self.binary.clone();
        let browser = tokio::task::spawn_blocking(move || launch(binary))
            .await
            .map_err(|e| PdfError::Launch(anyhow::anyhow!(e)))??;

        let browser = Arc::new(browser);
        *guard = Some(browser.clone());
        Ok(browser)
    }
}

#[async_trait]
impl PdfEngine for ChromiumEngine {
    async fn render_pdf(&self, html: &str, setup: &PageSetup) -> Result<Vec<u8>, PdfError> {
        let workspace = tempfile::tempdir()?;
        let page_path = workspace.path().join("page.html");
        tokio::fs::write(&page_path, html).await?;

        let browser = self.browser().await?;
        debug!(footer = ?setup.footer_numbers, "rendering pdf via headless chromium");

        let url = format!("file://{}", page_path.display());
        let options = print_options(setup);
        let render = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<u8>> {
            let tab = browser.new_tab()?;
            tab.navigate_to(&url)?;
            tab.wait_until_navigated()?;
            // Web fonts must be loaded before rasterizing.
            tab.evaluate("document.fonts.ready", true)?;
            let bytes = tab.print_to_pdf(Some(options))?;
            tab.close(true)?;
            Ok(bytes)
        });

        let bytes = match tokio::time::timeout(self.timeout, render).await {
            Ok(joined) => joined
                .map_err(|e| PdfError::Render(anyhow::anyhow!(e)))?
                .map_err(PdfError::Render)?,
            Err(_) => return Err(PdfError::Timeout(self.timeout)),
        };

        info!(bytes = bytes.len(), "rendered pdf");
        Ok(bytes)
    }

    async fn health_check(&self) -> Result<(), PdfError> {
        let browser = self.browser().await?;
        let version = tokio::task::spawn_blocking(move || browser.get_version())
            .await
            .map_err(|e| PdfError::Launch(anyhow::anyhow!(e)))?
            .map_err(PdfError::Launch)?;

        info!(version = %version.product, "pdf engine ready");
        Ok(())
    }

    async fn shutdown(&self) {
        // Dropping the last handle kills the chromium process.
        self.browser.lock().await.take();
        info!("pdf engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn footer_numbers_sit_on_the_requested_side() {
        let right = footer_template(FooterSide::Right);
        assert!(right.contains("text-align:right"));
        assert!(right.contains("<span class=\"pageNumber\"></span>"));
        assert!(right.contains("<span class=\"totalPages\"></span>"));

        let left = footer_template(FooterSide::Left);
        assert!(left.contains("text-align:left"));
    }

    #[test]
    fn print_options_enable_the_footer_per_direction() {
        let rtl = print_options(&PageSetup::for_direction(true));
        assert_eq!(rtl.display_header_footer, Some(true));
        assert_eq!(rtl.landscape, Some(true));
        assert_eq!(rtl.prefer_css_page_size, Some(true));
        assert!(rtl
            .footer_template
            .as_deref()
            .is_some_and(|t| t.contains("text-align:right")));

        let ltr = print_options(&PageSetup::for_direction(false));
        assert!(ltr
            .footer_template
            .as_deref()
            .is_some_and(|t| t.contains("text-align:left")));
    }

    #[test]
    fn margins_convert_to_inches() {
        let options = print_options(&PageSetup::for_direction(true));
        let top = options.margin_top.unwrap();
        let side = options.margin_left.unwrap();
        assert!((top - 12.0 / 25.4).abs() < 1e-9);
        assert!((side - 10.0 / 25.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn health_check_fails_for_missing_binary() {
        let engine = ChromiumEngine::new("/nonexistent/chromium", Duration::from_secs(1));
        let error = engine.health_check().await.unwrap_err();
        assert!(matches!(error, PdfError::Launch(_)));
    }
}
