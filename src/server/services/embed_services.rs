use std::sync::Arc;

use tracing::Level;

use crate::{
    logger::DynLogSink,
    server::{
        error::{AppResult, Error},
        services::{
            fetch_services::DynUpstreamFetcher,
            rewrite_services::{DynContentRewriter, RewriteOutcome},
        },
        utils::url_utils::UrlUtil,
    },
};

pub type DynEmbedService = Arc<EmbedService>;

#[derive(Debug)]
pub enum EmbedOutcome {
    /// nothing to load, the player gets the black screen
    NoSignal,
    Rendered(RewriteOutcome),
}

/// validate -> fetch -> rewrite, every call starts from scratch and nothing is kept around
pub struct EmbedService {
    fetcher: DynUpstreamFetcher,
    rewriter: DynContentRewriter,
    log: DynLogSink,
}

impl EmbedService {
    pub fn new(fetcher: DynUpstreamFetcher, rewriter: DynContentRewriter, log: DynLogSink) -> Self {
        Self {
            fetcher,
            rewriter,
            log,
        }
    }

    pub async fn render(&self, raw_url: Option<&str>) -> AppResult<EmbedOutcome> {
        let raw_url = raw_url.map(str::trim).unwrap_or("");
        self.log
            .log(Level::DEBUG, &format!("Hit proxy with URL: {}", raw_url));

        if raw_url.is_empty() {
            return Ok(EmbedOutcome::NoSignal);
        }

        let target = UrlUtil::parse_target(raw_url).inspect_err(|_| {
            self.log
                .log(Level::INFO, &format!("Rejected malformed URL: {}", raw_url));
        })?;

        let page = match self.fetcher.fetch(&target).await {
            Ok(page) => page,
            Err(e) => {
                metrics::counter!("embed_upstream_failures_total").increment(1);
                let context = match &e {
                    Error::UpstreamUnavailable(context) => context.clone(),
                    other => other.to_string(),
                };
                self.log.log(
                    Level::WARN,
                    &format!("Upstream fetch for {} failed: {}", target, context),
                );
                return Err(Error::UpstreamUnavailable(context));
            }
        };

        if page.effective_url != page.requested_url {
            self.log.log(
                Level::DEBUG,
                &format!("{} redirected to {}", page.requested_url, page.effective_url),
            );
        }

        let outcome = self.rewriter.rewrite(&page.body, &page.effective_url);

        for signature in &outcome.scrubbed {
            metrics::counter!("embed_ad_scripts_scrubbed_total", "signature" => signature.clone())
                .increment(1);
        }

        if !outcome.head_found || !outcome.body_found {
            self.log.log(
                Level::DEBUG,
                &format!(
                    "Anchors missing for {} (head: {}, body: {}), fell back to prepend/append",
                    page.effective_url, outcome.head_found, outcome.body_found
                ),
            );
        }

        self.log.log(
            Level::DEBUG,
            &format!(
                "Rewrote {} (base {}), scrubbed {} script(s)",
                page.effective_url,
                outcome.context.base_url,
                outcome.scrubbed.len()
            ),
        );

        Ok(EmbedOutcome::Rendered(outcome))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use url::Url;

    use super::*;
    use crate::logger::LogSink;
    use crate::server::services::{
        fetch_services::{MockUpstreamFetcher, UpstreamPage},
        rewrite_services::{ContentRewriter, RegexSignatureMatcher},
    };

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<(Level, String)>>,
    }

    impl LogSink for RecordingSink {
        fn log(&self, level: Level, message: &str) {
            self.lines
                .lock()
                .expect("sink lock")
                .push((level, message.to_string()));
        }
    }

    fn service(fetcher: MockUpstreamFetcher, sink: Arc<RecordingSink>) -> EmbedService {
        let rewriter = Arc::new(ContentRewriter::new(Arc::new(
            RegexSignatureMatcher::with_extra(&[]).unwrap(),
        )));
        EmbedService::new(Arc::new(fetcher), rewriter, sink)
    }

    #[tokio::test]
    async fn empty_url_never_fetches() {
        let mut fetcher = MockUpstreamFetcher::new();
        fetcher.expect_fetch().never();

        let outcome = service(fetcher, Arc::default()).render(Some("  ")).await;
        assert!(matches!(outcome, Ok(EmbedOutcome::NoSignal)));
    }

    #[tokio::test]
    async fn malformed_url_never_fetches() {
        let mut fetcher = MockUpstreamFetcher::new();
        fetcher.expect_fetch().never();

        let outcome = service(fetcher, Arc::default())
            .render(Some("not-a-url"))
            .await;
        assert!(matches!(outcome, Err(Error::InvalidUrl)));
    }

    #[tokio::test]
    async fn base_tag_uses_the_redirected_url() {
        let mut fetcher = MockUpstreamFetcher::new();
        fetcher.expect_fetch().times(1).returning(|url| {
            Ok(UpstreamPage {
                requested_url: url.clone(),
                effective_url: Url::parse("https://cdn.player.example/v2/play.html").unwrap(),
                body: "<html><head><title>p</title></head><body></body></html>".to_string(),
            })
        });

        let sink = Arc::new(RecordingSink::default());
        let outcome = service(fetcher, sink.clone())
            .render(Some("https://player.example/embed/movie/1"))
            .await
            .unwrap();

        let EmbedOutcome::Rendered(outcome) = outcome else {
            panic!("expected a rendered page");
        };
        assert!(
            outcome
                .html
                .contains(r#"<head><base href="https://cdn.player.example/v2/play.html">"#)
        );
        assert!(!outcome.html.contains("https://player.example/embed/movie/1"));

        let lines = sink.lines.lock().unwrap();
        assert!(lines.iter().any(|(_, l)| l.contains("redirected to")));
    }

    #[tokio::test]
    async fn fetch_failures_surface_as_upstream_unavailable() {
        let mut fetcher = MockUpstreamFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Err(Error::UpstreamUnavailable("timed out".to_string())));

        let sink = Arc::new(RecordingSink::default());
        let outcome = service(fetcher, sink.clone())
            .render(Some("https://player.example/embed"))
            .await;

        assert!(matches!(outcome, Err(Error::UpstreamUnavailable(_))));
        let lines = sink.lines.lock().unwrap();
        assert!(
            lines
                .iter()
                .any(|(level, l)| *level == Level::WARN && l.contains("timed out"))
        );
    }
}
