// the html rewrite that sits between the player host and the iframe
//
// nothing here parses html, it's string surgery on purpose: upstream markup is frequently broken
// and whatever comes in broken goes out broken
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Regex, RegexSet, RegexSetBuilder};
use url::Url;

pub const AD_SCRUB_MARKER: &str = "<!-- AD SCRUBBED -->";

/// attribute on the injected style and script, purely a label. idempotence is checked against the
/// exact injected bytes since upstream markup can carry this attribute as well
pub const SHIELD_MARKER: &str = "data-zion-shield";

/// known ad network names and popup tricks seen inside player pages, order matters because the
/// first hit is what gets reported
pub const DEFAULT_AD_SIGNATURES: [&str; 6] = [
    "popads",
    "propeller",
    "adsterra",
    "onmousedown",
    "monetag",
    "window.open",
];

lazy_static! {
    static ref SCRIPT_BLOCK: Regex = Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>")
        .expect("Static script regex should compile");
    static ref SHIELD_STYLE: String = format!(
        r#"<style {marker}>
    html, body {{
        margin: 0 !important;
        padding: 0 !important;
        width: 100vw !important;
        height: 100vh !important;
        overflow: hidden !important;
        background: black !important;
    }}
    #ad, .ad, [id*="banner"], [class*="banner"], [id*="pop"], [class*="pop"] {{
        display: none !important;
        visibility: hidden !important;
        pointer-events: none !important;
    }}
    video, iframe, #player {{
        position: relative !important;
        z-index: 9999 !important;
    }}
</style>"#,
        marker = SHIELD_MARKER
    );
    static ref SHIELD_SCRIPT: String = format!(
        r#"<script {marker}>
    (function () {{
        window.open = function () {{
            console.log("[zion] popup blocked");
            return null;
        }};
        window.onbeforeunload = function () {{
            return false;
        }};
        setInterval(function () {{
            document
                .querySelectorAll('iframe[src*="ad"], div[style*="z-index: 2147483647"]')
                .forEach(function (el) {{ el.remove(); }});
        }}, 1000);
    }})();
</script>"#,
        marker = SHIELD_MARKER
    );
    static ref SHIELD_BLOCK: String = format!("{}\n{}\n", *SHIELD_STYLE, *SHIELD_SCRIPT);
}

pub type DynAdSignatureMatcher = Arc<dyn AdSignatureMatcher + Send + Sync>;

/// decides whether a script body is an ad. the regex list is a blocklist and will always miss
/// obfuscated scripts, anything smarter only has to implement this
pub trait AdSignatureMatcher {
    /// the signature that flagged this body, first in list order
    fn matched_signature(&self, script_body: &str) -> Option<&str>;
}

pub struct RegexSignatureMatcher {
    signatures: Vec<String>,
    set: RegexSet,
}

impl RegexSignatureMatcher {
    pub fn new<I, S>(signatures: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let signatures: Vec<String> = signatures
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let set = RegexSetBuilder::new(signatures.iter().map(|s| regex::escape(s)))
            .case_insensitive(true)
            .multi_line(true)
            .build()?;

        Ok(Self { signatures, set })
    }

    /// built in list plus whatever the config adds, duplicates are dropped
    pub fn with_extra(extra: &[String]) -> Result<Self, regex::Error> {
        let mut signatures: Vec<String> =
            DEFAULT_AD_SIGNATURES.iter().map(|s| s.to_string()).collect();

        for signature in extra {
            let signature = signature.trim().to_ascii_lowercase();
            if !signature.is_empty() && !signatures.contains(&signature) {
                signatures.push(signature);
            }
        }

        Self::new(signatures)
    }

    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }
}

impl AdSignatureMatcher for RegexSignatureMatcher {
    fn matched_signature(&self, script_body: &str) -> Option<&str> {
        // set indices come back sorted so the first one is the earliest signature in the list
        self.set
            .matches(script_body)
            .iter()
            .next()
            .map(|idx| self.signatures[idx].as_str())
    }
}

/// pieces of the post redirect url, never the url the player asked for
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteContext {
    pub effective_url: Url,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub base_url: String,
}

impl RewriteContext {
    pub fn from_effective_url(effective_url: &Url) -> Self {
        let path = effective_url.path().to_string();

        // "/embed/play.html" -> "/embed/", "/embed/movie" -> "/embed/movie/", "" or "/" -> "/"
        let directory = match path.rsplit_once('/') {
            Some((dir, last)) if last.contains('.') => format!("{}/", dir),
            Some((_, "")) => path.clone(),
            Some(_) => format!("{}/", path),
            None => "/".to_string(),
        };

        Self {
            effective_url: effective_url.clone(),
            scheme: effective_url.scheme().to_string(),
            host: effective_url.host_str().unwrap_or("").to_string(),
            path,
            base_url: format!(
                "{}{}",
                effective_url.origin().ascii_serialization(),
                directory
            ),
        }
    }

    pub fn base_tag(&self) -> String {
        format!(r#"<base href="{}">"#, self.effective_url)
    }
}

#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub html: String,
    pub context: RewriteContext,
    /// one entry per removed script, the signature that caught it
    pub scrubbed: Vec<String>,
    pub head_found: bool,
    pub body_found: bool,
}

pub type DynContentRewriter = Arc<ContentRewriter>;

pub struct ContentRewriter {
    matcher: DynAdSignatureMatcher,
}

impl ContentRewriter {
    pub fn new(matcher: DynAdSignatureMatcher) -> Self {
        Self { matcher }
    }

    /// strip ads, pin relative urls to the effective url, then bolt on the css/js kill switch
    pub fn rewrite(&self, html: &str, effective_url: &Url) -> RewriteOutcome {
        let context = RewriteContext::from_effective_url(effective_url);

        let (stripped, scrubbed) = self.strip_ad_scripts(html);
        let (with_base, head_found) = Self::inject_base_tag(&stripped, &context);
        let (html, body_found) = Self::inject_shield(&with_base);

        RewriteOutcome {
            html,
            context,
            scrubbed,
            head_found,
            body_found,
        }
    }

    pub fn strip_ad_scripts(&self, html: &str) -> (String, Vec<String>) {
        let mut scrubbed = Vec::new();

        let stripped = SCRIPT_BLOCK.replace_all(html, |caps: &regex::Captures| {
            // our own kill switch overrides window.open, only the exact injected bytes are spared
            if &caps[0] == SHIELD_SCRIPT.as_str() {
                return caps[0].to_string();
            }

            match self.matcher.matched_signature(&caps[2]) {
                Some(signature) => {
                    scrubbed.push(signature.to_string());
                    AD_SCRUB_MARKER.to_string()
                }
                None => caps[0].to_string(),
            }
        });

        (stripped.into_owned(), scrubbed)
    }

    /// returns whether a `<head>` anchor was found, no anchor means the tag goes up front
    pub fn inject_base_tag(html: &str, context: &RewriteContext) -> (String, bool) {
        let base_tag = context.base_tag();

        match find_ignore_case(html, "<head>") {
            Some(idx) => {
                let after_head = idx + "<head>".len();

                if html[after_head..].starts_with(&base_tag) {
                    return (html.to_string(), true);
                }

                let mut out = String::with_capacity(html.len() + base_tag.len());
                out.push_str(&html[..after_head]);
                out.push_str(&base_tag);
                out.push_str(&html[after_head..]);
                (out, true)
            }
            None => {
                if html.starts_with(&base_tag) {
                    return (html.to_string(), false);
                }
                (format!("{}{}", base_tag, html), false)
            }
        }
    }

    /// returns whether a `</body>` anchor was found, no anchor means the block is appended
    pub fn inject_shield(html: &str) -> (String, bool) {
        let body_idx = find_ignore_case(html, "</body>");

        // the marker alone proves nothing, upstream pages can carry it too
        if html.contains(SHIELD_BLOCK.as_str()) {
            return (html.to_string(), body_idx.is_some());
        }

        match body_idx {
            Some(idx) => {
                let mut out = String::with_capacity(html.len() + SHIELD_BLOCK.len());
                out.push_str(&html[..idx]);
                out.push_str(&SHIELD_BLOCK);
                out.push_str(&html[idx..]);
                (out, true)
            }
            None => (format!("{}{}", html, *SHIELD_BLOCK), false),
        }
    }

    pub fn shield_block() -> &'static str {
        &SHIELD_BLOCK
    }
}

// ascii lowercasing keeps byte offsets identical so the index is valid in the original string
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}
