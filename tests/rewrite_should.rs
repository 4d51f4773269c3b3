use std::sync::Arc;

use api::server::services::rewrite_services::{
    AD_SCRUB_MARKER, AdSignatureMatcher, ContentRewriter, RegexSignatureMatcher, SHIELD_MARKER,
};
use url::Url;

fn rewriter() -> ContentRewriter {
    ContentRewriter::new(Arc::new(
        RegexSignatureMatcher::with_extra(&[]).expect("default signatures compile"),
    ))
}

fn url(raw: &str) -> Url {
    Url::parse(raw).expect("test url parses")
}

#[test]
fn base_tag_follows_first_head_and_uses_effective_url() {
    let html = "<html><HEAD><title>x</title></HEAD><body><head></head></body></html>";
    let effective = url("https://cdn.player.example/embed/movie/550?js=1");

    let outcome = rewriter().rewrite(html, &effective);
    let expected = format!(r#"<HEAD><base href="{}">"#, effective);

    assert!(outcome.head_found);
    assert!(outcome.html.contains(&expected));
    assert_eq!(outcome.html.matches("<base href=").count(), 1);
    assert_eq!(outcome.context.base_url, "https://cdn.player.example/embed/movie/550/");
}

#[test]
fn missing_head_prepends_base_and_leaves_document_alone() {
    let html = "<div id=\"player\">hello</div><script>var ok = 1;</script>";
    let effective = url("https://vidlink.pro/movie/550");

    let outcome = rewriter().rewrite(html, &effective);
    let expected_prefix = format!(r#"<base href="{}">{}"#, effective, html);

    assert!(!outcome.head_found);
    assert!(!outcome.body_found);
    assert!(outcome.html.starts_with(&expected_prefix));
    // the only other change is the shield block tacked on at the end
    assert!(outcome.html.ends_with(ContentRewriter::shield_block()));
}

#[test]
fn ad_scripts_are_replaced_with_the_marker() {
    let html = "<html><head></head><body>\
        <script src=\"player.js\"></script>\
        <script>\n  var s = 'PopAds';\n  load(s);\n</script>\
        <script>console.log('fine')</script>\
        </body></html>";

    let outcome = rewriter().rewrite(html, &url("https://embedmaster.link/movie/1"));

    assert_eq!(outcome.scrubbed, vec!["popads".to_string()]);
    assert!(outcome.html.contains(AD_SCRUB_MARKER));
    assert!(!outcome.html.to_lowercase().contains("popads"));
    assert!(outcome.html.contains("console.log('fine')"));
    assert!(outcome.html.contains("player.js"));
}

#[test]
fn one_marker_per_ad_script_not_one_for_the_whole_span() {
    let html = "<script>adsterra()</script><p>keep me</p><script>monetag()</script>";

    let (stripped, scrubbed) = rewriter().strip_ad_scripts(html);

    assert_eq!(scrubbed, vec!["adsterra".to_string(), "monetag".to_string()]);
    assert_eq!(
        stripped,
        format!("{}<p>keep me</p>{}", AD_SCRUB_MARKER, AD_SCRUB_MARKER)
    );
}

#[test]
fn configured_signatures_are_matched_too() {
    let matcher = RegexSignatureMatcher::with_extra(&["HilltopAds".to_string()]).unwrap();

    assert_eq!(
        matcher.matched_signature("window.hilltopads = {}"),
        Some("hilltopads")
    );
    assert_eq!(matcher.matched_signature("just a player"), None);
}

#[test]
fn rewriting_twice_does_not_stack_injections() {
    let html = "<html><head></head><body><video></video></body></html>";
    let effective = url("https://vidsrc.me/embed/movie?tmdb=550");
    let rewriter = rewriter();

    let once = rewriter.rewrite(html, &effective);
    let twice = rewriter.rewrite(&once.html, &effective);

    assert_eq!(once.html, twice.html);
    assert!(twice.scrubbed.is_empty());
    assert_eq!(twice.html.matches("<base href=").count(), 1);
    // one style and one script carry the marker
    assert_eq!(twice.html.matches(SHIELD_MARKER).count(), 2);
}

#[test]
fn shield_goes_before_closing_body() {
    let html = "<html><head></head><body><p>x</p></BODY></html>";

    let (out, body_found) = ContentRewriter::inject_shield(html);

    assert!(body_found);
    assert!(out.ends_with(&format!("{}</BODY></html>", ContentRewriter::shield_block())));
}

#[test]
fn upstream_scripts_wearing_the_shield_attribute_are_still_scrubbed() {
    let html = "<html><head></head><body><script data-zion-shield>window.popads = 1;</script></body></html>";

    let outcome = rewriter().rewrite(html, &url("https://vidlink.pro/movie/550"));

    assert_eq!(outcome.scrubbed, vec!["popads".to_string()]);
    assert!(outcome.html.contains(AD_SCRUB_MARKER));
    assert!(!outcome.html.to_lowercase().contains("popads"));
}

#[test]
fn shield_attribute_in_page_text_does_not_block_injection() {
    let html = "<html><head></head><body><p>data-zion-shield</p></body></html>";

    let outcome = rewriter().rewrite(html, &url("https://vidlink.pro/movie/550"));

    assert!(outcome.body_found);
    assert!(outcome.html.contains(ContentRewriter::shield_block()));
    assert!(outcome.html.contains("popup blocked"));
}
