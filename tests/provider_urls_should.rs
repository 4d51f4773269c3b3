use api::player::providers::ProviderRegistry;
use api::server::utils::url_utils::UrlUtil;

#[test]
fn movie_urls_for_every_provider() {
    let registry = ProviderRegistry::default();

    let urls: Vec<String> = registry
        .all()
        .iter()
        .map(|p| p.get_url(550, None, None))
        .collect();

    assert_eq!(
        urls,
        vec![
            "https://embedmaster.link/movie/550?js=1&controls=0",
            "https://vidsrc.me/embed/movie?tmdb=550&js=1",
            "https://vidlink.pro/movie/550?js=1&controls=0",
        ]
    );
}

#[test]
fn tv_urls_need_both_season_and_episode() {
    let registry = ProviderRegistry::default();
    let vidsrc = registry.get("vidsrc_me").unwrap();

    assert_eq!(
        vidsrc.get_url(1399, Some(2), Some(5)),
        "https://vidsrc.me/embed/tv?tmdb=1399&season=2&episode=5&js=1"
    );
    // half a tv key falls back to the movie form
    assert_eq!(
        vidsrc.get_url(1399, Some(2), None),
        "https://vidsrc.me/embed/movie?tmdb=1399&js=1"
    );
}

#[test]
fn primary_is_first_in_picker_order() {
    let registry = ProviderRegistry::default();

    assert_eq!(registry.primary().map(|p| p.id), Some("embedmaster"));
    assert!(registry.get("missing").is_none());
}

#[test]
fn every_provider_url_passes_through_the_embed_route() {
    let registry = ProviderRegistry::default();

    for provider in registry.all() {
        let url = provider.get_url(1399, Some(1), Some(1));
        assert!(UrlUtil::parse_target(&url).is_ok());

        let proxied = UrlUtil::proxied(&url);
        assert!(proxied.starts_with("/api/v1/embed?url=https%3A%2F%2F"));
    }
}
