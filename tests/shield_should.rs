use api::player::{
    MediaKind, SessionError, Transition, WatchAction, WatchSession,
    providers::ProviderRegistry,
    shield::{ClickOutcome, ShieldPhase, ShieldState},
};

#[test]
fn threshold_two_needs_two_absorbed_clicks() {
    let mut shield = ShieldState::armed(2);

    assert_eq!(shield.click(), ClickOutcome::Absorbed);
    assert!(shield.is_armed());
    // second click is still eaten
    assert_eq!(shield.click(), ClickOutcome::Absorbed);
    assert_eq!(shield.phase(), ShieldPhase::Disarmed);
    assert_eq!(shield.clicks_absorbed(), 2);

    assert_eq!(shield.click(), ClickOutcome::Delivered);
    assert_eq!(shield.clicks_absorbed(), 2);
}

#[test]
fn changing_season_rearms_a_disarmed_shield() {
    let registry = ProviderRegistry::default();
    let mut session = WatchSession::open(&registry, 1399, MediaKind::Tv).unwrap();
    session
        .apply(&registry, WatchAction::SelectProvider("vidlink".to_string()))
        .unwrap();

    session.apply(&registry, WatchAction::Click).unwrap();
    session.apply(&registry, WatchAction::Click).unwrap();
    assert_eq!(session.shield().phase(), ShieldPhase::Disarmed);

    let transition = session
        .apply(&registry, WatchAction::SelectSeason(2))
        .unwrap();

    assert_eq!(transition, Transition::Remounted);
    assert_eq!(session.shield().phase(), ShieldPhase::Armed);
    assert_eq!(session.shield().clicks_absorbed(), 0);
    assert_eq!(session.key().mount_id(), "vidlink-2-1");
}

#[test]
fn reselecting_the_same_episode_keeps_the_shield() {
    let registry = ProviderRegistry::default();
    let mut session = WatchSession::open(&registry, 1399, MediaKind::Tv).unwrap();

    session.apply(&registry, WatchAction::Click).unwrap();
    let transition = session
        .apply(&registry, WatchAction::SelectEpisode(1))
        .unwrap();

    assert_eq!(transition, Transition::Unchanged);
    assert_eq!(session.shield().phase(), ShieldPhase::Disarmed);
}

#[test]
fn movies_ignore_season_changes() {
    let registry = ProviderRegistry::default();
    let mut session = WatchSession::open(&registry, 550, MediaKind::Movie).unwrap();

    let transition = session
        .apply(&registry, WatchAction::SelectSeason(3))
        .unwrap();

    assert_eq!(transition, Transition::Unchanged);
    assert_eq!(session.key().mount_id(), "embedmaster-movie");
}

#[test]
fn unknown_provider_is_rejected_and_session_is_untouched() {
    let registry = ProviderRegistry::default();
    let mut session = WatchSession::open(&registry, 550, MediaKind::Movie).unwrap();

    let err = session
        .apply(&registry, WatchAction::SelectProvider("nope".to_string()))
        .unwrap_err();

    assert_eq!(err, SessionError::UnknownProvider("nope".to_string()));
    assert_eq!(session.provider().id, "embedmaster");
}

#[test]
fn empty_registry_cannot_open_a_session() {
    let registry = ProviderRegistry::new(Vec::new());

    assert_eq!(
        WatchSession::open(&registry, 550, MediaKind::Movie).unwrap_err(),
        SessionError::NoProviders
    );
}

#[test]
fn season_and_episode_zero_are_rejected_without_remounting() {
    let registry = ProviderRegistry::default();
    let mut session = WatchSession::open(&registry, 1399, MediaKind::Tv).unwrap();
    session.apply(&registry, WatchAction::Click).unwrap();

    assert_eq!(
        session.apply(&registry, WatchAction::SelectSeason(0)),
        Err(SessionError::InvalidSeason)
    );
    assert_eq!(
        session.apply(&registry, WatchAction::SelectEpisode(0)),
        Err(SessionError::InvalidEpisode)
    );

    assert_eq!(session.key().mount_id(), "embedmaster-1-1");
    assert_eq!(session.shield().phase(), ShieldPhase::Disarmed);
}
