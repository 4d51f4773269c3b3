use serde::Serialize;

/// who the shield belongs to, any change here is a fresh mount
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShieldKey {
    pub provider_id: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl ShieldKey {
    pub fn new(provider_id: impl Into<String>, season: Option<u32>, episode: Option<u32>) -> Self {
        Self {
            provider_id: provider_id.into(),
            season,
            episode,
        }
    }

    /// same shape the player uses for the iframe key, `vidlink-1-3` or `vidlink-movie`
    pub fn mount_id(&self) -> String {
        match (self.season, self.episode) {
            (Some(s), Some(e)) => format!("{}-{}-{}", self.provider_id, s, e),
            _ => format!("{}-movie", self.provider_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShieldPhase {
    Armed,
    Disarmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// swallowed, default action and propagation both stopped
    Absorbed,
    /// handed to the iframe untouched
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShieldState {
    clicks_absorbed: u32,
    threshold: u32,
    phase: ShieldPhase,
}

impl ShieldState {
    /// a threshold of 0 would mean "never armed" which no provider wants, it's bumped to 1
    pub fn armed(threshold: u32) -> Self {
        Self {
            clicks_absorbed: 0,
            threshold: threshold.max(1),
            phase: ShieldPhase::Armed,
        }
    }

    pub fn click(&mut self) -> ClickOutcome {
        match self.phase {
            ShieldPhase::Disarmed => ClickOutcome::Delivered,
            ShieldPhase::Armed => {
                self.clicks_absorbed += 1;
                if self.clicks_absorbed >= self.threshold {
                    self.phase = ShieldPhase::Disarmed;
                }
                ClickOutcome::Absorbed
            }
        }
    }

    pub fn clicks_absorbed(&self) -> u32 {
        self.clicks_absorbed
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn phase(&self) -> ShieldPhase {
        self.phase
    }

    pub fn is_armed(&self) -> bool {
        self.phase == ShieldPhase::Armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_one_disarms_on_first_click() {
        let mut shield = ShieldState::armed(1);

        assert_eq!(shield.click(), ClickOutcome::Absorbed);
        assert_eq!(shield.phase(), ShieldPhase::Disarmed);
        assert_eq!(shield.click(), ClickOutcome::Delivered);
    }

    #[test]
    fn zero_threshold_still_eats_one_click() {
        let mut shield = ShieldState::armed(0);

        assert_eq!(shield.threshold(), 1);
        assert_eq!(shield.click(), ClickOutcome::Absorbed);
        assert_eq!(shield.click(), ClickOutcome::Delivered);
    }

    #[test]
    fn delivered_clicks_do_not_count() {
        let mut shield = ShieldState::armed(1);
        shield.click();
        shield.click();
        shield.click();

        assert_eq!(shield.clicks_absorbed(), 1);
    }

    #[test]
    fn mount_ids_match_the_iframe_key() {
        assert_eq!(ShieldKey::new("vidlink", Some(1), Some(3)).mount_id(), "vidlink-1-3");
        assert_eq!(ShieldKey::new("vidlink", None, None).mount_id(), "vidlink-movie");
    }
}
