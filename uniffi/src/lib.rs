uniffi::setup_scaffolding!();

/// Errors returned by extraction.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum CetdError {
    #[error("{reason}")]
    InvalidTree { reason: String },
    #[error("{reason}")]
    InvalidConfig { reason: String },
}

impl From<cetd::CetdError> for CetdError {
    fn from(e: cetd::CetdError) -> Self {
        let reason = e.to_string();
        match e {
            cetd::CetdError::InvalidTree(_) => CetdError::InvalidTree { reason },
            cetd::CetdError::InvalidConfig(_) => CetdError::InvalidConfig { reason },
        }
    }
}

/// Scoring formula used to pick the content region.
#[derive(uniffi::Enum)]
pub enum ScorerKind {
    Basic,
    Variant,
}

/// Extraction settings.
#[derive(uniffi::Record)]
pub struct Config {
    pub scorer: ScorerKind,
    pub expansion_threshold_factor: f64,
    pub excluded_tags: Vec<String>,
    pub link_tags: Vec<String>,
    pub skip_hidden: bool,
    pub pass_through_wrappers: bool,
}

/// Returns the default configuration.
#[uniffi::export]
pub fn default_config() -> Config {
    let d = cetd::Config::default();
    Config {
        scorer: convert_scorer(d.scorer),
        expansion_threshold_factor: d.expansion_threshold_factor,
        excluded_tags: d.excluded_tags,
        link_tags: d.link_tags,
        skip_hidden: d.skip_hidden,
        pass_through_wrappers: d.pass_through_wrappers,
    }
}

/// Extract the main-content text with the default config.
#[uniffi::export]
pub fn extract_text(html: String) -> Result<String, CetdError> {
    Ok(cetd::extract_text(&html, &cetd::Config::default())?)
}

/// Extract the main-content text with a custom config.
#[uniffi::export]
pub fn extract_text_with(html: String, config: Config) -> Result<String, CetdError> {
    Ok(cetd::extract_text(&html, &to_core_config(config))?)
}

// --- Internal conversion helpers ---

fn to_core_config(c: Config) -> cetd::Config {
    let scorer = match c.scorer {
        ScorerKind::Basic => cetd::ScorerKind::Basic,
        ScorerKind::Variant => cetd::ScorerKind::Variant,
    };
    cetd::Config::default()
        .with_scorer(scorer)
        .with_expansion_threshold_factor(c.expansion_threshold_factor)
        .with_excluded_tags(c.excluded_tags)
        .with_link_tags(c.link_tags)
        .with_skip_hidden(c.skip_hidden)
        .with_pass_through_wrappers(c.pass_through_wrappers)
}

fn convert_scorer(kind: cetd::ScorerKind) -> ScorerKind {
    match kind {
        cetd::ScorerKind::Basic => ScorerKind::Basic,
        cetd::ScorerKind::Variant => ScorerKind::Variant,
    }
}
