use crate::cli::TableArgs;
use pontoon_engine::rules::Rules;
use serde::{Deserialize, Serialize};
use std::fs;

/// Settings shared by the table commands. Rule overrides are applied on top
/// of the named preset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub rules: String,
    pub decks: Option<u8>,
    pub h17: Option<bool>,
    pub penetration: Option<f64>,
    pub strategy: String,
    pub bankroll: f64,
    pub bet: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub rules: ValueSource,
    pub decks: ValueSource,
    pub h17: ValueSource,
    pub penetration: ValueSource,
    pub strategy: ValueSource,
    pub bankroll: ValueSource,
    pub bet: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            rules: ValueSource::Default,
            decks: ValueSource::Default,
            h17: ValueSource::Default,
            penetration: ValueSource::Default,
            strategy: ValueSource::Default,
            bankroll: ValueSource::Default,
            bet: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl ConfigResolved {
    /// Applies command-line flags on top of file and environment values.
    pub fn apply_cli(mut self, args: &TableArgs) -> Result<Self, ConfigError> {
        if let Some(v) = args.seed {
            self.config.seed = Some(v);
            self.sources.seed = ValueSource::Cli;
        }
        if let Some(v) = &args.rules {
            self.config.rules = v.clone();
            self.sources.rules = ValueSource::Cli;
        }
        if let Some(v) = args.decks {
            self.config.decks = Some(v);
            self.sources.decks = ValueSource::Cli;
        }
        if let Some(v) = &args.strategy {
            self.config.strategy = v.clone();
            self.sources.strategy = ValueSource::Cli;
        }
        if let Some(v) = args.bankroll {
            self.config.bankroll = v;
            self.sources.bankroll = ValueSource::Cli;
        }
        if let Some(v) = args.bet {
            self.config.bet = v;
            self.sources.bet = ValueSource::Cli;
        }
        validate(&self.config)?;
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            rules: "default".into(),
            decks: None,
            h17: None,
            penetration: None,
            strategy: "basic".into(),
            bankroll: 1_000.0,
            bet: 10.0,
        }
    }
}

impl Config {
    /// The preset named by `rules` with the deck, soft-17 and penetration
    /// overrides applied, validated.
    pub fn table_rules(&self) -> Result<Rules, ConfigError> {
        let mut rules = Rules::by_name(&self.rules)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown rules preset '{}'", self.rules)))?;
        if let Some(d) = self.decks {
            rules.num_decks = d;
        }
        if let Some(h) = self.h17 {
            rules.dealer_hit_soft_17 = h;
        }
        if let Some(p) = self.penetration {
            rules.penetration = p;
        }
        rules
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

/// Resolves the configuration from `PONTOON_CONFIG` and the `PONTOON_*`
/// environment overrides.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    load_from(|key| std::env::var(key).ok())
}

/// Same as [`load_with_sources`] with the environment supplied by `env`.
pub fn load_from<F>(env: F) -> Result<ConfigResolved, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();
    let var = |key: &str| env(key).filter(|v| !v.is_empty());

    if let Some(path) = var("PONTOON_CONFIG") {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.rules {
            cfg.rules = v;
            sources.rules = ValueSource::File;
        }
        if let Some(v) = f.decks {
            cfg.decks = Some(v);
            sources.decks = ValueSource::File;
        }
        if let Some(v) = f.h17 {
            cfg.h17 = Some(v);
            sources.h17 = ValueSource::File;
        }
        if let Some(v) = f.penetration {
            cfg.penetration = Some(v);
            sources.penetration = ValueSource::File;
        }
        if let Some(v) = f.strategy {
            cfg.strategy = v;
            sources.strategy = ValueSource::File;
        }
        if let Some(v) = f.bankroll {
            cfg.bankroll = v;
            sources.bankroll = ValueSource::File;
        }
        if let Some(v) = f.bet {
            cfg.bet = v;
            sources.bet = ValueSource::File;
        }
    }

    if let Some(seed) = var("PONTOON_SEED") {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed '{}'", seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(decks) = var("PONTOON_DECKS") {
        cfg.decks = Some(
            decks
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid decks '{}'", decks)))?,
        );
        sources.decks = ValueSource::Env;
    }
    if let Some(h17) = var("PONTOON_H17") {
        cfg.h17 = Some(
            parse_bool(&h17).ok_or_else(|| ConfigError::Invalid(format!("Invalid h17 '{}'", h17)))?,
        );
        sources.h17 = ValueSource::Env;
    }
    if let Some(pen) = var("PONTOON_PENETRATION") {
        cfg.penetration = Some(
            pen.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid penetration '{}'", pen)))?,
        );
        sources.penetration = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    rules: Option<String>,
    #[serde(default)]
    decks: Option<u8>,
    #[serde(default)]
    h17: Option<bool>,
    #[serde(default)]
    penetration: Option<f64>,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    bankroll: Option<f64>,
    #[serde(default)]
    bet: Option<f64>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.table_rules()?;
    if pontoon_ai::create_strategy(&cfg.strategy).is_err() {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: unknown strategy '{}'",
            cfg.strategy
        )));
    }
    if !(cfg.bankroll.is_finite() && cfg.bankroll > 0.0) {
        return Err(ConfigError::Invalid(
            "Invalid configuration: bankroll must be > 0".into(),
        ));
    }
    if !(cfg.bet.is_finite() && cfg.bet > 0.0) {
        return Err(ConfigError::Invalid(
            "Invalid configuration: bet must be > 0".into(),
        ));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
