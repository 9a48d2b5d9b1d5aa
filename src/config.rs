use std::sync::OnceLock;
use std::time::Duration;

static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Whether the process runs with production strictness. Defaults to
/// strict until `Config::load` has spoken.
pub fn production() -> bool {
    *PRODUCTION.get().unwrap_or(&true)
}

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub production: bool,
    /// Allowed CORS origins; empty means any. Entries ending in `*`
    /// match by prefix.
    pub origins: Vec<String>,
    pub level: log::LevelFilter,
    pub square_key: Option<String>,
    pub ai_deadline: Duration,
    pub ai_depth: u8,
    pub cache_ceiling: usize,
    pub room_ttl: Duration,
    pub reap_interval: Duration,
    pub linger: Duration,
    pub heartbeat: Duration,
    pub pacing: Duration,
    pub outbox_capacity: usize,
    pub rate_limit: u32,
    pub rate_window: Duration,
}

impl Config {
    pub fn load() -> Self {
        let production = var("NODE_ENV").is_some_and(|env| env == "production");
        PRODUCTION.set(production).ok();
        Self {
            port: var("PORT")
                .or_else(|| var("WEBHOOK_PORT"))
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            production,
            origins: var("ALLOWED_ORIGINS")
                .or_else(|| var("CORS_ORIGIN"))
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            level: var("LOG_LEVEL")
                .as_deref()
                .map(level)
                .unwrap_or(log::LevelFilter::Info),
            square_key: var("SQUARE_WEBHOOK_SIGNATURE_KEY"),
            ai_deadline: var("AI_DEADLINE_MS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(crate::SEARCH_DEADLINE_MS)),
            ai_depth: crate::SEARCH_DEPTH,
            cache_ceiling: crate::CACHE_CEILING,
            room_ttl: Duration::from_secs(crate::ROOM_TTL_SECS),
            reap_interval: var("REAP_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(crate::REAP_INTERVAL_SECS)),
            linger: Duration::from_secs(crate::TERMINAL_LINGER_SECS),
            heartbeat: Duration::from_secs(crate::HEARTBEAT_SECS),
            pacing: Duration::from_millis(crate::PACING_DELAY_MS),
            outbox_capacity: crate::OUTBOX_CAPACITY,
            rate_limit: crate::RATE_LIMIT_REQUESTS,
            rate_window: Duration::from_secs(crate::RATE_LIMIT_WINDOW_SECS),
        }
    }

    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.origins.is_empty() || origin_match(&self.origins, origin)
    }
}

/// CORS origin test: exact entries match whole, entries ending in `*`
/// match by prefix.
pub fn origin_match(origins: &[String], origin: &str) -> bool {
    origins.iter().any(|entry| match entry.strip_suffix('*') {
        Some(prefix) => origin.starts_with(prefix),
        None => origin == entry,
    })
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn level(name: &str) -> log::LevelFilter {
    match name {
        "debug" => log::LevelFilter::Debug,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}
