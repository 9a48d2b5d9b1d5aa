pub mod board;
pub mod config;
pub mod error;
pub mod event;
pub mod hosting;
pub mod operator;
pub mod play;
pub mod registry;
pub mod search;

/// board geometry
pub const SIZE: usize = 15;
pub const WIN: usize = 5;
pub const CENTER: usize = SIZE / 2;

// search parameters
const SEARCH_WIDTH: usize = 12;
const SEARCH_DEPTH: u8 = 4;
const SEARCH_DEADLINE_MS: u64 = 1_000;
const CACHE_CEILING: usize = 100_000;
const BOOK_MOVES: u32 = 8;

// session lifecycle parameters
const ROOM_TTL_SECS: u64 = 1_800;
const REAP_INTERVAL_SECS: u64 = 300;
const TERMINAL_LINGER_SECS: u64 = 300;
const HEARTBEAT_SECS: u64 = 60;
const OUTBOX_CAPACITY: usize = 64;
const PACING_DELAY_MS: u64 = 400;

// request throttling parameters
const RATE_LIMIT_WINDOW_SECS: u64 = 60;
const RATE_LIMIT_REQUESTS: u32 = 60;

/// wall clock in unix millis, the time unit of every wire timestamp
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_millis() as u64
}

/// initialize logging
pub fn init(level: log::LevelFilter) {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}
