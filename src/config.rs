use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::SeedableRng;

const CAPACITY_ENV: &str = "PERSPECTA_SERIES_CAPACITY";
const SEED_ENV: &str = "PERSPECTA_SERIES_SEED";

/// Initial capacity for series created without an explicit one.
pub fn default_capacity() -> usize {
    static CONFIG: OnceLock<usize> = OnceLock::new();

    *CONFIG.get_or_init(|| {
        let raw = std::env::var(CAPACITY_ENV).ok();
        let parsed = raw.as_deref().and_then(parse_capacity);
        if raw.is_some() && parsed.is_none() {
            log::debug!("ignoring invalid {CAPACITY_ENV}={:?}", raw);
        }
        parsed.unwrap_or(0)
    })
}

/// Seed for position-selection randomness, when reproducible picks are wanted.
pub fn configured_seed() -> Option<u64> {
    static CONFIG: OnceLock<Option<u64>> = OnceLock::new();

    *CONFIG.get_or_init(|| {
        let raw = std::env::var(SEED_ENV).ok()?;
        let parsed = parse_seed(&raw);
        if parsed.is_none() {
            log::debug!("ignoring invalid {SEED_ENV}={raw:?}");
        }
        parsed
    })
}

pub fn default_rng() -> StdRng {
    match configured_seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn parse_capacity(raw: &str) -> Option<usize> {
    let value = raw.trim().parse::<usize>().ok()?;
    if value == 0 {
        return None;
    }
    Some(value)
}

fn parse_seed(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}
