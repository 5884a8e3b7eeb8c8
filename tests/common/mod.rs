//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use atlas_quiz::catalog::{Country, CountryCatalog, IsoCodes};
use atlas_quiz::core::types::{Coords, CountryId};
use atlas_quiz::core::GameConfig;
use atlas_quiz::game::{ClickedRegion, GameEvent, GameSession};
use atlas_quiz::storage::{KeyValueStore, MemoryStore};

/// Countries "Country 0".."Country n-1" with codes Cn / CCn
pub fn catalog(n: u32) -> Arc<CountryCatalog> {
    let countries = (0..n)
        .map(|i| {
            Country::new(
                CountryId(i),
                format!("Country {}", i),
                Coords::new(i as f64, i as f64 * 2.0),
                IsoCodes::new(Some(&format!("C{}", i)), Some(&format!("CC{}", i))),
            )
        })
        .collect();
    Arc::new(CountryCatalog::new(countries).unwrap())
}

pub fn session_with(n: u32, config: GameConfig) -> GameSession {
    session_with_store(n, config, Box::new(MemoryStore::new()))
}

pub fn session_with_store(n: u32, config: GameConfig, store: Box<dyn KeyValueStore>) -> GameSession {
    GameSession::new(catalog(n), config, store, 1234)
}

pub fn session(n: u32) -> GameSession {
    session_with(n, GameConfig::default())
}

/// Run past the loader so clicks are accepted
pub fn finish_loading(s: &mut GameSession) {
    let loader = s.config().loader_delay();
    s.advance_by(loader);
}

pub fn target_name(s: &GameSession) -> String {
    s.active_country().expect("no active country").display_name.clone()
}

pub fn click_target(s: &mut GameSession) {
    let name = target_name(s);
    s.click_country(&ClickedRegion::named(name));
}

pub fn click_wrong(s: &mut GameSession) {
    let target = s.active_country().expect("no active country").id;
    let name = s
        .catalog()
        .iter()
        .find(|c| c.id != target)
        .expect("catalog needs two countries")
        .display_name
        .clone();
    s.click_country(&ClickedRegion::named(name));
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

pub fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}
