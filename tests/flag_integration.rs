//! Integration tests for flag rounds
//!
//! Lookups are answered from a `StaticLookup` by hand, so each test
//! controls exactly when and how every flag choice resolves.

mod common;

use atlas_quiz::core::types::{Difficulty, GuessOutcome, TimerRole};
use atlas_quiz::game::{
    ChoiceMark, FlagRound, GameEvent, GameSession, LookupApplied, LookupPurpose, LookupRequest,
    Mode,
};
use atlas_quiz::lookup::StaticLookup;

use common::*;

/// Answer every outstanding request from the lookup
fn answer_all(s: &mut GameSession, lookup: &StaticLookup) -> Vec<LookupApplied> {
    let mut applied = Vec::new();
    loop {
        let requests = s.drain_requests();
        if requests.is_empty() {
            return applied;
        }
        for request in requests {
            applied.push(s.complete_lookup(request.token, lookup.get(&request.code)));
        }
    }
}

fn ready_round(s: &mut GameSession) -> FlagRound {
    s.drain_events()
        .into_iter()
        .rev()
        .find_map(|e| match e {
            GameEvent::FlagRoundReady(round) => Some(round),
            _ => None,
        })
        .expect("no flag round ready")
}

#[test]
fn test_round_has_three_distinct_choices() {
    let mut s = session(8);
    let lookup = StaticLookup::from_catalog(s.catalog());

    s.enter_flag_mode();
    assert_eq!(s.mode(), Mode::Flags);
    assert_eq!(s.pending_lookups(), 3);
    answer_all(&mut s, &lookup);
    assert_eq!(s.pending_lookups(), 0);
    let round = ready_round(&mut s);

    assert_eq!(round.choices.len(), 3);
    let mut ids: Vec<_> = round.choices.iter().map(|c| c.country).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&round.target_country()));
    assert!(round.choices.iter().all(|c| c.mark == ChoiceMark::Unmarked));
}

#[test]
fn test_correct_flag_then_new_round_after_delay() {
    let mut s = session(8);
    let lookup = StaticLookup::from_catalog(s.catalog());
    s.enter_flag_mode();
    answer_all(&mut s, &lookup);
    let round = ready_round(&mut s);

    let code = round.target().detail.cca2.clone();
    s.click_flag(&code);
    let events = s.drain_events();
    assert!(events.contains(&GameEvent::FlagGuessResolved {
        outcome: GuessOutcome::Correct,
        target: round.target_country(),
        clicked: round.target_country(),
    }));

    // Locked until replaced
    s.click_flag(&code);
    assert!(s.drain_events().is_empty());

    let marked = s.flag_round().unwrap();
    for choice in &marked.choices {
        let expected = if choice.country == round.target_country() {
            ChoiceMark::Correct
        } else {
            ChoiceMark::Wrong
        };
        assert_eq!(choice.mark, expected);
    }

    s.advance_by(ms(2999));
    assert!(s.drain_requests().is_empty());
    s.advance_by(ms(1));
    assert_eq!(s.drain_requests().len(), 3);
    assert!(s.flag_round().is_none());
}

#[test]
fn test_wrong_flag_reveals_target() {
    let mut s = session(8);
    let lookup = StaticLookup::from_catalog(s.catalog());
    s.enter_flag_mode();
    answer_all(&mut s, &lookup);
    let round = ready_round(&mut s);

    let wrong = round
        .choices
        .iter()
        .find(|c| c.country != round.target_country())
        .unwrap();
    let code = wrong.detail.cca3.clone().unwrap();
    s.click_flag(&code);

    assert!(s.drain_events().contains(&GameEvent::FlagGuessResolved {
        outcome: GuessOutcome::Incorrect,
        target: round.target_country(),
        clicked: wrong.country,
    }));
}

#[test]
fn test_unmatched_code_ignored() {
    let mut s = session(8);
    let lookup = StaticLookup::from_catalog(s.catalog());
    s.enter_flag_mode();
    answer_all(&mut s, &lookup);
    ready_round(&mut s);

    s.click_flag("ZZZ");
    assert!(s.drain_events().is_empty());
    assert!(!s.flag_round().unwrap().is_resolved());
}

#[test]
fn test_failed_lookup_resamples() {
    let mut s = session(8);
    s.enter_flag_mode();
    let requests = s.drain_requests();
    let failing = requests[0].code.clone();
    let lookup = StaticLookup::from_catalog(s.catalog()).with_failure(&failing);

    for request in requests {
        s.complete_lookup(request.token, lookup.get(&request.code));
    }
    let replacement = s.drain_requests();
    assert_eq!(replacement.len(), 1);
    assert_ne!(replacement[0].code, failing);

    answer_all_from(&mut s, &lookup, replacement);
    let round = ready_round(&mut s);
    assert!(round.choices.iter().all(|c| c.detail.cca2 != failing));
}

fn answer_all_from(
    s: &mut GameSession,
    lookup: &StaticLookup,
    requests: Vec<LookupRequest>,
) {
    for request in requests {
        s.complete_lookup(request.token, lookup.get(&request.code));
    }
    answer_all(s, lookup);
}

#[test]
fn test_too_small_catalog_reports_unavailable() {
    let mut s = session(2);
    s.enter_flag_mode();
    assert!(s.drain_requests().is_empty());
    assert!(s
        .drain_events()
        .iter()
        .any(|e| matches!(e, GameEvent::FlagRoundUnavailable { .. })));
}

#[test]
fn test_leaving_flag_mode_drops_round() {
    let mut s = session(8);
    let lookup = StaticLookup::from_catalog(s.catalog());
    s.enter_flag_mode();
    answer_all(&mut s, &lookup);
    let round = ready_round(&mut s);
    s.click_flag(&round.target().detail.cca2);

    s.leave_flag_mode();
    assert_eq!(s.mode(), Mode::Menu);
    assert!(s.flag_round().is_none());
    assert_eq!(s.next_wakeup(), None);

    // Lookups issued for a dropped round are discarded
    s.enter_flag_mode();
    let requests = s.drain_requests();
    s.leave_flag_mode();
    for request in requests {
        assert!(matches!(request.purpose, LookupPurpose::FlagChoice { .. }));
        assert_eq!(
            s.complete_lookup(request.token, lookup.get(&request.code)),
            LookupApplied::Stale
        );
    }
}

#[test]
fn test_reentering_flag_mode_reshows_live_round() {
    let mut s = session(8);
    let lookup = StaticLookup::from_catalog(s.catalog());
    s.enter_flag_mode();
    answer_all(&mut s, &lookup);
    let round = ready_round(&mut s);

    s.enter_flag_mode();
    assert!(s.drain_requests().is_empty());
    assert_eq!(ready_round(&mut s), round);
}

#[test]
fn test_flag_mode_ends_map_game() {
    let mut s = session(8);
    s.choose_difficulty(Difficulty::Easy);
    finish_loading(&mut s);
    s.start_countdown("1", "0").unwrap();

    s.enter_flag_mode();
    assert!(s.difficulty().is_none());
    assert_eq!(s.timer_remaining(TimerRole::ScoreCountdown), None);
}
