//! Whole-lifecycle scenarios: controller, JSON store and analytics together.

use chrono::{Duration, Local, NaiveDate, TimeZone};
use tempfile::TempDir;

use crate::audio::testing::CountingChime;
use crate::clock::testing::FixedClock;
use crate::models::session::{Fulfillment, SessionType};
use crate::session::draft::{SessionDraft, TimeChoice};
use crate::session::history;
use crate::session::lifecycle::{Phase, SessionController};
use crate::store::{JsonFileStore, SessionStore};

fn controller_for(path: &std::path::Path, clock: &FixedClock, chime: &CountingChime) -> SessionController {
    SessionController::new(
        Box::new(JsonFileStore::new(path)),
        Box::new(chime.clone()),
        Box::new(clock.clone()),
    )
}

fn complete_session(controller: &mut SessionController, minutes: &str, ticks: u32, fulfilled: Fulfillment) {
    let draft = controller.draft_mut().expect("setup phase");
    draft.time_choice = TimeChoice::Custom;
    draft.custom_time = minutes.to_string();
    draft.session_type = Some(SessionType::Review);
    draft.session_focus = "Pull requests".to_string();
    draft.purpose = "Keep teammates unblocked".to_string();
    draft.outcome = "Review queue empty".to_string();
    assert!(controller.start_session());

    for _ in 0..ticks {
        controller.tick();
    }
    if matches!(controller.phase(), Phase::Focus(_)) {
        controller.end_session();
    }
    controller.set_fulfilled(fulfilled);
    controller.save_session().expect("fulfilled reflection saves");
}

#[test]
fn test_daily_sessions_build_a_streak_that_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sessions.json");
    let clock = FixedClock::at(Local.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap());
    let chime = CountingChime::default();

    let mut controller = controller_for(&path, &clock, &chime);
    for _ in 0..3 {
        complete_session(&mut controller, "1", 60, Fulfillment::Completely);
        clock.advance(Duration::days(1));
    }
    // the loop advanced one day past the last session
    clock.advance(Duration::days(-1));
    assert_eq!(chime.plays(), 3);

    let restarted = controller_for(&path, &clock, &chime);
    let sessions = restarted.sessions();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions, controller.sessions());
    assert_eq!(history::current_streak(sessions, restarted.today()), 3);

    let dates: Vec<NaiveDate> = sessions.iter().map(|s| s.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        ]
    );

    // a day off breaks it
    clock.advance(Duration::days(2));
    assert_eq!(history::current_streak(sessions, restarted.today()), 0);
}

#[test]
fn test_durations_stay_within_plan() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sessions.json");
    let clock = FixedClock::at(Local.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap());
    let chime = CountingChime::default();
    let mut controller = controller_for(&path, &clock, &chime);

    complete_session(&mut controller, "3", 0, Fulfillment::NotReally);
    complete_session(&mut controller, "3", 59, Fulfillment::Partially);
    complete_session(&mut controller, "3", 61, Fulfillment::Partially);
    complete_session(&mut controller, "3", 180, Fulfillment::Completely);

    let durations: Vec<u32> = controller.sessions().iter().rev().map(|s| s.duration).collect();
    // 180s, 121s, 119s and 0s left: 3 - floor(left / 60)
    assert_eq!(durations, vec![0, 1, 2, 3]);
    assert!(controller.sessions().iter().all(|s| s.duration <= s.planned_duration));
    assert_eq!(chime.plays(), 1);

    let stored = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(stored, controller.sessions());
}

#[test]
fn test_new_session_starts_from_blank_draft() {
    let dir = TempDir::new().unwrap();
    let clock = FixedClock::at(Local.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap());
    let chime = CountingChime::default();
    let mut controller = controller_for(&dir.path().join("sessions.json"), &clock, &chime);

    complete_session(&mut controller, "25", 10, Fulfillment::Mostly);

    assert_eq!(controller.phase(), &Phase::Setup(SessionDraft::default()));
    assert_eq!(controller.time_left_secs(), None);
    assert!(!controller.is_running());
    assert!(controller.reflection_form().is_none());
}

#[test]
fn test_corrupt_history_starts_empty_and_is_replaced_on_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sessions.json");
    std::fs::write(&path, "[{\"id\": \"oops\"}]").unwrap();
    let clock = FixedClock::at(Local.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap());
    let chime = CountingChime::default();

    let mut controller = controller_for(&path, &clock, &chime);
    assert!(controller.sessions().is_empty());

    complete_session(&mut controller, "5", 0, Fulfillment::Mostly);
    assert_eq!(JsonFileStore::new(&path).load().unwrap().len(), 1);
}
