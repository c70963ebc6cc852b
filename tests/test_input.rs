use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use space_shooter::compute::Direction;
use space_shooter::input::*;

#[test]
fn key_mapping() {
    assert_eq!(Key::from_code(KeyCode::Left), Some(Key::Left));
    assert_eq!(Key::from_code(KeyCode::Char('d')), Some(Key::Right));
    assert_eq!(Key::from_code(KeyCode::Char('W')), Some(Key::Up));
    assert_eq!(Key::from_code(KeyCode::Down), Some(Key::Down));
    assert_eq!(Key::from_code(KeyCode::Char(' ')), Some(Key::Fire));
    assert_eq!(Key::from_code(KeyCode::Enter), Some(Key::Start));
    assert_eq!(Key::from_code(KeyCode::Esc), Some(Key::Pause));
    assert_eq!(Key::from_code(KeyCode::Char('p')), Some(Key::Pause));
    assert_eq!(Key::from_code(KeyCode::Char('r')), Some(Key::Restart));
    assert_eq!(Key::from_code(KeyCode::Char('q')), Some(Key::Exit));
    assert_eq!(Key::from_code(KeyCode::Char('x')), None);
    assert_eq!(Key::from_code(KeyCode::Tab), None);
}

#[test]
fn held_key_expires_after_window() {
    let mut input = InputSampler::new(Duration::ZERO);
    input.press(Key::Up, 10);
    assert!(input.is_held(Key::Up, 10));
    assert!(input.is_held(Key::Up, 10 + HOLD_WINDOW));
    assert!(!input.is_held(Key::Up, 11 + HOLD_WINDOW));
    assert!(!input.is_held(Key::Down, 10));
}

#[test]
fn repeat_refreshes_and_release_drops() {
    let mut input = InputSampler::new(Duration::ZERO);
    input.press(Key::Left, 1);
    input.press(Key::Left, 8);
    assert!(input.is_held(Key::Left, 8 + HOLD_WINDOW));
    input.release(Key::Left);
    assert!(!input.is_held(Key::Left, 9));
}

#[test]
fn direction_combines_axes() {
    let mut input = InputSampler::new(Duration::ZERO);
    assert_eq!(input.direction(1), Direction { dx: 0, dy: 0 });

    input.press(Key::Right, 1);
    input.press(Key::Up, 1);
    assert_eq!(input.direction(1), Direction { dx: 1, dy: -1 });

    // Opposite keys cancel out.
    input.press(Key::Left, 2);
    assert_eq!(input.direction(2), Direction { dx: 0, dy: -1 });
}

#[test]
fn fire_is_rate_limited() {
    let mut input = InputSampler::new(Duration::from_millis(200));
    let t0 = Instant::now();
    assert!(input.fire(t0, true));
    assert!(!input.fire(t0 + Duration::from_millis(100), true));
    // The refused request did not push the window back.
    assert!(input.fire(t0 + Duration::from_millis(200), true));
    assert!(!input.fire(t0 + Duration::from_millis(399), true));
}

#[test]
fn no_limit_with_zero_interval() {
    let mut input = InputSampler::new(Duration::ZERO);
    let t0 = Instant::now();
    assert!(input.fire(t0, true));
    assert!(input.fire(t0, true));
}

#[test]
fn inactive_fire_is_refused_without_using_the_slot() {
    let mut input = InputSampler::new(Duration::from_millis(200));
    let t0 = Instant::now();
    assert!(!input.fire(t0, false));
    assert!(input.fire(t0 + Duration::from_millis(10), true));
}

#[test]
fn clear_forgets_keys_and_last_shot() {
    let mut input = InputSampler::new(Duration::from_millis(200));
    let t0 = Instant::now();
    input.press(Key::Down, 3);
    assert!(input.fire(t0, true));
    input.clear();
    assert!(!input.is_held(Key::Down, 3));
    assert!(input.fire(t0 + Duration::from_millis(1), true));
}
