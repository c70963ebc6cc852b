use std::path::PathBuf;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use space_shooter::compute::Direction;
use space_shooter::entities::{GameStatus, Outcome};
use space_shooter::error::{Error, Result};
use space_shooter::input::{InputSampler, Key};
use space_shooter::session::{Control, Countdown, Session};
use space_shooter::storage::{MemoryStore, ScoreStore};
use space_shooter::{GameConfig, Variant};

fn classic_with_target(target_score: u32) -> GameConfig {
    GameConfig {
        target_score,
        ..GameConfig::preset(Variant::Classic)
    }
}

fn session(config: GameConfig, best: u32) -> Session<StdRng> {
    Session::new(
        config,
        Box::new(MemoryStore::with_best(best)),
        StdRng::seed_from_u64(42),
    )
}

fn sampler(session: &Session<StdRng>) -> InputSampler {
    InputSampler::new(Duration::from_millis(session.config().shot_interval_ms))
}

/// Steer onto the live enemy's row and fire, one bullet in flight at a time,
/// until `hits` more points are scored.  Classic enemies never move, so an
/// aligned shot always lands.
fn hunt(session: &mut Session<StdRng>, hits: u32) {
    let goal = session.state().score + hits;
    for _ in 0..20_000 {
        if session.state().score >= goal || !session.is_running() {
            break;
        }
        let mut dir = Direction::default();
        let target = session.state().enemies.iter().find(|e| e.alive).map(|e| e.y);
        if let Some(y) = target {
            let gap = y - session.state().player.y;
            if gap.abs() > 6.0 {
                dir.dy = gap.signum() as i8;
            } else if session.state().bullets.is_empty() {
                session.shoot();
            }
        }
        session.frame(dir);
    }
    assert_eq!(session.state().score, goal);
}

// ── Transitions ───────────────────────────────────────────────────────────────

#[test]
fn new_session_is_idle_with_stored_best() {
    let s = session(classic_with_target(30), 5);
    assert_eq!(s.status(), GameStatus::Idle);
    assert_eq!(s.state().best_score, 5);
    assert!(!s.countdown().is_armed());
}

#[test]
fn start_runs_and_arms_countdown() {
    let mut s = session(classic_with_target(30), 0);
    assert!(s.start());
    assert!(s.is_running());
    assert!(s.countdown().is_armed());
    assert_eq!(s.state().time_remaining, 90);
    assert!(!s.start());
}

#[test]
fn invalid_requests_are_ignored() {
    let mut s = session(classic_with_target(30), 0);
    assert!(!s.pause());
    assert!(!s.resume());
    assert!(!s.restart());
    assert!(!s.exit());
    assert!(!s.toggle_pause());
    assert_eq!(s.status(), GameStatus::Idle);

    s.start();
    assert!(!s.resume());
    assert!(!s.restart());
    assert!(!s.exit());
    assert_eq!(s.status(), GameStatus::Running);
}

#[test]
fn pause_freezes_clock_and_simulation() {
    let mut s = session(classic_with_target(30), 0);
    s.start();
    assert!(s.pause());
    assert!(!s.countdown().is_armed());

    let before = s.state().clone();
    s.advance_clock(Duration::from_secs(5));
    s.frame(Direction { dx: 1, dy: 1 });
    s.shoot();
    assert_eq!(s.state(), &before);

    assert!(s.resume());
    assert!(s.countdown().is_armed());
    s.advance_clock(Duration::from_secs(1));
    assert_eq!(s.state().time_remaining, 89);
}

#[test]
fn clock_accumulates_fractions() {
    let mut s = session(classic_with_target(30), 0);
    s.start();
    s.advance_clock(Duration::from_millis(600));
    assert_eq!(s.state().time_remaining, 90);
    s.advance_clock(Duration::from_millis(600));
    assert_eq!(s.state().time_remaining, 89);
}

#[test]
fn countdown_is_a_single_ticker() {
    let mut c = Countdown::default();
    assert_eq!(c.advance(Duration::from_secs(3)), 0);

    c.start();
    assert_eq!(c.advance(Duration::from_millis(1500)), 1);
    // Re-arming replaces the old ticker, carry included.
    c.start();
    assert_eq!(c.advance(Duration::from_millis(600)), 0);
    assert_eq!(c.advance(Duration::from_millis(400)), 1);

    c.stop();
    assert!(!c.is_armed());
    assert_eq!(c.advance(Duration::from_secs(10)), 0);
}

#[test]
fn suspended_countdown_keeps_its_partial_second() {
    let mut c = Countdown::default();
    c.start();
    assert_eq!(c.advance(Duration::from_millis(600)), 0);
    c.suspend();
    assert!(!c.is_armed());
    assert_eq!(c.advance(Duration::from_secs(5)), 0);
    c.resume();
    assert_eq!(c.advance(Duration::from_millis(400)), 1);
}

#[test]
fn quick_pauses_do_not_stall_the_clock() {
    let mut s = session(classic_with_target(30), 0);
    s.start();
    for _ in 0..100 {
        s.advance_clock(Duration::from_millis(900));
        s.frame(Direction::default());
        s.pause();
        s.resume();
    }
    // 90 s of running time in total.
    assert_eq!(s.state().time_remaining, 0);
    assert_eq!(s.status(), GameStatus::Over(Outcome::Lose));
}

#[test]
fn clock_ignores_time_before_start() {
    let mut s = session(classic_with_target(30), 0);
    let t0 = Instant::now();
    s.sync_clock(t0);
    s.start();
    // First reading after the start only sets the reference point.
    s.sync_clock(t0 + Duration::from_millis(1500));
    assert_eq!(s.state().time_remaining, 90);
    s.sync_clock(t0 + Duration::from_millis(2500));
    assert_eq!(s.state().time_remaining, 89);
}

#[test]
fn clock_ignores_time_spent_paused() {
    let mut s = session(classic_with_target(30), 0);
    let t0 = Instant::now();
    s.start();
    s.sync_clock(t0);
    s.pause();
    s.sync_clock(t0 + Duration::from_secs(30));
    s.resume();
    s.sync_clock(t0 + Duration::from_secs(31));
    assert_eq!(s.state().time_remaining, 90);
    s.sync_clock(t0 + Duration::from_millis(32_500));
    assert_eq!(s.state().time_remaining, 89);
}

// ── Endings ───────────────────────────────────────────────────────────────────

#[test]
fn running_out_of_time_loses() {
    let mut s = session(classic_with_target(30), 0);
    s.start();
    assert!(s.summary().is_none());
    s.advance_clock(Duration::from_secs(90));

    assert_eq!(s.status(), GameStatus::Over(Outcome::Lose));
    assert_eq!(s.state().time_remaining, 0);
    assert!(!s.countdown().is_armed());

    let summary = s.summary().unwrap();
    assert_eq!(summary.title, "GAME OVER");
    assert_eq!(summary.message, "Time's up! You needed 30 points.");
    assert_eq!(summary.final_time, "00:00");
    assert!(!summary.new_record);

    // Nothing moves once over.
    let frozen = s.state().clone();
    s.advance_clock(Duration::from_secs(5));
    s.frame(Direction { dx: 1, dy: 0 });
    assert_eq!(s.state(), &frozen);
}

#[test]
fn reaching_target_wins_with_time_left() {
    let mut s = session(classic_with_target(1), 0);
    s.start();
    hunt(&mut s, 1);

    assert_eq!(s.status(), GameStatus::Over(Outcome::Win));
    let summary = s.summary().unwrap();
    assert_eq!(summary.title, "VICTORY!");
    assert_eq!(summary.message, "You scored 1 points in time!");
    assert_eq!(summary.final_score, 1);
    assert_eq!(summary.final_time, "01:30");
}

#[test]
fn best_score_only_rises() {
    let mut s = session(classic_with_target(8), 5);
    s.start();
    hunt(&mut s, 8);
    assert_eq!(s.status(), GameStatus::Over(Outcome::Win));
    assert_eq!(s.state().best_score, 8);
    assert!(s.state().new_record);
    assert_eq!(s.store().load(), 8);

    assert!(s.restart());
    assert_eq!(s.state().best_score, 8);
    assert!(!s.state().new_record);
    hunt(&mut s, 3);
    s.advance_clock(Duration::from_secs(90));
    assert_eq!(s.status(), GameStatus::Over(Outcome::Lose));
    assert_eq!(s.state().score, 3);
    assert_eq!(s.state().best_score, 8);
    assert!(!s.state().new_record);
    assert_eq!(s.store().load(), 8);
}

struct BrokenStore;

impl ScoreStore for BrokenStore {
    fn load(&self) -> u32 {
        0
    }

    fn save(&mut self, _score: u32) -> Result<()> {
        Err(Error::Write {
            path: PathBuf::from("/dev/full"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }
}

#[test]
fn save_failure_does_not_stop_the_game() {
    let mut s = Session::new(
        classic_with_target(1),
        Box::new(BrokenStore),
        StdRng::seed_from_u64(42),
    );
    s.start();
    hunt(&mut s, 1);
    assert_eq!(s.status(), GameStatus::Over(Outcome::Win));
    assert_eq!(s.state().best_score, 1);
    assert!(s.restart());
}

#[test]
fn restart_resets_the_session() {
    let mut s = session(classic_with_target(30), 0);
    s.start();
    hunt(&mut s, 2);
    s.shoot();
    s.advance_clock(Duration::from_secs(10));
    s.pause();

    assert!(s.restart());
    let st = s.state();
    assert_eq!(st.status, GameStatus::Running);
    assert_eq!(st.score, 0);
    assert_eq!(st.time_remaining, 90);
    assert!(st.bullets.is_empty());
    assert!(st.particles.is_empty());
    assert!(s.countdown().is_armed());
}

#[test]
fn exit_returns_home_keeping_best() {
    let mut s = session(classic_with_target(1), 0);
    s.start();
    hunt(&mut s, 1);
    assert!(s.exit());
    assert_eq!(s.status(), GameStatus::Idle);
    assert_eq!(s.state().best_score, 1);
    assert_eq!(s.state().score, 0);
    assert!(!s.countdown().is_armed());
}

// ── Key routing ───────────────────────────────────────────────────────────────

#[test]
fn keys_drive_the_state_machine() {
    let mut s = session(classic_with_target(30), 0);
    let mut input = sampler(&s);
    let now = Instant::now();

    assert_eq!(s.on_press(Key::Start, &mut input, now), Control::Continue);
    assert!(s.is_running());
    s.on_press(Key::Pause, &mut input, now);
    assert_eq!(s.status(), GameStatus::Paused);
    s.on_press(Key::Pause, &mut input, now);
    assert!(s.is_running());

    // Exit is ignored mid-session.
    assert_eq!(s.on_press(Key::Exit, &mut input, now), Control::Continue);
    assert!(s.is_running());

    s.on_press(Key::Pause, &mut input, now);
    assert_eq!(s.on_press(Key::Exit, &mut input, now), Control::Continue);
    assert_eq!(s.status(), GameStatus::Idle);
    assert_eq!(s.on_press(Key::Exit, &mut input, now), Control::Quit);
}

#[test]
fn fire_key_only_shoots_while_running() {
    let mut s = session(classic_with_target(30), 0);
    let mut input = sampler(&s);
    let now = Instant::now();

    s.on_press(Key::Fire, &mut input, now);
    assert!(s.state().bullets.is_empty());

    s.start();
    s.on_press(Key::Fire, &mut input, now);
    s.on_press(Key::Fire, &mut input, now);
    assert_eq!(s.state().bullets.len(), 2); // classic has no shot limit

    s.pause();
    s.on_press(Key::Fire, &mut input, now);
    assert_eq!(s.state().bullets.len(), 2);
}

#[test]
fn swarm_fire_key_is_rate_limited() {
    let mut s = session(GameConfig::preset(Variant::Swarm), 0);
    let mut input = sampler(&s);
    let t0 = Instant::now();
    s.start();

    s.on_press(Key::Fire, &mut input, t0);
    s.on_press(Key::Fire, &mut input, t0 + Duration::from_millis(50));
    assert_eq!(s.state().bullets.len(), 1);
    s.on_press(Key::Fire, &mut input, t0 + Duration::from_millis(250));
    assert_eq!(s.state().bullets.len(), 2);
}

#[test]
fn restart_key_clears_held_keys() {
    let mut s = session(classic_with_target(30), 0);
    let mut input = sampler(&s);
    let now = Instant::now();
    s.start();
    input.press(Key::Up, 1);
    s.pause();

    s.on_press(Key::Restart, &mut input, now);
    assert!(s.is_running());
    assert!(!input.is_held(Key::Up, 1));
}
