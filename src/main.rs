use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use space_shooter::display;
use space_shooter::input::{InputSampler, Key};
use space_shooter::session::{Control, Session};
use space_shooter::storage::{FileStore, MemoryStore, ScoreStore};
use space_shooter::surface::CellCanvas;
use space_shooter::{GameConfig, Variant};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

#[derive(Parser)]
#[command(name = "space_shooter")]
#[command(about = "Shoot the enemies before the clock runs out")]
struct Args {
    /// Rule set to play
    #[arg(long, value_enum, default_value_t = Variant::Classic)]
    variant: Variant,
    /// TOML file overriding preset values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where the best score is kept (default: ~/.space_shooter.json)
    #[arg(long)]
    score_file: Option<PathBuf>,
    /// Keep the best score for this run only
    #[arg(long)]
    no_save: bool,
    /// Seed for enemy placement and sparks
    #[arg(long)]
    seed: Option<u64>,
    /// Log destination (default: space_shooter.log in the temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal is in raw mode on the alternate screen, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Frame driver ──────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Each frame: drain pending key events, feed the wall clock to the
/// countdown, run one simulation step, redraw.  The session is only ever
/// touched from this loop.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session<StdRng>,
    canvas: &mut CellCanvas,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let mut input = InputSampler::new(Duration::from_millis(session.config().shot_interval_ms));
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => {
                    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }
                    let Some(key) = Key::from_code(code) else {
                        continue;
                    };
                    match kind {
                        KeyEventKind::Press => {
                            input.press(key, frame);
                            if session.on_press(key, &mut input, frame_start) == Control::Quit {
                                return Ok(());
                            }
                        }
                        // Repeat: refresh so the key stays held
                        KeyEventKind::Repeat => input.press(key, frame),
                        KeyEventKind::Release => input.release(key),
                    }
                }
                Event::Resize(cols, rows) => canvas.resize(cols, rows),
                _ => {}
            }
        }

        // ── Countdown, then one simulation step ───────────────────────────────
        session.sync_clock(Instant::now());
        session.frame(input.direction(frame));

        display::render(canvas, session.state(), session.config());
        canvas.present(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("space_shooter.log"));
    init_logging(&log_path)?;

    let config = GameConfig::load(args.variant, args.config.as_deref())
        .context("failed to load game config")?;
    let store: Box<dyn ScoreStore> = if args.no_save {
        Box::new(MemoryStore::default())
    } else {
        let store = FileStore::new(args.score_file.clone().unwrap_or_else(FileStore::default_path));
        log::info!("Best score file: {}", store.path().display());
        Box::new(store)
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    log::info!(
        "Space Shooter ready ({:?}): {} points in {}s",
        config.variant,
        config.target_score,
        config.time_limit_secs
    );
    let mut session = Session::new(config, store, rng);

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // kitty-protocol terminals support this; others fall back to expiry.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    log::debug!("Keyboard enhancement: {}", keyboard_enhanced);

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(e) => {
                log::warn!("Input thread stopped: {}", e);
                break;
            }
        }
    });

    let result = run(&mut out, &mut session, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    log::info!("Best score on exit: {}", session.state().best_score);
    result.context("terminal I/O failed")
}

fn run<W: Write>(
    out: &mut W,
    session: &mut Session<StdRng>,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut canvas = CellCanvas::new(session.config().width, session.config().height, cols, rows);
    game_loop(out, session, &mut canvas, rx)
}
