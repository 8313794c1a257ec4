mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reef_rush::compute::{init_world, next_stage, tick};
use reef_rush::config::GameConfig;
use reef_rush::entities::{CarryOver, GameStatus, GameWorld, PlayArea};
use reef_rush::highscore::HighScoreTable;
use reef_rush::player::FrameInput;
use reef_rush::states::{StateId, StateRegistry, StateStack};
use reef_rush::GameError;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "reef_rush", about = "Eat-or-be-eaten arcade fish game for the terminal")]
struct Args {
    /// RON file with gameplay tunables.
    #[arg(long, default_value = "reef_rush.ron")]
    config: PathBuf,

    /// Level to start new runs on.
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Fixed RNG seed; each stage derives its own seed from it.
    #[arg(long)]
    seed: Option<u64>,

    /// High-score file. Defaults to ~/.reef_rush_scores.
    #[arg(long)]
    scores: Option<PathBuf>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Name recorded in the high-score table.
    #[arg(long)]
    name: Option<String>,
}

// ── Timing and input constants ────────────────────────────────────────────────

/// Seconds the stage intro card stays up.
const INTRO_SECONDS: f32 = 2.0;
/// Seconds the stage-clear / game-over banner shows before moving on.
const BANNER_SECONDS: f32 = 2.5;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

fn held_direction(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> Vec2 {
    let left = any_held(key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame);
    let right = any_held(key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame);
    let up = any_held(key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame);
    let down = any_held(key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame);
    let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
    Vec2::new(axis(left, right), axis(up, down))
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so logs only go to a file.
fn setup_file_logging(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("cannot create log directory {}: {e}", log_dir.display());
        return None;
    }
    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, "reef_rush.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reef_rush=info"));

    tracing_subscriber::registry().with(filter).with(file_layer).init();
    Some(guard)
}

fn default_scores_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".reef_rush_scores")
}

// ── Screens ───────────────────────────────────────────────────────────────────

struct PlayScreen {
    world: GameWorld,
    rng: StdRng,
    /// Time spent on the stage-clear / game-over banner.
    banner: f32,
}

enum Screen {
    Menu,
    StageIntro { carry: CarryOver, timer: f32 },
    Playing(Box<PlayScreen>),
    Paused,
    GameOver { carry: CarryOver, rank: Option<usize> },
    HighScores,
}

/// Payload handed from one screen to the next.
#[derive(Clone)]
struct Transition {
    carry: CarryOver,
    area: PlayArea,
    config: GameConfig,
    seed: u64,
    rank: Option<usize>,
}

fn make_menu(_: &Transition) -> Screen {
    Screen::Menu
}

fn make_intro(t: &Transition) -> Screen {
    Screen::StageIntro {
        carry: t.carry.clone(),
        timer: INTRO_SECONDS,
    }
}

fn make_playing(t: &Transition) -> Screen {
    let mut rng = StdRng::seed_from_u64(t.seed);
    let world = init_world(t.area, &t.carry, &t.config, &mut rng);
    Screen::Playing(Box::new(PlayScreen { world, rng, banner: 0.0 }))
}

fn make_paused(_: &Transition) -> Screen {
    Screen::Paused
}

fn make_game_over(t: &Transition) -> Screen {
    Screen::GameOver {
        carry: t.carry.clone(),
        rank: t.rank,
    }
}

fn make_high_scores(_: &Transition) -> Screen {
    Screen::HighScores
}

fn build_registry() -> StateRegistry<Screen, Transition> {
    let mut registry = StateRegistry::new();
    registry.register(StateId::MainMenu, make_menu);
    registry.register(StateId::StageIntro, make_intro);
    registry.register(StateId::Playing, make_playing);
    registry.register(StateId::Paused, make_paused);
    registry.register(StateId::GameOver, make_game_over);
    registry.register(StateId::HighScores, make_high_scores);
    registry
}

// ── Application ───────────────────────────────────────────────────────────────

struct App {
    stack: StateStack<Screen, Transition>,
    registry: StateRegistry<Screen, Transition>,
    config: GameConfig,
    scores: HighScoreTable,
    scores_path: PathBuf,
    name: String,
    start_level: u32,
    base_seed: Option<u64>,
    stages_played: u64,
}

impl App {
    fn payload(&mut self, carry: CarryOver, area: PlayArea) -> Transition {
        self.stages_played += 1;
        let seed = match self.base_seed {
            Some(base) => base.wrapping_add(self.stages_played),
            None => rand::thread_rng().gen(),
        };
        Transition {
            carry,
            area,
            config: self.config.clone(),
            seed,
            rank: None,
        }
    }

    fn go_to(&mut self, id: StateId, payload: Transition) {
        self.stack.request_clear();
        self.stack.request_push(id, payload);
    }

    fn new_run(&self) -> CarryOver {
        CarryOver::new_run(self.start_level, self.config.starting_lives, self.scores.best())
    }

    fn record_score(&mut self, carry: &CarryOver) -> Option<usize> {
        if !self.scores.qualifies(carry.score) {
            return None;
        }
        let rank = self.scores.insert(&self.name, carry.score);
        match self.scores.save(&self.scores_path) {
            Ok(()) => info!(score = carry.score, ?rank, "high score saved"),
            Err(e) => error!("{e}"),
        }
        rank
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Drains pending terminal events. Returns `Quit` on Ctrl-C or a quit key.
fn handle_events(
    app: &mut App,
    rx: &mpsc::Receiver<Event>,
    key_frame: &mut HashMap<KeyCode, u64>,
    mouse_target: &mut Option<Vec2>,
    frame: u64,
    area: PlayArea,
) -> Flow {
    while let Ok(ev) = rx.try_recv() {
        let (code, modifiers) = match ev {
            Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    (code, modifiers)
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                    continue;
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                    continue;
                }
            },
            Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                if matches!(kind, MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_)) {
                    *mouse_target = Some(display::cell_to_world(column, row));
                }
                continue;
            }
            _ => continue,
        };

        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::Quit;
        }
        if matches!(
            code,
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down
        ) || matches!(code, KeyCode::Char(c) if "wasdWASD".contains(c))
        {
            // Keyboard steering takes over from the mouse until it moves again.
            *mouse_target = None;
        }

        let current = app.stack.current_id();
        match (current, code) {
            (Some(StateId::MainMenu), KeyCode::Enter | KeyCode::Char(' ')) => {
                let carry = app.new_run();
                let payload = app.payload(carry, area);
                app.go_to(StateId::StageIntro, payload);
            }
            (Some(StateId::MainMenu), KeyCode::Char('h' | 'H')) => {
                let payload = app.payload(app.new_run(), area);
                app.go_to(StateId::HighScores, payload);
            }
            (Some(StateId::MainMenu), KeyCode::Char('q' | 'Q') | KeyCode::Esc) => return Flow::Quit,

            (Some(StateId::StageIntro), KeyCode::Enter | KeyCode::Char(' ')) => {
                if let Some(Screen::StageIntro { timer, .. }) = app.stack.current_mut() {
                    *timer = 0.0;
                }
            }

            (Some(StateId::Playing), KeyCode::Char('p' | 'P') | KeyCode::Esc) => {
                let payload = app.payload(app.new_run(), area);
                app.stack.request_push(StateId::Paused, payload);
            }
            (Some(StateId::Playing | StateId::Paused), KeyCode::Char('q' | 'Q')) => {
                let payload = app.payload(app.new_run(), area);
                app.go_to(StateId::MainMenu, payload);
            }
            (Some(StateId::Paused), KeyCode::Char('p' | 'P') | KeyCode::Esc) => app.stack.request_pop(),

            (Some(StateId::GameOver), KeyCode::Enter | KeyCode::Char('r' | 'R')) => {
                let payload = app.payload(app.new_run(), area);
                app.go_to(StateId::MainMenu, payload);
            }
            (Some(StateId::GameOver), KeyCode::Char('h' | 'H')) => {
                let payload = app.payload(app.new_run(), area);
                app.go_to(StateId::HighScores, payload);
            }
            (Some(StateId::GameOver), KeyCode::Char('q' | 'Q')) => return Flow::Quit,

            (Some(StateId::HighScores), KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q' | 'Q')) => {
                let payload = app.payload(app.new_run(), area);
                app.go_to(StateId::MainMenu, payload);
            }
            _ => {}
        }
    }
    Flow::Continue
}

/// Advances whichever screen is on top and queues any transition it asks for.
fn update_screen(app: &mut App, input: &FrameInput, dt: f32, area: PlayArea) {
    let mut next: Option<(StateId, CarryOver)> = None;

    match app.stack.current_mut() {
        Some(Screen::StageIntro { carry, timer }) => {
            *timer -= dt;
            if *timer <= 0.0 {
                next = Some((StateId::Playing, carry.clone()));
            }
        }
        Some(Screen::Playing(play)) => {
            play.world = tick(&play.world, input, dt, &mut play.rng);
            for event in &play.world.events {
                debug!(?event, "game event");
            }
            match play.world.status {
                GameStatus::Playing => {}
                GameStatus::StageClear => {
                    play.banner += dt;
                    if play.banner >= BANNER_SECONDS {
                        let carry = next_stage(&play.world.carry_over(), &play.world.config);
                        next = Some((StateId::StageIntro, carry));
                    }
                }
                GameStatus::GameOver => {
                    play.banner += dt;
                    if play.banner >= BANNER_SECONDS {
                        next = Some((StateId::GameOver, play.world.carry_over()));
                    }
                }
            }
        }
        _ => {}
    }

    if let Some((id, carry)) = next {
        let rank = if id == StateId::GameOver {
            app.record_score(&carry)
        } else {
            None
        };
        let mut payload = app.payload(carry, area);
        payload.rank = rank;
        app.go_to(id, payload);
    }
}

fn render<W: Write>(out: &mut W, app: &App, size: (u16, u16)) -> std::io::Result<()> {
    // A pause screen draws the frozen game underneath it.
    let below_top = app.stack.states().rev().nth(1).map(|(_, s)| s);
    match app.stack.current() {
        Some(Screen::Menu) => display::render_menu(out, app.scores.best(), size),
        Some(Screen::StageIntro { carry, .. }) => display::render_stage_intro(out, carry, size),
        Some(Screen::Playing(play)) => display::render_world(out, &play.world, size, false),
        Some(Screen::Paused) => match below_top {
            Some(Screen::Playing(play)) => display::render_world(out, &play.world, size, true),
            _ => display::render_menu(out, app.scores.best(), size),
        },
        Some(Screen::GameOver { carry, rank }) => display::render_game_over(out, carry, *rank, size),
        Some(Screen::HighScores) => display::render_high_scores(out, &app.scores, size),
        None => Ok(()),
    }
}

// ── Main loop ─────────────────────────────────────────────────────────────────

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    let frame_time = Duration::from_secs_f32(app.config.timestep());
    let dt = app.config.timestep();

    let (width, height) = terminal::size()?;
    let area = display::play_area_for(width, height);
    let payload = app.payload(app.new_run(), area);
    app.stack.request_push(StateId::MainMenu, payload);
    app.stack.apply_pending(&app.registry)?;

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut mouse_target: Option<Vec2> = None;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        if let Flow::Quit = handle_events(&mut app, rx, &mut key_frame, &mut mouse_target, frame, area) {
            break;
        }

        let input = match mouse_target {
            Some(target) => FrameInput::follow(target),
            None => FrameInput::toward(held_direction(&key_frame, frame)),
        };
        update_screen(&mut app, &input, dt, area);

        // Transitions requested this frame all land here, never mid-update.
        app.stack.apply_pending(&app.registry)?;
        if app.stack.is_empty() {
            break;
        }

        render(out, &app, (width, height))?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let _log_guard = setup_file_logging(&args.log_dir);

    let config = GameConfig::load_or_default(&args.config);
    let scores_path = args.scores.clone().unwrap_or_else(default_scores_path);
    let scores = match HighScoreTable::load(&scores_path, config.high_score_capacity) {
        Ok(table) => table,
        Err(e) => {
            error!("{e}");
            HighScoreTable::new(config.high_score_capacity)
        }
    };
    let name = args
        .name
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "player".to_string());

    let app = App {
        stack: StateStack::new(),
        registry: build_registry(),
        config,
        scores,
        scores_path,
        name,
        start_level: args.level.max(1),
        base_seed: args.seed,
        stages_played: 0,
    };
    info!(seed = ?args.seed, level = app.start_level, "starting");

    let mut out = BufWriter::new(stdout());
    let result = with_terminal(&mut out, |out| {
        // Dedicate a thread exclusively to blocking event reads, sending them
        // through a channel so the game loop never has to block on I/O.
        let (tx, rx) = mpsc::channel::<Event>();
        thread::spawn(move || {
            while let Ok(ev) = event::read() {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });
        run(out, &rx, app)
    });

    if let Err(e) = result {
        if let Some(GameError::UnregisteredState(id)) = e.downcast_ref::<GameError>() {
            error!(%id, "fatal state configuration error");
        }
        eprintln!("reef_rush: {e}");
        std::process::exit(1);
    }
}

/// Puts the terminal into game mode, runs `body`, and always restores it.
fn with_terminal<W: Write>(
    out: &mut W,
    body: impl FnOnce(&mut W) -> Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    let _ = out.execute(EnableMouseCapture);

    // Request key-release events; terminals without the protocol fall back
    // to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
        .is_ok();

    let result = body(out);

    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
