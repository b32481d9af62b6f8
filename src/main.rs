mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

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

use space_raiders::entity::GameTime;
use space_raiders::interface::{InputSource, Key};
use space_raiders::sim::Simulation;
use space_raiders::World;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// A key is considered "held" if its last press/repeat event arrived
/// within this many frames.  Covers terminals that don't emit
/// key-release events: the OS key-repeat rate is ≥ 15 Hz, so a window
/// of 4 frames (≈133 ms) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

// ── Input ─────────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, a
/// `key_frame` map records the frame number of the last press/repeat
/// event for every key.  Each frame the simulation asks which keys are
/// still "fresh" (within `HOLD_WINDOW` frames), so Space and A/D can
/// be held at the same time with no interference.
struct TermInput {
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    exit: bool,
    restart: bool,
}

impl TermInput {
    fn new() -> Self {
        Self {
            key_frame: HashMap::new(),
            frame: 0,
            exit: false,
            restart: false,
        }
    }

    fn begin_frame(&mut self) {
        self.frame += 1;
        self.restart = false;
    }

    fn note(&mut self, code: KeyCode, kind: KeyEventKind, modifiers: KeyModifiers) {
        match kind {
            // Press: record key + handle one-shot actions
            KeyEventKind::Press => {
                self.key_frame.insert(code, self.frame);
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.exit = true,
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        self.exit = true;
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => self.restart = true,
                    _ => {}
                }
            }
            // Repeat: refresh timestamp so key stays "held"
            KeyEventKind::Repeat => {
                self.key_frame.insert(code, self.frame);
            }
            // Release: remove key immediately (keyboard-enhancement path)
            KeyEventKind::Release => {
                self.key_frame.remove(&code);
            }
        }
    }

    fn is_held(&self, code: KeyCode) -> bool {
        self.key_frame
            .get(&code)
            .map(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    fn restart_requested(&self) -> bool {
        self.restart
    }
}

impl InputSource for TermInput {
    fn is_key_down(&self, key: Key) -> bool {
        match key {
            Key::Left => {
                self.is_held(KeyCode::Left)
                    || self.is_held(KeyCode::Char('a'))
                    || self.is_held(KeyCode::Char('A'))
            }
            Key::Right => {
                self.is_held(KeyCode::Right)
                    || self.is_held(KeyCode::Char('d'))
                    || self.is_held(KeyCode::Char('D'))
            }
            Key::Fire => self.is_held(KeyCode::Char(' ')),
        }
    }

    fn is_exit_requested(&self) -> bool {
        self.exit
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn new_simulation(world: World) -> std::io::Result<Simulation> {
    Simulation::new(1, world, &mut display::TermContent, StdRng::from_entropy())
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let world = World::default();
    let mut sim = new_simulation(world)?;
    let mut input = TermInput::new();
    let mut audio = display::TermAudio;
    let mut total = Duration::ZERO;

    loop {
        let frame_start = Instant::now();
        input.begin_frame();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            match event {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => input.note(code, kind, modifiers),
                Event::FocusLost => sim.pause(true),
                Event::FocusGained => sim.pause(false),
                _ => {}
            }
        }

        if input.is_exit_requested() {
            return Ok(());
        }
        if sim.is_over() && input.restart_requested() {
            sim = new_simulation(world)?;
            total = Duration::ZERO;
        }

        // Fixed timestep: the clock advances one frame per iteration
        // whether or not rendering kept up.
        total += FRAME;
        let t = GameTime {
            total,
            delta: FRAME,
        };
        sim.update(&t, &input, &mut audio);

        display::render(out, &sim, world)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    env_logger::init();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(event::EnableFocusChange)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back
    // gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending
    // them through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(event::DisableFocusChange);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
