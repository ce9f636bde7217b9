use std::io::{self, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use fortuna_core::{
    Action, CellContent, CellState, Coord2, EntropySource, GameConfig, GameSession, InputSource,
    Mode, Renderer, SmallRngSource, StatusSlot, TileView,
};
use smallvec::SmallVec;

/// Terminal build of the sweeper: the same engine the hardware runs,
/// drawn with crossterm instead of the LCD.
#[derive(Parser, Debug)]
#[command(name = "fortuna", about = "Fortuna sweeper, terminal edition")]
struct Cli {
    /// Input polling period in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

const GRID_COLS: u16 = GameConfig::FORTUNA.size.1 as u16;
// two terminal columns per tile, then a gap before the status lines
const STATUS_COL: u16 = GRID_COLS * 2 + 2;

struct TermRenderer {
    out: io::Stdout,
}

impl TermRenderer {
    fn new() -> Self {
        Self { out: io::stdout() }
    }
}

/// Background, foreground, glyph. Color choices follow the LCD palette:
/// covered tiles dark, opened tiles light, digits cycling blue/green/red.
fn appearance(view: TileView) -> (Color, Color, char) {
    if let Some(mode) = view.cursor {
        let block = match mode {
            Mode::Reveal => Color::White,
            Mode::Flag => Color::Red,
        };
        return (block, block, ' ');
    }

    let bg = if view.state.is_revealed() {
        Color::Cyan
    } else {
        Color::DarkGrey
    };

    match view.content {
        None => match view.state {
            CellState::Flagged => (bg, Color::Red, '!'),
            _ => (bg, Color::White, ' '),
        },
        Some(CellContent::Bomb) => (bg, Color::Black, '*'),
        Some(CellContent::Safe(0)) => (bg, Color::White, ' '),
        Some(CellContent::Safe(count)) => {
            let fg = match count % 3 {
                1 => Color::Blue,
                2 => Color::Green,
                _ => Color::Red,
            };
            (bg, fg, char::from(b'0' + count))
        }
    }
}

impl Renderer for TermRenderer {
    fn clear(&mut self) {
        let _ = execute!(self.out, Clear(ClearType::All));
    }

    fn draw_tile(&mut self, coords: Coord2, view: TileView) {
        let (bg, fg, glyph) = appearance(view);
        let x = u16::from(coords.1) * 2;
        let y = u16::from(coords.0);
        let _ = queue!(
            self.out,
            cursor::MoveTo(x, y),
            SetBackgroundColor(bg),
            SetForegroundColor(fg),
            Print(glyph),
            Print(' '),
            ResetColor,
        );
        let _ = self.out.flush();
    }

    fn draw_status(&mut self, slot: StatusSlot, text: &str) {
        let y = match slot {
            StatusSlot::FlagCount => 0,
            StatusSlot::ModeLabel => 1,
            StatusSlot::Message => 2,
        };
        let _ = queue!(
            self.out,
            cursor::MoveTo(STATUS_COL, y),
            Clear(ClearType::UntilNewLine),
            Print(text),
        );
        let _ = self.out.flush();
    }

    fn clear_status(&mut self) {
        for y in 0..3 {
            let _ = queue!(
                self.out,
                cursor::MoveTo(STATUS_COL, y),
                Clear(ClearType::UntilNewLine),
            );
        }
        let _ = self.out.flush();
    }
}

/// Collects the tick's key events and hands them out in the fixed
/// priority order of the hardware scan loop: directions, activate, mode
/// toggle.
#[derive(Default)]
struct KeyInput {
    pending: SmallVec<[Action; 8]>,
    quit: bool,
}

impl KeyInput {
    fn pump(&mut self) -> Result<()> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match key.code {
                    KeyCode::Up | KeyCode::Char('w') => self.pending.push(Action::MoveUp),
                    KeyCode::Right | KeyCode::Char('d') => self.pending.push(Action::MoveRight),
                    KeyCode::Down | KeyCode::Char('s') => self.pending.push(Action::MoveDown),
                    KeyCode::Left | KeyCode::Char('a') => self.pending.push(Action::MoveLeft),
                    KeyCode::Enter | KeyCode::Char(' ') => self.pending.push(Action::Activate),
                    KeyCode::Tab | KeyCode::Char('m') => self.pending.push(Action::ToggleMode),
                    KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
                    _ => {}
                }
            }
        }
        self.pending.sort();
        Ok(())
    }
}

impl InputSource for KeyInput {
    fn next_action(&mut self) -> Option<Action> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

/// System clock standing in for the free-running hardware counter read
/// at seed time.
struct ClockEntropy;

impl EntropySource for ClockEntropy {
    fn read(&mut self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::from(elapsed.subsec_nanos()) ^ elapsed.as_secs())
            .unwrap_or(0)
    }
}

const HELP: [&str; 15] = [
    "#FORTUNA SWEEPER#",
    "",
    "Reveal all of the tiles without detonating any mines.",
    "A numbered tile indicates how many neighbouring tiles",
    "contain mines, where a neighbouring tile includes",
    "diagonals.",
    "",
    "CONTROLS",
    "Move your cursor with the arrow keys or WASD.",
    "Uncover a tile with enter or space.",
    "Switch between uncover and flag mode with tab or M.",
    "When in flag mode, you can place flags where you",
    "think bombs are, instead of uncovering a tile.",
    "",
    "Press enter to begin playing! (Q quits.)",
];

fn draw_help() -> Result<()> {
    let mut out = io::stdout();
    queue!(out, Clear(ClearType::All))?;
    for (y, line) in HELP.iter().enumerate() {
        queue!(out, cursor::MoveTo(0, y as u16), Print(line))?;
    }
    out.flush()?;
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let mut session = GameSession::new(TermRenderer::new(), SmallRngSource::new(), ClockEntropy);
    let mut input = KeyInput::default();

    draw_help()?;
    log::debug!("polling every {}ms", cli.tick_ms);

    let tick = Duration::from_millis(cli.tick_ms.max(10));
    loop {
        input.pump()?;
        if input.quit {
            return Ok(());
        }
        session.poll(&mut input);
        std::thread::sleep(tick);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    terminal::enable_raw_mode().context("entering raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;

    let result = run(&cli);

    let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
