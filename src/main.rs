use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use longpress::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    input::{InputDevice, PressCommand},
    logging,
    page::{Page, RawInput},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    svg,
    ui::{hit_test, PageScreen},
    widget::{Component, LongPresser},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;

/// More than this and the buttons no longer fit a normal terminal row.
const MAX_BUTTONS: i64 = 32;

/// circular long-press-to-confirm buttons in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Hold a button with the mouse until its ring fills up. Let go early and the ring winds back down."
)]
pub struct Cli {
    /// seconds a press must be held, for every button
    #[clap(short = 'd', long)]
    duration: Option<f64>,

    /// label shown on every button
    #[clap(short = 'l', long)]
    label: Option<String>,

    /// number of buttons on the page
    #[clap(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..=MAX_BUTTONS))]
    count: Option<u16>,

    /// milliseconds between animation frames
    #[clap(long)]
    frame_ms: Option<u64>,

    /// config file to use instead of the default location
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// write the effective configuration back to the config file
    #[clap(long)]
    save_config: bool,

    /// print the first button as SVG at this progress (0 to 1) and exit
    #[clap(long, value_name = "PROGRESS", value_parser = parse_progress)]
    svg: Option<f64>,

    /// write logs to a file (defaults to the state directory when no path is given)
    #[clap(long, value_name = "PATH")]
    log: Option<Option<PathBuf>>,
}

fn parse_progress(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("progress must be between 0 and 1, got {value}"))
    }
}

impl Cli {
    /// Layer command line overrides on top of the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(count) = self.count {
            config = config.with_count(usize::from(count));
        }
        for button in &mut config.buttons {
            if let Some(duration) = self.duration {
                button.duration_secs = duration;
            }
            if let Some(label) = &self.label {
                button.label = label.clone();
            }
        }
        if let Some(frame_ms) = self.frame_ms {
            config.frame_ms = frame_ms;
        }
        config
    }
}

#[derive(Debug)]
pub struct App {
    pub page: Page,
    pub fade: Duration,
}

impl App {
    pub fn new(config: &Config, now: Instant) -> Self {
        Self {
            page: Page::new(config.buttons.clone(), config.device_switch_grace(), now),
            fade: config.fade(),
        }
    }

    /// Feed a terminal mouse event to the page. Returns true if a button
    /// was pressed or released.
    pub fn on_mouse(&mut self, mouse: MouseEvent, area: Rect, now: Instant) -> bool {
        let target = hit_test(area, self.page.len(), mouse.column, mouse.row);
        let input = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => RawInput::down(InputDevice::Pointer, target),
            MouseEventKind::Up(MouseButton::Left) => RawInput::up(InputDevice::Pointer, target),
            _ => return false,
        };
        self.page.dispatch(input, now)
    }

    /// True while a checkmark is still fading in.
    pub fn is_fading(&self, now: Instant) -> bool {
        self.page
            .buttons()
            .iter()
            .filter_map(|b| b.render())
            .filter_map(|v| v.overlay.revealed_at)
            .any(|at| now.saturating_duration_since(at) <= self.fade)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log) = &cli.log {
        if let Some(path) = log.clone().or_else(AppDirs::log_path) {
            logging::init(&path)?;
        }
    }

    let store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    if let Some(progress) = cli.svg {
        print!("{}", render_svg(&config, progress));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, Instant::now());
    info!(buttons = app.page.len(), "page mounted");
    let result = start_tui(&mut terminal, &mut app, config.frame_interval());

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// Render the first configured button at `progress`, 1 meaning finished.
fn render_svg(config: &Config, progress: f64) -> String {
    let attrs = config.buttons.first().cloned().unwrap_or_default();
    let t0 = Instant::now();
    let mut button = LongPresser::new(attrs, t0);
    button.initialize(t0);
    button.handle_input(PressCommand::Start, t0);
    let held = button.session().duration().mul_f64(progress);
    button.tick(t0 + held);

    button.render().map(svg::render).unwrap_or_default()
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    frame: Duration,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(frame));

    terminal.draw(|f| ui(app, f))?;

    loop {
        let event = runner.step();
        let now = Instant::now();
        let mut dirty = false;

        match event {
            AppEvent::Tick => {}
            AppEvent::Resize => dirty = true,
            AppEvent::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => break,
                // ctrl+c to quit
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('r') => dirty = app.page.reset_finished() > 0,
                _ => {}
            },
            AppEvent::Mouse(mouse) => {
                let size = terminal.size().unwrap_or_default();
                let area = Rect::new(0, 0, size.width, size.height);
                dirty = app.on_mouse(mouse, area, now);
            }
        }

        // Frames keep coming only while a ring is moving or a checkmark fading
        if app.page.is_animating() {
            app.page.tick(now);
            dirty = true;
        }
        if app.is_fading(now) {
            dirty = true;
        }

        if dirty {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(
        PageScreen {
            page: &app.page,
            now: Instant::now(),
            fade: app.fade,
        },
        f.area(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crossterm::event::KeyModifiers;
    use longpress::press::PressState;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["longpress"]);

        assert_eq!(cli.duration, None);
        assert_eq!(cli.label, None);
        assert_eq!(cli.count, None);
        assert_eq!(cli.svg, None);
        assert!(cli.log.is_none());
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["longpress", "-d", "2", "-l", "Hold", "-n", "5"]);
        assert_eq!(cli.duration, Some(2.0));
        assert_eq!(cli.label.as_deref(), Some("Hold"));
        assert_eq!(cli.count, Some(5));

        let cli = Cli::parse_from(["longpress", "--duration", "0.5", "--frame-ms", "33"]);
        assert_eq!(cli.duration, Some(0.5));
        assert_eq!(cli.frame_ms, Some(33));
    }

    #[test]
    fn test_cli_count_is_bounded() {
        assert_eq!(Cli::parse_from(["longpress", "-n", "32"]).count, Some(32));

        for bad in ["0", "33", "40000", "65536", "-1"] {
            assert!(
                Cli::try_parse_from(["longpress", "-n", bad]).is_err(),
                "count {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_cli_log_flag_with_and_without_path() {
        let cli = Cli::parse_from(["longpress", "--log"]);
        assert_eq!(cli.log, Some(None));

        let cli = Cli::parse_from(["longpress", "--log", "/tmp/lp.log"]);
        assert_eq!(cli.log, Some(Some(PathBuf::from("/tmp/lp.log"))));
    }

    #[test]
    fn test_cli_svg_progress_is_validated() {
        let cli = Cli::parse_from(["longpress", "--svg", "0.5"]);
        assert_eq!(cli.svg, Some(0.5));

        assert!(Cli::try_parse_from(["longpress", "--svg", "1.5"]).is_err());
        assert!(Cli::try_parse_from(["longpress", "--svg", "half"]).is_err());
    }

    #[test]
    fn test_cli_apply_overrides_config() {
        let cli = Cli::parse_from(["longpress", "-d", "2", "-l", "Go", "-n", "2", "--frame-ms", "40"]);
        let config = cli.apply(Config::default());

        assert_eq!(config.buttons.len(), 2);
        assert!(config
            .buttons
            .iter()
            .all(|b| b.duration_secs == 2.0 && b.label == "Go"));
        assert_eq!(config.frame_ms, 40);
    }

    #[test]
    fn test_cli_apply_without_flags_keeps_config() {
        let cli = Cli::parse_from(["longpress"]);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_app_mouse_press_and_release() {
        let t0 = Instant::now();
        let mut app = App::new(&Config::default(), t0);
        let area = Rect::new(0, 0, 80, 24);
        let center = longpress::ui::button_areas(area, 3)[0];
        let (col, row) = (center.x + center.width / 2, center.y + center.height / 2);

        assert!(app.on_mouse(mouse(MouseEventKind::Down(MouseButton::Left), col, row), area, t0));
        assert_eq!(app.page.buttons()[0].state(), PressState::Pressing);

        // moving or right-clicking does nothing
        assert!(!app.on_mouse(mouse(MouseEventKind::Moved, col, row), area, t0));
        assert!(!app.on_mouse(mouse(MouseEventKind::Down(MouseButton::Right), col, row), area, t0));

        app.page.tick(t0 + Duration::from_millis(100));
        assert!(app.on_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0), area, t0));
        assert_eq!(app.page.buttons()[0].state(), PressState::Releasing);
    }

    #[test]
    fn test_app_fades_after_completion() {
        let t0 = Instant::now();
        let mut app = App::new(&Config::default(), t0);
        assert!(!app.is_fading(t0));

        let area = Rect::new(0, 0, 80, 24);
        let b = longpress::ui::button_areas(area, 3)[2];
        app.on_mouse(
            mouse(MouseEventKind::Down(MouseButton::Left), b.x + b.width / 2, b.y + b.height / 2),
            area,
            t0,
        );
        let done = t0 + Duration::from_millis(750);
        app.page.tick(done);

        assert!(app.is_fading(done));
        assert!(!app.is_fading(done + Duration::from_secs(1)));
    }

    #[test]
    fn test_render_svg_at_progress() {
        let config = Config::default();
        let idle = render_svg(&config, 0.0);
        assert!(idle.contains("<svg"));
        assert!(idle.contains("Press Me"));
        assert!(!idle.contains(&format!("class=\"{}\"", svg::FADE_IN_CLASS)));

        let done = render_svg(&config, 1.0);
        assert!(done.contains(&format!("class=\"{}\"", svg::FADE_IN_CLASS)));
    }
}
