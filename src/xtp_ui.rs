use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use crate::xtp_color::{ColorDepth, Theme};
use crate::xtp_error::Result;
use crate::xtp_game::{Context, Settings};
use crate::xtp_menu::{MenuAction, MenuScreen};
use crate::xtp_play::{PlayExit, PlayScreen};

/// The outside world as seen by the UI loops: input events and the window title
pub trait Host {
    /// Drain every pending event without blocking
    fn poll_events(&mut self) -> io::Result<Vec<Event>>;
    fn set_title(&mut self, title: &str) -> io::Result<()>;
}

/// Host backed by the real terminal
pub struct CrosstermHost;

impl Host for CrosstermHost {
    fn poll_events(&mut self) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            events.push(event::read()?);
        }
        Ok(events)
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, SetTitle(title))
    }
}

/// Caps the loop rate by sleeping off whatever is left of each frame
#[derive(Debug)]
pub struct FrameClock {
    frame: Duration,
    last: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        FrameClock {
            frame: Duration::from_secs(1) / fps.max(1),
            last: Instant::now(),
        }
    }

    /// Returns the time since the previous tick
    pub fn tick(&mut self) -> Duration {
        let busy = self.last.elapsed();
        if busy < self.frame {
            thread::sleep(self.frame - busy);
        }
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        dt
    }
}

/// Top-level shell: the menu loop, with the play loop nested inside it
pub struct App {
    menu: MenuScreen,
    clock: FrameClock,
    theme: Theme,
    depth: ColorDepth,
    shown_title: Option<String>,
}

impl App {
    pub fn new(settings: &Settings, ctx: &Context, depth: ColorDepth) -> App {
        App {
            menu: MenuScreen::new(ctx),
            clock: FrameClock::new(settings.fps),
            theme: Theme::blue(depth),
            depth,
            shown_title: None,
        }
    }

    /// Run until the user quits
    pub fn run<B: Backend, H: Host>(
        &mut self,
        terminal: &mut Terminal<B>,
        host: &mut H,
        ctx: &mut Context,
    ) -> Result<()> {
        loop {
            self.clock.tick();
            let events = host.poll_events()?;
            match self.menu.update(&events, ctx)? {
                MenuAction::None => {}
                MenuAction::Quit => break,
                MenuAction::Play => {
                    let mut play = PlayScreen::new(rand::thread_rng(), self.depth);
                    let exit = play.run(terminal, host, &mut self.clock, &mut self.menu, ctx)?;
                    match exit {
                        PlayExit::Menu => info!("menu resumed"),
                        PlayExit::Quit => break,
                    }
                }
            }

            if self.shown_title.as_deref() != Some(self.menu.window_title.as_str()) {
                host.set_title(&self.menu.window_title)?;
                self.shown_title = Some(self.menu.window_title.clone());
            }
            let (menu, theme) = (&self.menu, &self.theme);
            terminal.draw(|f| menu.draw(f, theme))?;
        }
        info!("quit");
        Ok(())
    }
}

/// Switch the terminal into raw/alternate mode, run the app, and always restore it
pub fn run(settings: &Settings, ctx: &mut Context) -> Result<()> {
    let depth = ColorDepth::detect();
    let mut app = App::new(settings, ctx, depth);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = app.run(&mut terminal, &mut CrosstermHost, ctx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

pub fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
