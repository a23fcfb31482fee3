// Play screen
// Runs until Escape: a localized message over a background that changes color every frame

use crossterm::event::{Event, KeyCode, KeyEventKind};
use rand::Rng;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::info;

use crate::xtp_color::{font_style, ColorDepth};
use crate::xtp_error::Result;
use crate::xtp_game::Context;
use crate::xtp_lang::{MsgKey, PluralKey};
use crate::xtp_menu::{is_close_key, MenuAction, MenuScreen};
use crate::xtp_ui::{FrameClock, Host};

/// Score shown on the play screen
pub const DEMO_SCORE: f64 = 12345.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Running,
    Exiting,
}

/// How the play loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayExit {
    /// Escape pressed; the menu is enabled again
    Menu,
    /// Close requested; the whole application stops
    Quit,
}

/// Text drawn on one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameText {
    pub message: String,
    pub instruction: String,
    pub score: String,
}

/// Build the frame text from the current selection
pub fn frame_text(ctx: &Context) -> Result<FrameText> {
    let lang = &ctx.lang;
    let difficulty = ctx.selection.difficulty;
    let count = difficulty.level() as u64;
    let message = format!(
        "[{}] {}",
        lang.tr(difficulty.label_key()),
        lang.tr_plural(PluralKey::GameMessage, count)
    );
    let score = format!(
        "{}: {}",
        lang.tr(MsgKey::Score),
        lang.format_number(DEMO_SCORE, &ctx.selection.locale)?
    );
    Ok(FrameText {
        message,
        instruction: lang.tr(MsgKey::InstructionBackToMenu).to_string(),
        score,
    })
}

/// Three independent uniform draws over 0..=255
pub fn random_color<R: Rng>(rng: &mut R) -> (u8, u8, u8) {
    (
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
    )
}

pub struct PlayScreen<R: Rng> {
    state: PlayState,
    rng: R,
    depth: ColorDepth,
    text: Option<FrameText>,
    font: Style,
    background: (u8, u8, u8),
    frames: u64,
}

impl<R: Rng> PlayScreen<R> {
    pub fn new(rng: R, depth: ColorDepth) -> Self {
        PlayScreen {
            state: PlayState::Running,
            rng,
            depth,
            text: None,
            font: Style::default(),
            background: (0, 0, 0),
            frames: 0,
        }
    }

    /// Process one frame's events and prepare what to draw.
    /// Returns Some when the loop must stop.
    pub fn step(
        &mut self,
        events: &[Event],
        menu: &mut MenuScreen,
        ctx: &mut Context,
    ) -> Result<Option<PlayExit>> {
        if self.state == PlayState::Exiting {
            return Ok(Some(PlayExit::Menu));
        }

        for event in events {
            let Event::Key(key) = event else { continue };
            if is_close_key(key) {
                info!(frames = self.frames, "close requested while playing");
                return Ok(Some(PlayExit::Quit));
            }
            if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc {
                menu.enable();
                self.state = PlayState::Exiting;
                info!(frames = self.frames, "back to menu");
                return Ok(Some(PlayExit::Menu));
            }
        }

        // overlay: an enabled menu sees the same events
        if menu.is_enabled() && menu.update(events, ctx)? == MenuAction::Quit {
            return Ok(Some(PlayExit::Quit));
        }

        self.text = Some(frame_text(ctx)?);
        self.font = font_style(ctx.lang.tr(MsgKey::WidgetFont));
        self.background = random_color(&mut self.rng);
        self.frames += 1;
        Ok(None)
    }

    pub fn draw<B: Backend>(&self, f: &mut Frame<B>) {
        let size = f.size();
        let (r, g, b) = self.background;
        let bg = self.depth.rgb(r, g, b);
        f.render_widget(Block::default().style(Style::default().bg(bg)), size);

        let Some(text) = &self.text else { return };
        let style = self.font.bg(bg).fg(self.depth.rgb(255, 255, 255));
        let mid = size.y + size.height / 2;
        let line = |y: u16, x: u16| -> Rect {
            if y < size.bottom() && x < size.right() {
                Rect::new(x, y, size.right() - x, 1)
            } else {
                Rect::default()
            }
        };

        let centered = |s: &str| {
            Paragraph::new(Span::styled(s.to_string(), style)).alignment(Alignment::Center)
        };

        f.render_widget(centered(&text.message), line(mid.saturating_sub(1), size.x));
        f.render_widget(centered(&text.instruction), line(mid + 1, size.x));
        f.render_widget(
            Paragraph::new(Span::styled(text.score.clone(), style)),
            line(size.y + 1, size.x + 2),
        );
    }

    /// Blocking loop: one tick, one batch of events, one draw per frame
    pub fn run<B: Backend, H: Host>(
        &mut self,
        terminal: &mut Terminal<B>,
        host: &mut H,
        clock: &mut FrameClock,
        menu: &mut MenuScreen,
        ctx: &mut Context,
    ) -> Result<PlayExit> {
        loop {
            clock.tick();
            let events = host.poll_events()?;
            if let Some(exit) = self.step(&events, menu, ctx)? {
                return Ok(exit);
            }
            terminal.draw(|f| self.draw(f))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xtp_game::Difficulty;
    use crate::xtp_lang::tests::shipped;
    use crate::xtp_menu::tests::{ctrl_c, key};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;

    impl<R: Rng> PlayScreen<R> {
        fn state(&self) -> PlayState {
            self.state
        }

        fn text(&self) -> Option<&FrameText> {
            self.text.as_ref()
        }

        fn background(&self) -> (u8, u8, u8) {
            self.background
        }
    }

    fn setup(locale: &str) -> (PlayScreen<StdRng>, MenuScreen, Context) {
        let ctx = Context::new(shipped(), locale).unwrap();
        let mut menu = MenuScreen::new(&ctx);
        menu.on_play(&ctx);
        let play = PlayScreen::new(StdRng::seed_from_u64(7), ColorDepth::TrueColor);
        (play, menu, ctx)
    }

    #[test]
    fn message_pluralizes_on_difficulty_level() {
        let mut ctx = Context::new(shipped(), "en_US").unwrap();
        let expected = [
            (Difficulty::Easy, "[Easy] 1 enemy is waiting for you!"),
            (Difficulty::Medium, "[Medium] 2 enemies are waiting for you!"),
            (Difficulty::Hard, "[Hard] 3 enemies are waiting for you!"),
        ];
        for (difficulty, message) in expected {
            ctx.selection.difficulty = difficulty;
            assert_eq!(frame_text(&ctx).unwrap().message, message);
        }
    }

    #[test]
    fn score_and_instruction_are_localized() {
        let ctx = Context::new(shipped(), "de_DE").unwrap();
        let text = frame_text(&ctx).unwrap();
        assert_eq!(text.score, "Punkte: 12.345,6");
        assert_eq!(text.instruction, "Drücke ESC, um zum Menü zurückzukehren");
        assert_eq!(text.message, "[Leicht] 1 Gegner wartet auf dich!");
    }

    #[test]
    fn hard_game_started_from_menu() {
        let mut ctx = Context::new(shipped(), "en_US").unwrap();
        let mut menu = MenuScreen::new(&ctx);
        let events = [
            key(KeyCode::Down),
            key(KeyCode::Left),
            key(KeyCode::Down),
            key(KeyCode::Down),
            key(KeyCode::Enter),
        ];
        assert_eq!(menu.update(&events, &mut ctx).unwrap(), MenuAction::Play);
        assert_eq!(ctx.selection.difficulty, Difficulty::Hard);

        let mut play = PlayScreen::new(StdRng::seed_from_u64(1), ColorDepth::TrueColor);
        assert_eq!(play.step(&[], &mut menu, &mut ctx).unwrap(), None);
        let text = play.text().unwrap();
        assert!(text.message.starts_with("[Hard] "));
        assert_eq!(
            text.message,
            format!("[Hard] {}", ctx.lang.tr_plural(PluralKey::GameMessage, 3))
        );
        assert_eq!(play.state(), PlayState::Running);
    }

    #[test]
    fn escape_returns_to_enabled_menu() {
        let (mut play, mut menu, mut ctx) = setup("en_US");
        assert!(!menu.is_enabled());
        play.step(&[], &mut menu, &mut ctx).unwrap();

        let exit = play
            .step(&[key(KeyCode::Esc), key(KeyCode::Down)], &mut menu, &mut ctx)
            .unwrap();
        assert_eq!(exit, Some(PlayExit::Menu));
        assert_eq!(play.state(), PlayState::Exiting);
        assert!(menu.is_enabled());
        // events after Escape in the same frame are dropped
        assert_eq!(menu.focus(), menu.name_input);

        // the next frame belongs to the menu
        menu.update(&[key(KeyCode::Down)], &mut ctx).unwrap();
        assert_eq!(menu.focus(), menu.difficulty_selector);

        // exiting is terminal
        assert_eq!(
            play.step(&[], &mut menu, &mut ctx).unwrap(),
            Some(PlayExit::Menu)
        );
    }

    #[test]
    fn close_key_quits_without_touching_menu() {
        let (mut play, mut menu, mut ctx) = setup("en_US");
        let exit = play.step(&[ctrl_c()], &mut menu, &mut ctx).unwrap();
        assert_eq!(exit, Some(PlayExit::Quit));
        assert!(!menu.is_enabled());
        assert_eq!(play.state(), PlayState::Running);
    }

    #[test]
    fn enabled_menu_receives_events_while_playing() {
        let (mut play, mut menu, mut ctx) = setup("en_US");
        menu.enable();
        assert_eq!(play.step(&[key(KeyCode::Down)], &mut menu, &mut ctx).unwrap(), None);
        assert_eq!(menu.focus(), menu.difficulty_selector);
        // language switch through the overlay shows up in the next frame's text
        play.step(&[key(KeyCode::Down), key(KeyCode::Left)], &mut menu, &mut ctx)
            .unwrap();
        assert_eq!(ctx.selection.locale, "de_DE");
        assert!(play.text().unwrap().score.starts_with("Punkte: "));
    }

    #[test]
    fn background_changes_every_frame() {
        let (mut play, mut menu, mut ctx) = setup("en_US");
        let mut seen = std::collections::HashSet::new();
        for _ in 0..20 {
            play.step(&[], &mut menu, &mut ctx).unwrap();
            seen.insert(play.background());
        }
        assert!(seen.len() > 15);
    }

    #[test]
    fn random_channels_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let frames = 8000;
        let mut bins = [[0usize; 4]; 3];
        let (mut lowest, mut highest) = (255u8, 0u8);
        for _ in 0..frames {
            let (r, g, b) = random_color(&mut rng);
            for (channel, value) in [r, g, b].into_iter().enumerate() {
                bins[channel][value as usize / 64] += 1;
                lowest = lowest.min(value);
                highest = highest.max(value);
            }
        }
        let expected = frames / 4;
        for channel in bins {
            for count in channel {
                let diff = count.abs_diff(expected);
                assert!(diff < expected / 10, "bin count {count} vs {expected}");
            }
        }
        assert!(lowest < 8);
        assert!(highest > 247);
    }

    #[test]
    fn draw_places_text_and_background() {
        let (mut play, mut menu, mut ctx) = setup("en_US");
        play.step(&[], &mut menu, &mut ctx).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| play.draw(f)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let row = |y: u16| -> String {
            (0..60).map(|x| buffer.get(x, y).symbol.as_str()).collect::<String>()
        };
        let text = play.text().unwrap();
        assert!(row(5).contains(&text.message));
        assert!(row(7).contains(&text.instruction));
        assert!(row(1).starts_with("  Score: 12,345.6"));

        let (r, g, b) = play.background();
        assert_eq!(buffer.get(0, 0).bg, Color::Rgb(r, g, b));
        assert_eq!(buffer.get(59, 11).bg, Color::Rgb(r, g, b));
    }
}
