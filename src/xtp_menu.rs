// Menu screen
// Name input, difficulty and language selectors, play and quit buttons.
// Every localized string is reached through a binding so a locale switch re-applies all of them.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::text::{Span, Spans};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use tracing::{info, warn};
use unicode_width::UnicodeWidthStr;

use crate::xtp_color::{font_style, Theme};
use crate::xtp_error::Result;
use crate::xtp_game::{Context, Difficulty};
use crate::xtp_lang::{Lang, MsgKey};
use crate::xtp_ui::center_rect;

/// Handle of a widget inside its menu
pub type WidgetId = usize;

/// Maximum characters accepted by the name input
pub const NAME_MAXCHAR: usize = 10;

const DIFFICULTY_ITEMS: &[Difficulty] = &Difficulty::ALL;

/// What the shell should do after the menu handled a batch of events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    None,
    Play,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorValue {
    Level(u8),
    Locale(String),
}

#[derive(Debug, Clone)]
pub enum WidgetKind {
    TextInput {
        value: String,
        default: String,
        maxchar: usize,
    },
    Selector {
        items: Vec<(String, SelectorValue)>,
        index: usize,
    },
    Button,
}

#[derive(Debug, Clone)]
pub struct Widget {
    pub title: String,
    pub font: Style,
    pub kind: WidgetKind,
}

impl Widget {
    fn new(kind: WidgetKind) -> Widget {
        Widget {
            title: String::new(),
            font: Style::default(),
            kind,
        }
    }

    /// Text shown for this widget; focused widgets get edit/selection markers
    pub fn display_text(&self, focused: bool) -> String {
        match &self.kind {
            WidgetKind::TextInput { value, .. } => {
                if focused {
                    format!("{}{}_", self.title, value)
                } else {
                    format!("{}{}", self.title, value)
                }
            }
            WidgetKind::Selector { items, index, .. } => {
                let label = items.get(*index).map_or("", |(l, _)| l.as_str());
                if focused {
                    format!("{}< {} >", self.title, label)
                } else {
                    format!("{}{}", self.title, label)
                }
            }
            WidgetKind::Button => self.title.clone(),
        }
    }

    fn apply(&mut self, field: Field, lang: &Lang) {
        match field {
            Field::Title(key) => self.title = lang.tr(key).to_string(),
            Field::Label(key) => self.title = format!("{}: ", lang.tr(key)),
            Field::Font(key) => self.font = font_style(lang.tr(key)),
            Field::DefaultValue(key) => {
                if let WidgetKind::TextInput {
                    value,
                    default,
                    maxchar,
                } = &mut self.kind
                {
                    let new_default: String = lang.tr(key).chars().take(*maxchar).collect();
                    // untouched inputs follow the default
                    if value == default {
                        *value = new_default.clone();
                    }
                    *default = new_default;
                }
            }
            Field::Items(levels) => {
                if let WidgetKind::Selector { items, .. } = &mut self.kind {
                    *items = levels
                        .iter()
                        .map(|d| (lang.tr(d.label_key()).to_string(), SelectorValue::Level(d.level())))
                        .collect();
                }
            }
        }
    }
}

/// Where a binding writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Window,
    MenuTitle,
    MenuBar,
    Widget(WidgetId),
}

/// Which property of the target a binding sets, and from which keys
#[derive(Debug, Clone, Copy)]
pub enum Field {
    Title(MsgKey),
    /// Title rendered as "<text>: "
    Label(MsgKey),
    Font(MsgKey),
    DefaultValue(MsgKey),
    /// Selector options, one localized label per difficulty
    Items(&'static [Difficulty]),
}

#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub target: Target,
    pub field: Field,
}

pub struct MenuScreen {
    pub window_title: String,
    pub title: String,
    pub bar_font: Style,
    widgets: Vec<Widget>,
    bindings: Vec<Binding>,
    focus: usize,
    enabled: bool,
    pub name_input: WidgetId,
    pub difficulty_selector: WidgetId,
    pub language_selector: WidgetId,
    pub play_button: WidgetId,
    pub quit_button: WidgetId,
}

impl MenuScreen {
    /// Build the menu for the current selection and render it in the active locale
    pub fn new(ctx: &Context) -> MenuScreen {
        let mut menu = MenuScreen {
            window_title: String::new(),
            title: String::new(),
            bar_font: Style::default(),
            widgets: Vec::new(),
            bindings: Vec::new(),
            focus: 0,
            enabled: true,
            name_input: 0,
            difficulty_selector: 0,
            language_selector: 0,
            play_button: 0,
            quit_button: 0,
        };

        menu.bind(Target::Window, Field::Title(MsgKey::WindowTitle));
        menu.bind(Target::MenuTitle, Field::Title(MsgKey::AppTitle));
        menu.bind(Target::MenuBar, Field::Font(MsgKey::WidgetFont));

        menu.name_input = menu.add_widget(WidgetKind::TextInput {
            value: ctx.selection.player_name.chars().take(NAME_MAXCHAR).collect(),
            default: String::new(),
            maxchar: NAME_MAXCHAR,
        });
        menu.bind_widget(menu.name_input, Field::Label(MsgKey::Name));
        menu.bind_widget(menu.name_input, Field::DefaultValue(MsgKey::NameDefault));

        menu.difficulty_selector = menu.add_widget(WidgetKind::Selector {
            items: Vec::new(),
            index: DIFFICULTY_ITEMS
                .iter()
                .position(|d| *d == ctx.selection.difficulty)
                .unwrap_or(0),
        });
        menu.bind_widget(menu.difficulty_selector, Field::Label(MsgKey::Difficulty));
        menu.bind_widget(menu.difficulty_selector, Field::Items(DIFFICULTY_ITEMS));

        // language names are shown in their own language and never re-localized
        let locales = ctx.lang.locales();
        let language_index = locales
            .iter()
            .position(|(code, _)| *code == ctx.selection.locale)
            .unwrap_or(0);
        menu.language_selector = menu.add_widget(WidgetKind::Selector {
            items: locales
                .into_iter()
                .map(|(code, name)| (name, SelectorValue::Locale(code)))
                .collect(),
            index: language_index,
        });
        menu.bind_widget(menu.language_selector, Field::Label(MsgKey::Language));

        menu.play_button = menu.add_widget(WidgetKind::Button);
        menu.bind_widget(menu.play_button, Field::Title(MsgKey::Play));

        menu.quit_button = menu.add_widget(WidgetKind::Button);
        menu.bind_widget(menu.quit_button, Field::Title(MsgKey::Quit));

        for id in 0..menu.widgets.len() {
            menu.bind_widget(id, Field::Font(MsgKey::WidgetFont));
        }

        // the name input starts at the localized default unless the selection says otherwise
        if let Some(Widget {
            kind: WidgetKind::TextInput { value, default, .. },
            ..
        }) = menu.widgets.get_mut(menu.name_input)
        {
            if *value == ctx.lang.tr(MsgKey::NameDefault) {
                default.clone_from(value);
            }
        }

        menu.apply_locale(&ctx.lang);
        menu
    }

    fn add_widget(&mut self, kind: WidgetKind) -> WidgetId {
        self.widgets.push(Widget::new(kind));
        self.widgets.len() - 1
    }

    pub fn bind(&mut self, target: Target, field: Field) {
        self.bindings.push(Binding { target, field });
    }

    fn bind_widget(&mut self, id: WidgetId, field: Field) {
        self.bind(Target::Widget(id), field);
    }

    /// Re-set every bound string and font from the active catalog
    pub fn apply_locale(&mut self, lang: &Lang) {
        for i in 0..self.bindings.len() {
            let binding = self.bindings[i];
            self.apply_binding(binding, lang);
        }
    }

    fn apply_binding(&mut self, binding: Binding, lang: &Lang) {
        match (binding.target, binding.field) {
            (Target::Window, Field::Title(key)) => self.window_title = lang.tr(key).to_string(),
            (Target::MenuTitle, Field::Title(key)) => self.title = lang.tr(key).to_string(),
            (Target::MenuBar, Field::Font(key)) => self.bar_font = font_style(lang.tr(key)),
            (Target::Widget(id), field) => match self.widgets.get_mut(id) {
                Some(widget) => widget.apply(field, lang),
                None => warn!(id, "binding to missing widget"),
            },
            (target, field) => warn!(?target, ?field, "unsupported binding"),
        }
    }

    pub fn on_difficulty_change(&self, ctx: &mut Context, label: &str, value: u8) -> Result<()> {
        let difficulty = Difficulty::try_from(value)?;
        info!("Set difficulty to {} ({})", label, value);
        ctx.selection.difficulty = difficulty;
        Ok(())
    }

    pub fn on_locale_change(&mut self, ctx: &mut Context, label: &str, value: &str) -> Result<()> {
        ctx.set_locale(value)?;
        info!("Set language to {} ({})", label, value);
        self.apply_locale(&ctx.lang);
        ctx.selection.player_name = self.player_name().to_string();
        Ok(())
    }

    pub fn on_play(&mut self, ctx: &Context) -> MenuAction {
        info!(
            player = %ctx.selection.player_name,
            difficulty = ctx.selection.difficulty.level(),
            locale = %ctx.selection.locale,
            "starting game"
        );
        self.disable();
        self.full_reset();
        MenuAction::Play
    }

    pub fn on_quit(&mut self) -> MenuAction {
        info!("quit requested from menu");
        MenuAction::Quit
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Return focus to the first widget
    pub fn full_reset(&mut self) {
        self.focus = 0;
    }

    pub fn player_name(&self) -> &str {
        match self.widgets.get(self.name_input).map(|w| &w.kind) {
            Some(WidgetKind::TextInput { value, .. }) => value.as_str(),
            _ => "",
        }
    }

    /// Handle one frame's events; ignored while the menu is disabled
    pub fn update(&mut self, events: &[Event], ctx: &mut Context) -> Result<MenuAction> {
        if !self.enabled {
            return Ok(MenuAction::None);
        }
        for event in events {
            let action = self.handle_event(event, ctx)?;
            if action != MenuAction::None {
                return Ok(action);
            }
        }
        Ok(MenuAction::None)
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut Context) -> Result<MenuAction> {
        let Event::Key(key) = event else {
            return Ok(MenuAction::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(MenuAction::None);
        }
        if is_close_key(key) {
            return Ok(self.on_quit());
        }
        match key.code {
            KeyCode::Up | KeyCode::BackTab => self.step_focus(-1),
            KeyCode::Down | KeyCode::Tab => self.step_focus(1),
            KeyCode::Left => self.step_selector(-1, ctx)?,
            KeyCode::Right => self.step_selector(1, ctx)?,
            KeyCode::Enter => return self.activate(ctx),
            KeyCode::Backspace => self.edit_name(None, ctx),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.edit_name(Some(c), ctx)
            }
            _ => {}
        }
        Ok(MenuAction::None)
    }

    fn step_focus(&mut self, step: isize) {
        let len = self.widgets.len() as isize;
        if len > 0 {
            self.focus = (self.focus as isize + step).rem_euclid(len) as usize;
        }
    }

    /// Cycle the focused selector and fire the callback bound to it
    fn step_selector(&mut self, step: isize, ctx: &mut Context) -> Result<()> {
        let id = self.focus;
        let Some(Widget {
            kind: WidgetKind::Selector { items, index },
            ..
        }) = self.widgets.get_mut(id)
        else {
            return Ok(());
        };
        if items.is_empty() {
            return Ok(());
        }
        *index = (*index as isize + step).rem_euclid(items.len() as isize) as usize;
        let (label, value) = items[*index].clone();

        match value {
            SelectorValue::Level(level) if id == self.difficulty_selector => {
                self.on_difficulty_change(ctx, &label, level)
            }
            SelectorValue::Locale(code) if id == self.language_selector => {
                self.on_locale_change(ctx, &label, &code)
            }
            value => {
                warn!(id, ?value, "selector has no matching callback");
                Ok(())
            }
        }
    }

    fn activate(&mut self, ctx: &mut Context) -> Result<MenuAction> {
        let id = self.focus;
        if id == self.play_button {
            return Ok(self.on_play(ctx));
        }
        if id == self.quit_button {
            return Ok(self.on_quit());
        }
        if matches!(self.widgets.get(id).map(|w| &w.kind), Some(WidgetKind::Selector { .. })) {
            self.step_selector(1, ctx)?;
        }
        Ok(MenuAction::None)
    }

    fn edit_name(&mut self, ch: Option<char>, ctx: &mut Context) {
        let Some(Widget {
            kind: WidgetKind::TextInput { value, maxchar, .. },
            ..
        }) = self.widgets.get_mut(self.focus)
        else {
            return;
        };
        match ch {
            Some(c) if value.chars().count() < *maxchar => value.push(c),
            Some(_) => return,
            None => {
                if value.pop().is_none() {
                    return;
                }
            }
        }
        ctx.selection.player_name = value.clone();
    }

    pub fn draw<B: Backend>(&self, f: &mut Frame<B>, theme: &Theme) {
        let size = f.size();
        f.render_widget(
            Block::default().style(Style::default().bg(theme.background)),
            size,
        );

        let lines: Vec<(String, Style)> = self
            .widgets
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let focused = self.enabled && i == self.focus;
                let style = if focused {
                    w.font.bg(theme.focus_bg).fg(theme.focus_fg)
                } else {
                    w.font.fg(theme.widget_fg)
                };
                (w.display_text(focused), style)
            })
            .collect();

        let content_w = lines
            .iter()
            .map(|(s, _)| s.as_str().width())
            .chain(std::iter::once(self.title.as_str().width()))
            .max()
            .unwrap_or(0) as u16;
        let width = (content_w + 8).max(40).min(size.width);
        let height = (lines.len() as u16 * 2 + 3).min(size.height);
        let area = center_rect(width, height, size);

        let title = Span::styled(
            format!(" {} ", self.title),
            self.bar_font.bg(theme.title_bg).fg(theme.title_fg),
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(theme.background).fg(theme.widget_fg));

        let mut text = vec![Spans::from("")];
        for (line, style) in lines {
            text.push(Spans::from(Span::styled(line, style)));
            text.push(Spans::from(""));
        }

        f.render_widget(Clear, area);
        f.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
    }
}

/// Ctrl+C stands in for the window-close button
pub fn is_close_key(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}
