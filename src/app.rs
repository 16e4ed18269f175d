//! Application orchestrator
//!
//! `App` owns the layout tree, the cell grid, the message history and at most
//! one open menu. Hosts feed it [`InputEvent`]s and call [`App::refresh`]
//! once per frame; it never touches the terminal itself.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::history::{DisplayEntry, EntryStyles, MessageHistory};
use crate::ui::input::{FocusContext, InputEvent, KeyEvent};
use crate::ui::layout::{Anchors, InputNode, LayoutTree, NodeId, NodeKind, Rect, Size, Transform, Vec2};
use crate::ui::menu::{MenuItem, MenuStyles, MenuWindow};
use crate::ui::messages::MessagePane;
use crate::ui::paint::paint;
use crate::ui::render::{RenderBuffer, Style};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draw priority of popup menus over the base screen
const MENU_LAYER: i32 = 10;

/// What an open menu is choosing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPurpose {
    SelectServer,
    SelectChannel,
}

/// Outcome of handling one input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    None,
    Quit,
    /// The composer submitted a line for a channel
    Send { channel: String, text: String },
    /// A menu item was picked; `marked` holds payloads of marked items
    Picked {
        purpose: MenuPurpose,
        payload: String,
        marked: Vec<String>,
    },
    /// A key nothing consumed, for host-level bindings
    Unhandled(KeyEvent),
}

#[derive(Debug)]
struct ActiveMenu {
    purpose: MenuPurpose,
    menu: MenuWindow<String>,
}

pub struct App {
    config: Config,
    tree: LayoutTree,
    buffer: RenderBuffer,
    focus: FocusContext,
    history: MessageHistory,
    pane: MessagePane,
    composer: NodeId,
    menu: Option<ActiveMenu>,
    server: Option<String>,
    channel: Option<String>,
    entry_styles: EntryStyles,
    menu_styles: MenuStyles,
    header_style: Style,
}

impl App {
    pub fn new(config: Config, cols: u16, rows: u16) -> Result<Self> {
        let mut tree = LayoutTree::new();
        let prompt_style = config.styles.prompt();
        let composer = tree
            .insert(
                tree.root(),
                Transform::anchored(Anchors::new(Vec2::new(0.0, 1.0), Vec2::ONE)?)
                    .with_offset(0, -1)
                    .with_size(Size::height(1)),
                NodeKind::Input(InputNode::new(Style::new()).with_prompt("", prompt_style)),
            )
            .context("failed to create composer")?;

        let mut focus = FocusContext::new();
        focus.set_focus(composer);

        let mut app = Self {
            history: MessageHistory::new(config.display.history_limit),
            pane: MessagePane::new(config.display.padding, config.display.page_step),
            entry_styles: config.styles.entries(),
            menu_styles: config.styles.menu(),
            header_style: config.styles.header(),
            config,
            tree,
            buffer: RenderBuffer::new(cols, rows),
            focus,
            composer,
            menu: None,
            server: None,
            channel: None,
        };
        app.update_prompt();
        Ok(app)
    }

    pub fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn focus(&self) -> &FocusContext {
        &self.focus
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    pub fn push_entry(&mut self, entry: DisplayEntry) {
        self.history.push(entry);
    }

    pub fn log(&mut self, text: impl Into<String>) {
        self.history.log(text);
    }

    pub fn composer(&self) -> NodeId {
        self.composer
    }

    pub fn composer_text(&self) -> &str {
        self.tree
            .input(self.composer)
            .map_or("", |input| input.buffer.text.as_str())
    }

    pub fn menu(&self) -> Option<&MenuWindow<String>> {
        self.menu.as_ref().map(|active| &active.menu)
    }

    pub fn menu_purpose(&self) -> Option<MenuPurpose> {
        self.menu.as_ref().map(|active| active.purpose)
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn set_server(&mut self, server: Option<String>) {
        info!(?server, "server selected");
        self.server = server;
        self.channel = None;
        self.update_prompt();
    }

    pub fn set_channel(&mut self, channel: Option<String>) {
        info!(?channel, "channel selected");
        self.channel = channel;
        self.update_prompt();
    }

    fn update_prompt(&mut self) {
        let prompt = match &self.channel {
            Some(channel) => format!("Send to #{channel}:"),
            None => "Send to:".to_string(),
        };
        if let Some(input) = self.tree.input_mut(self.composer) {
            input.prompt = prompt;
        }
    }

    /// Banner text for row 0
    pub fn header_text(&self) -> String {
        let mut header = format!(" Discorder (v{VERSION})");
        match (&self.server, &self.channel) {
            (Some(server), Some(channel)) => {
                header.push_str(&format!(" Server: {server}, Active Channel: #{channel}"));
            }
            (Some(server), None) => {
                header.push_str(&format!(" Server: {server}, Ctrl+H to select a channel"));
            }
            (None, _) => header.push_str(" Ctrl+S to select a server"),
        }
        header.push(' ');
        header
    }

    /// Open a menu over the screen, replacing any open one, and focus its
    /// search field
    pub fn open_menu(
        &mut self,
        purpose: MenuPurpose,
        title: &str,
        items: Vec<MenuItem<String>>,
    ) -> Result<()> {
        self.close_menu()?;

        let anchors = self.config.menu.anchors().context("invalid menu anchors")?;
        let root = self.tree.root();
        let mut menu = MenuWindow::new(
            &mut self.tree,
            root,
            title,
            anchors,
            MENU_LAYER,
            self.menu_styles,
        )
        .context("failed to create menu")?;
        menu.set_rank_order(self.config.menu.rank_order);
        menu.set_options(items);
        self.focus.set_focus(menu.search_input());

        debug!(?purpose, options = menu.options().len(), "menu opened");
        self.menu = Some(ActiveMenu { purpose, menu });
        Ok(())
    }

    /// Close the open menu, if any, and give focus back to the composer
    pub fn close_menu(&mut self) -> Result<()> {
        if let Some(active) = self.menu.take() {
            active
                .menu
                .destroy(&mut self.tree)
                .context("failed to destroy menu")?;
            debug!(purpose = ?active.purpose, "menu closed");
        }
        self.focus.set_focus(self.composer);
        Ok(())
    }

    /// Route one input event
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<AppEvent> {
        let key = match event {
            InputEvent::Resize { cols, rows } => {
                self.buffer.resize(*cols, *rows);
                if let Some(active) = &mut self.menu {
                    active.menu.handle_input(&mut self.tree, event);
                }
                return Ok(AppEvent::None);
            }
            InputEvent::Key(key) => *key,
        };

        if key == KeyEvent::Ctrl('c') {
            return Ok(AppEvent::Quit);
        }

        if self.menu.is_some() {
            return self.handle_menu_key(event, key);
        }

        match key {
            KeyEvent::PageUp => self.pane.page_up(),
            KeyEvent::PageDown => self.pane.page_down(),
            KeyEvent::Enter => return Ok(self.submit()),
            _ => {
                let consumed = self
                    .tree
                    .input_mut(self.composer)
                    .is_some_and(|input| input.buffer.handle_key(&key));
                if !consumed {
                    return Ok(AppEvent::Unhandled(key));
                }
            }
        }
        Ok(AppEvent::None)
    }

    fn handle_menu_key(&mut self, event: &InputEvent, key: KeyEvent) -> Result<AppEvent> {
        let Some(active) = &mut self.menu else {
            return Ok(AppEvent::None);
        };

        match key {
            KeyEvent::Escape => self.close_menu()?,
            KeyEvent::Enter => {
                let Some(picked) = active.menu.highlighted() else {
                    return Ok(AppEvent::None);
                };
                let payload = picked.payload.clone();
                let marked = active
                    .menu
                    .marked()
                    .into_iter()
                    .map(|item| item.payload.clone())
                    .collect();
                let purpose = active.purpose;
                self.close_menu()?;
                return Ok(AppEvent::Picked {
                    purpose,
                    payload,
                    marked,
                });
            }
            KeyEvent::Tab => {
                if let Some(index) = active.menu.highlighted_index() {
                    active.menu.toggle_mark(index as isize);
                }
            }
            _ => {
                if !active.menu.handle_input(&mut self.tree, event) {
                    return Ok(AppEvent::Unhandled(key));
                }
            }
        }
        Ok(AppEvent::None)
    }

    fn submit(&mut self) -> AppEvent {
        let Some(input) = self.tree.input_mut(self.composer) else {
            return AppEvent::None;
        };
        if input.buffer.text.trim().is_empty() {
            return AppEvent::None;
        }
        let Some(channel) = self.channel.clone() else {
            self.history.log("No channel selected, press Ctrl+S to pick a server");
            return AppEvent::None;
        };
        let text = input.buffer.submit();
        self.pane.scroll_to_bottom();
        AppEvent::Send { channel, text }
    }

    /// Recompute layout, rebuild dirty widgets and repaint the whole grid
    ///
    /// Returns the terminal cursor position, if the focused input is visible.
    pub fn refresh(&mut self) -> Result<Option<(u16, u16)>> {
        let viewport = self.buffer.area();
        let mut layout = self.tree.layout(viewport)?;

        if let Some(active) = &mut self.menu {
            if active.menu.update(&mut self.tree, &layout)? {
                layout = self.tree.layout(viewport)?;
            }
        }

        self.buffer.clear();
        self.buffer.draw_header(
            &self.header_text(),
            self.config.display.header_fill,
            &self.header_style,
        );

        let pane_area = Rect::new(0, 1, viewport.width, (viewport.height - 2).max(0));
        self.pane
            .draw(&mut self.buffer, pane_area, &self.history, &self.entry_styles);

        Ok(paint(&self.tree, &layout, &mut self.buffer, &self.focus))
    }
}
