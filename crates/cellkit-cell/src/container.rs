#![forbid(unsafe_code)]

//! The container: root cell, focus slot, and input routing.
//!
//! # Routing
//!
//! | Input | Target |
//! |-------|--------|
//! | key pressed | shortcuts first, then the focused cell |
//! | key released / typed | the focused cell |
//! | mouse pressed / moved | the cell under the pointer |
//! | mouse dragged / released | the cell the press landed on |
//! | copy / cut / paste / complete | the focused cell |
//!
//! Every routed operation runs inside [`CellContainer::execute_command`].
//! The outermost command is bracketed by `on_before_command` and
//! `on_after_command`; nested commands run inline.
//!
//! # Focus
//!
//! [`CellContainer::set_focused_cell`] is guarded against reentrancy. The
//! old cell loses `FOCUSED` and receives `FOCUS_LOST` before the new cell
//! gains `FOCUSED` and receives `FOCUS_GAINED`.

use std::cell::{Cell as StdCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use cellkit_core::clipboard::{ClipboardContent, TextContent};
use cellkit_core::event::{
    CompletionEvent, Consumable, CopyCutEvent, FocusEvent, KeyEvent, MouseEvent, PasteEvent,
};
use cellkit_core::geometry::{Point, Rect};
use cellkit_core::observable::{Observable, Subscription};
use tracing::{debug, debug_span, trace};

use crate::cell::{Cell, CellKind};
use crate::config::{ContainerConfig, ShortcutAction};
use crate::error::{CellError, Result};
use crate::event_spec::{
    COMPLETE, COPY, CUT, CellEventSpec, FOCUS_GAINED, FOCUS_LOST, KEY_PRESSED, KEY_RELEASED,
    KEY_TYPED, MOUSE_DRAGGED, MOUSE_ENTERED, MOUSE_LEFT, MOUSE_MOVED, MOUSE_PRESSED,
    MOUSE_RELEASED, PASTE,
};
use crate::listener::CellContainerListener;
use crate::peer::{CellContainerPeer, NullPeer};
use crate::properties::FOCUSED;
use crate::property::PropertyChange;
use crate::registration::Registration;

#[derive(Default)]
struct MouseState {
    under_mouse: Option<Cell>,
    drag_start: Option<Cell>,
}

pub(crate) struct ContainerInner {
    root: Cell,
    focused: Observable<Option<Cell>>,
    changing_focus: StdCell<bool>,
    pub(crate) popups: RefCell<Vec<Cell>>,
    in_command: StdCell<bool>,
    clipboard: RefCell<Option<Rc<dyn ClipboardContent>>>,
    last_seen_text: RefCell<Option<String>>,
    peer: RefCell<Rc<dyn CellContainerPeer>>,
    listeners: RefCell<Vec<(u64, Rc<dyn CellContainerListener>)>>,
    next_listener_id: StdCell<u64>,
    mouse: RefCell<MouseState>,
    config: ContainerConfig,
}

/// Owner of a cell tree and router of host input into it.
///
/// Clones are handles to the same container.
#[derive(Clone)]
pub struct CellContainer {
    inner: Rc<ContainerInner>,
}

/// Resets a flag when dropped, including on unwind.
struct FlagGuard<'a>(&'a StdCell<bool>);

impl<'a> FlagGuard<'a> {
    fn raise(flag: &'a StdCell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Fires `on_after_command` and leaves command mode when dropped.
struct CommandGuard<'a> {
    container: &'a CellContainer,
}

impl Drop for CommandGuard<'_> {
    fn drop(&mut self) {
        self.container.each_listener(|l| l.on_after_command());
        self.container.inner.in_command.set(false);
        debug!("command finished");
    }
}

impl Default for CellContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl CellContainer {
    /// A container with a plain root cell, a [`NullPeer`] and default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ContainerConfig) -> Self {
        let root = Cell::new(CellKind::Plain);
        let container = Self {
            inner: Rc::new(ContainerInner {
                root: root.clone(),
                focused: Observable::new(None),
                changing_focus: StdCell::new(false),
                popups: RefCell::new(Vec::new()),
                in_command: StdCell::new(false),
                clipboard: RefCell::new(None),
                last_seen_text: RefCell::new(None),
                peer: RefCell::new(Rc::new(NullPeer::new())),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: StdCell::new(1),
                mouse: RefCell::new(MouseState::default()),
                config,
            }),
        };
        root.attach(&container);
        container
    }

    pub(crate) fn inner(&self) -> &ContainerInner {
        &self.inner
    }

    pub(crate) fn downgrade(&self) -> Weak<ContainerInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_weak(weak: &Weak<ContainerInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// The root cell. Always attached, never replaced.
    #[must_use]
    pub fn root(&self) -> Cell {
        self.inner.root.clone()
    }

    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    // -----------------------------------------------------------------------
    // Peer
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn peer(&self) -> Rc<dyn CellContainerPeer> {
        Rc::clone(&self.inner.peer.borrow())
    }

    pub fn set_peer(&self, peer: impl CellContainerPeer + 'static) {
        self.set_peer_rc(Rc::new(peer));
    }

    pub fn set_peer_rc(&self, peer: Rc<dyn CellContainerPeer>) {
        *self.inner.peer.borrow_mut() = peer;
    }

    #[must_use]
    pub fn visible_rect(&self) -> Rect {
        self.peer().visible_rect()
    }

    /// Ask the host to focus the container itself.
    pub fn request_host_focus(&self) {
        self.peer().request_focus();
    }

    /// Whether the host has given keyboard focus to the container.
    #[must_use]
    pub fn host_focused(&self) -> Observable<bool> {
        self.peer().focused()
    }

    // -----------------------------------------------------------------------
    // Listeners and commands
    // -----------------------------------------------------------------------

    pub fn add_listener(&self, listener: impl CellContainerListener + 'static) -> Registration {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        let weak = self.downgrade();
        Registration::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(entry, _)| *entry != id);
            }
        })
    }

    pub(crate) fn each_listener(&self, f: impl Fn(&dyn CellContainerListener)) {
        let listeners: Vec<_> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in &listeners {
            f(listener.as_ref());
        }
    }

    pub(crate) fn fire_cell_property_changed(&self, cell: &Cell, change: &PropertyChange) {
        self.each_listener(|l| l.on_cell_property_changed(cell, change));
    }

    /// True while an outermost command is running.
    #[must_use]
    pub fn in_command(&self) -> bool {
        self.inner.in_command.get()
    }

    /// Run `f` as one logical command.
    ///
    /// The outermost call notifies listeners before and after `f` (the
    /// after hook also runs if `f` panics). Nested calls just run `f`.
    pub fn execute_command<R>(&self, f: impl FnOnce() -> R) -> R {
        if self.inner.in_command.get() {
            return f();
        }
        self.inner.in_command.set(true);
        let span = debug_span!("cellkit.command");
        let _enter = span.enter();
        let _guard = CommandGuard { container: self };
        debug!("command started");
        self.each_listener(|l| l.on_before_command());
        f()
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn focused_cell(&self) -> Option<Cell> {
        self.inner.focused.get()
    }

    /// Subscribe to focused-cell changes with `(old, new)`.
    pub fn on_focus_changed(
        &self,
        callback: impl Fn(&Option<Cell>, &Option<Cell>) + 'static,
    ) -> Subscription {
        self.inner.focused.subscribe(callback)
    }

    pub(crate) fn is_changing_focus(&self) -> bool {
        self.inner.changing_focus.get()
    }

    /// Move focus to `cell`, or clear it with `None`.
    ///
    /// The target must be focusable, visible and attached to this
    /// container. Calling this from inside a focus change (a `FOCUSED`
    /// listener, a focus event handler) fails with
    /// [`CellError::ReentrantFocusChange`].
    pub fn set_focused_cell(&self, cell: Option<Cell>) -> Result<()> {
        if self.inner.changing_focus.get() {
            return Err(CellError::ReentrantFocusChange);
        }
        if let Some(cell) = &cell {
            cell.check_focusable()?;
            if cell.container().as_ref() != Some(self) {
                return Err(CellError::ForeignContainer {
                    cell: cell.to_string(),
                });
            }
        }
        let old = self.focused_cell();
        if old == cell {
            return Ok(());
        }

        let _guard = FlagGuard::raise(&self.inner.changing_focus);
        debug!(
            from = ?old.as_ref().map(ToString::to_string),
            to = ?cell.as_ref().map(ToString::to_string),
            "focus change"
        );
        if let Some(old) = &old {
            old.set(&FOCUSED, false);
            old.dispatch(&mut FocusEvent::new(), &FOCUS_LOST);
        }
        self.inner.focused.set(cell.clone());
        if let Some(new) = &cell {
            new.set(&FOCUSED, true);
            new.dispatch(&mut FocusEvent::new(), &FOCUS_GAINED);
        }
        Ok(())
    }

    /// Clear focus if the focused cell lies in `subtree`.
    pub(crate) fn clear_focus_within(&self, subtree: &Cell) -> Result<()> {
        match self.focused_cell() {
            Some(focused) if focused.is_descendant_of(subtree) => self.set_focused_cell(None),
            _ => Ok(()),
        }
    }

    /// Drop pointer state that refers to a detached cell.
    pub(crate) fn forget_cell(&self, cell: &Cell) {
        let mut mouse = self.inner.mouse.borrow_mut();
        if mouse.under_mouse.as_ref() == Some(cell) {
            mouse.under_mouse = None;
        }
        if mouse.drag_start.as_ref() == Some(cell) {
            mouse.drag_start = None;
        }
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    /// Route a key press: shortcuts first, then the focused cell.
    pub fn key_pressed(&self, event: &mut KeyEvent) {
        self.execute_command(|| {
            if self.handle_shortcut(event) {
                return;
            }
            self.dispatch_to_focused(event, &KEY_PRESSED);
        });
    }

    pub fn key_released(&self, event: &mut KeyEvent) {
        self.execute_command(|| self.dispatch_to_focused(event, &KEY_RELEASED));
    }

    pub fn key_typed(&self, event: &mut KeyEvent) {
        self.execute_command(|| self.dispatch_to_focused(event, &KEY_TYPED));
    }

    /// Consume `event` if it is a shortcut the container handles.
    ///
    /// Completion only consumes the key when some cell took the request.
    fn handle_shortcut(&self, event: &mut KeyEvent) -> bool {
        let Some(action) = self.inner.config.shortcuts.action_for(event) else {
            return false;
        };
        trace!(?action, "shortcut");
        match action {
            ShortcutAction::Copy => {
                self.copy();
            }
            ShortcutAction::Cut => {
                self.cut();
            }
            ShortcutAction::Paste => {
                let cached = self.inner.clipboard.borrow().clone();
                if let Some(content) = cached {
                    self.paste(content);
                }
            }
            ShortcutAction::Complete => {
                if !self.complete() {
                    return false;
                }
            }
        }
        event.consume();
        true
    }

    fn dispatch_to_focused<E: Consumable>(&self, event: &mut E, spec: &'static CellEventSpec<E>) {
        match self.focused_cell() {
            Some(focused) => focused.dispatch(event, spec),
            None => trace!(event = spec.name(), "no focused cell; event dropped"),
        }
    }

    // -----------------------------------------------------------------------
    // Clipboard and completion
    // -----------------------------------------------------------------------

    /// Ask the focused cell for a copy. Returns whether it produced one.
    pub fn copy(&self) -> bool {
        self.copy_or_cut(&COPY, false)
    }

    /// Ask the focused cell for a cut. Returns whether it produced one.
    pub fn cut(&self) -> bool {
        self.copy_or_cut(&CUT, true)
    }

    fn copy_or_cut(&self, spec: &'static CellEventSpec<CopyCutEvent>, cut: bool) -> bool {
        self.execute_command(|| {
            let mut event = CopyCutEvent::new(cut);
            self.dispatch_to_focused(&mut event, spec);
            if !event.is_consumed() {
                return false;
            }
            if let Some(content) = event.result() {
                *self.inner.last_seen_text.borrow_mut() = content.text();
                *self.inner.clipboard.borrow_mut() = Some(content);
            }
            true
        })
    }

    /// Payload of the last successful copy or cut.
    #[must_use]
    pub fn clipboard_content(&self) -> Option<Rc<dyn ClipboardContent>> {
        self.inner.clipboard.borrow().clone()
    }

    /// Text form of the last copied payload, for mirroring to the host
    /// clipboard.
    #[must_use]
    pub fn last_seen_text(&self) -> Option<String> {
        self.inner.last_seen_text.borrow().clone()
    }

    /// Paste `content` into the focused cell. Returns whether it was taken.
    pub fn paste(&self, content: Rc<dyn ClipboardContent>) -> bool {
        self.execute_command(|| {
            let mut event = PasteEvent::new(content);
            self.dispatch_to_focused(&mut event, &PASTE);
            event.is_consumed()
        })
    }

    /// Paste text arriving from the host clipboard.
    ///
    /// If `text` is what this container last put on the clipboard, the
    /// cached structured payload is pasted instead of plain text.
    pub fn paste_text(&self, text: &str) -> bool {
        let cached = {
            let last_seen = self.inner.last_seen_text.borrow();
            if last_seen.as_deref() == Some(text) {
                self.inner.clipboard.borrow().clone()
            } else {
                None
            }
        };
        let content = cached.unwrap_or_else(|| Rc::new(TextContent::new(text)));
        self.paste(content)
    }

    /// Ask the focused cell to complete. Returns whether it did.
    pub fn complete(&self) -> bool {
        self.execute_command(|| {
            let mut event = CompletionEvent::new(true);
            self.dispatch_to_focused(&mut event, &COMPLETE);
            event.is_consumed()
        })
    }

    // -----------------------------------------------------------------------
    // Mouse
    // -----------------------------------------------------------------------

    /// Deepest cell under `point`, checking popups (newest first) before
    /// the root.
    #[must_use]
    pub fn find_cell(&self, point: Point) -> Option<Cell> {
        let peer = self.peer();
        let popups = self.popups();
        popups
            .iter()
            .rev()
            .filter(|popup| popup.is_effectively_visible())
            .find_map(|popup| peer.find_cell(popup, point))
            .or_else(|| peer.find_cell(&self.inner.root, point))
    }

    /// The cell the pointer is currently over.
    #[must_use]
    pub fn cell_under_mouse(&self) -> Option<Cell> {
        self.inner.mouse.borrow().under_mouse.clone()
    }

    pub fn mouse_pressed(&self, event: &mut MouseEvent) {
        self.execute_command(|| {
            let target = self.find_cell(event.location);
            self.update_hover(target.clone(), event);
            self.inner.mouse.borrow_mut().drag_start = target.clone();
            if let Some(target) = target {
                target.dispatch(event, &MOUSE_PRESSED);
            }
        });
    }

    pub fn mouse_moved(&self, event: &mut MouseEvent) {
        self.execute_command(|| {
            let target = self.find_cell(event.location);
            self.update_hover(target.clone(), event);
            if let Some(target) = target {
                target.dispatch(event, &MOUSE_MOVED);
            }
        });
    }

    /// Drags go to the cell the press landed on while it stays attached.
    pub fn mouse_dragged(&self, event: &mut MouseEvent) {
        self.execute_command(|| {
            let hit = self.find_cell(event.location);
            self.update_hover(hit.clone(), event);
            if let Some(target) = self.drag_target().or(hit) {
                target.dispatch(event, &MOUSE_DRAGGED);
            }
        });
    }

    pub fn mouse_released(&self, event: &mut MouseEvent) {
        self.execute_command(|| {
            let hit = self.find_cell(event.location);
            let target = self.drag_target().or_else(|| hit.clone());
            self.inner.mouse.borrow_mut().drag_start = None;
            self.update_hover(hit, event);
            if let Some(target) = target {
                target.dispatch(event, &MOUSE_RELEASED);
            }
        });
    }

    /// The pointer left the container.
    pub fn mouse_left(&self, event: &mut MouseEvent) {
        self.execute_command(|| self.update_hover(None, event));
    }

    fn drag_target(&self) -> Option<Cell> {
        self.inner
            .mouse
            .borrow()
            .drag_start
            .clone()
            .filter(Cell::is_attached)
    }

    /// Send `MOUSE_LEFT` to the old hover cell and `MOUSE_ENTERED` to the
    /// new one when they differ.
    fn update_hover(&self, target: Option<Cell>, event: &MouseEvent) {
        let old = {
            let mut mouse = self.inner.mouse.borrow_mut();
            if mouse.under_mouse == target {
                return;
            }
            std::mem::replace(&mut mouse.under_mouse, target.clone())
        };
        if let Some(old) = old.filter(Cell::is_attached) {
            old.dispatch(&mut event.fresh(), &MOUSE_LEFT);
        }
        if let Some(new) = target {
            new.dispatch(&mut event.fresh(), &MOUSE_ENTERED);
        }
    }
}

impl PartialEq for CellContainer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for CellContainer {}

impl fmt::Debug for CellContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellContainer")
            .field("root", &self.inner.root)
            .field("focused", &self.focused_cell())
            .field("popups", &self.inner.popups.borrow().len())
            .field("in_command", &self.inner.in_command.get())
            .finish()
    }
}
