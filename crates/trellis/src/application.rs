//! The application context and frame loop.
//!
//! [`Application`] owns everything one run needs: the backend and its
//! surface, the [`WidgetTree`], the [`EventDispatcher`] and the
//! [`ModalStack`]. There is no global instance; code that needs the
//! context is handed `&mut Application`.
//!
//! One frame is: poll input, dispatch each event to the current input root,
//! apply requests raised by handlers, close finished modal scopes, arrange,
//! paint and present. [`Application::tick`] runs exactly one frame and
//! [`Application::run`] repeats it at the configured interval.
//!
//! Modal scopes never re-enter the loop. [`Application::exec_modal`] pushes
//! a scope and keeps ticking the same loop until the scope's handle
//! finishes; a dialog that opens another dialog only pushes another scope.
//!
//! ```
//! use trellis::{AppConfig, Application};
//! use trellis::render::{HeadlessBackend, RawEvent};
//!
//! let mut app = Application::new(AppConfig::new().with_tick_ms(0), HeadlessBackend::new()).unwrap();
//! app.backend().injector().push(RawEvent::Quit);
//! app.run().unwrap();
//! assert!(app.is_quitting());
//! ```

use std::time::Instant;

use trellis_core::ObjectId;
use trellis_core::logging::{PerfSpan, span_names};
use trellis_render::{
    Backend, Color, HeadlessBackend, Painter, Point, RawEvent, Rect, Size, SurfaceId,
    capture_or_none,
};

use crate::config::{AppConfig, HandlerErrorPolicy, LayoutDefaults};
use crate::error::{HandlerError, TrellisError, TrellisResult};
use crate::widget::{
    AppRequest, DialogCode, EventDispatcher, FocusManager, FocusReason, LayoutKind, ModalHandle,
    ModalScope, ModalStack, Widget, WidgetTree,
};

/// The explicit context of one UI run.
pub struct Application<B: Backend> {
    config: AppConfig,
    backend: B,
    surface: SurfaceId,
    window_size: Size,
    background: Color,
    tree: WidgetTree,
    dispatcher: EventDispatcher,
    modals: ModalStack,
    root: Option<ObjectId>,
    quitting: bool,
    frames: u64,
}

impl Application<HeadlessBackend> {
    /// An application drawing into a [`HeadlessBackend`].
    pub fn headless(config: AppConfig) -> TrellisResult<Self> {
        Self::new(config, HeadlessBackend::new())
    }
}

impl<B: Backend> Application<B> {
    /// Create the surface described by `config` on `backend`.
    pub fn new(config: AppConfig, mut backend: B) -> TrellisResult<Self> {
        let background = config.background()?;
        let surface = backend.create_surface(config.width, config.height)?;
        tracing::info!(
            target: "trellis::app",
            title = %config.title,
            width = config.width,
            height = config.height,
            "application created"
        );
        Ok(Self {
            window_size: Size::from((config.width, config.height)),
            dispatcher: EventDispatcher::new(config.drag_threshold),
            config,
            backend,
            surface,
            background,
            tree: WidgetTree::new(),
            modals: ModalStack::new(),
            root: None,
            quitting: false,
            frames: 0,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Spacing and margin defaults to pass to a layout's `with_defaults`.
    pub fn layout_defaults(&self) -> &LayoutDefaults {
        &self.config.layout
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn window_size(&self) -> Size {
        self.window_size
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn modals(&self) -> &ModalStack {
        &self.modals
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    /// Make `id` the window's root widget, sized to the window.
    pub fn set_root(&mut self, id: ObjectId) -> TrellisResult<()> {
        let window = self.window_rect();
        self.base_mut(id)?.set_geometry(window);
        self.root = Some(id);
        Ok(())
    }

    /// Insert a widget into the tree.
    pub fn add<W: Widget>(&mut self, widget: W) -> ObjectId {
        self.tree.insert(widget)
    }

    /// Insert a widget as the last child of `parent`.
    pub fn add_child<W: Widget>(&mut self, parent: ObjectId, widget: W) -> TrellisResult<ObjectId> {
        self.tree.insert_child(parent, widget)
    }

    // =========================================================================
    // Tree operations
    // =========================================================================

    pub fn show(&mut self, id: ObjectId) -> TrellisResult<()> {
        self.set_visible(id, true)
    }

    pub fn hide(&mut self, id: ObjectId) -> TrellisResult<()> {
        self.set_visible(id, false)
    }

    /// Show or hide `id`. Hiding the focused widget or one of its ancestors
    /// clears focus.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> TrellisResult<()> {
        self.tree.set_visible(id, visible)?;
        let validated = self.dispatcher.validate_focus(&mut self.tree);
        self.apply_policy(validated)
    }

    pub fn is_visible(&self, id: ObjectId) -> bool {
        self.tree.is_visible(id)
    }

    /// Resize `id`, making the size its natural size for layouts.
    pub fn resize(&mut self, id: ObjectId, width: f32, height: f32) -> TrellisResult<()> {
        self.base_mut(id)?.resize(width, height);
        Ok(())
    }

    /// Move `id` within its parent.
    pub fn move_to(&mut self, id: ObjectId, x: f32, y: f32) -> TrellisResult<()> {
        self.base_mut(id)?.move_to(x, y);
        Ok(())
    }

    pub fn set_geometry(&mut self, id: ObjectId, rect: Rect) -> TrellisResult<()> {
        self.base_mut(id)?.set_geometry(rect);
        Ok(())
    }

    pub fn set_layout(&mut self, host: ObjectId, layout: impl Into<LayoutKind>) -> TrellisResult<()> {
        self.tree.set_layout(host, layout)
    }

    /// Reparent `id`. `None` makes it a top-level widget.
    pub fn set_parent(&mut self, id: ObjectId, parent: Option<ObjectId>) -> TrellisResult<()> {
        self.tree.set_parent(id, parent)?;
        let validated = self.dispatcher.validate_focus(&mut self.tree);
        self.apply_policy(validated)
    }

    /// Destroy `id` and its subtree.
    ///
    /// Dispatcher state pointing into the subtree is dropped without
    /// events, and modal scopes rooted in it are rejected.
    pub fn destroy(&mut self, id: ObjectId) -> TrellisResult<Vec<ObjectId>> {
        let removed = self.tree.destroy(id)?;
        self.dispatcher.forget(&removed);
        for &node in &removed {
            self.modals.forget(node);
        }
        if self.root.is_some_and(|root| removed.contains(&root)) {
            self.root = None;
        }
        self.close_finished_scopes()?;
        Ok(removed)
    }

    /// Give keyboard focus to `id`.
    pub fn set_focus(&mut self, id: ObjectId) -> TrellisResult<bool> {
        if !self.tree.contains(id) {
            return Err(TrellisError::WidgetNotFound(id));
        }
        let focused = self.dispatcher.set_focus(&mut self.tree, id, FocusReason::Other);
        match focused {
            Ok(focused) => Ok(focused),
            Err(err) => self.apply_policy(Err::<(), _>(err)).map(|_| false),
        }
    }

    // =========================================================================
    // Loop control
    // =========================================================================

    /// Stop the loop and reject every open modal scope.
    pub fn quit(&mut self) {
        if !self.quitting {
            tracing::info!(target: "trellis::app", frames = self.frames, "quit requested");
        }
        self.quitting = true;
        self.modals.cancel_all();
    }

    /// Run exactly one frame.
    pub fn tick(&mut self) -> TrellisResult<()> {
        let _perf = PerfSpan::new(span_names::FRAME);
        for event in self.backend.poll_events() {
            self.handle_event(&event)?;
        }
        self.close_finished_scopes()?;
        self.render()?;
        self.backend.set_cursor(self.dispatcher.cursor(&self.tree));
        self.frames += 1;
        Ok(())
    }

    /// Run frames until quit is requested or `max_frames` is reached.
    #[tracing::instrument(skip(self), target = "trellis::app", level = "debug")]
    pub fn run(&mut self) -> TrellisResult<()> {
        tracing::info!(target: "trellis::app", "starting frame loop");
        self.drive(|app| app.quitting)?;
        tracing::info!(target: "trellis::app", frames = self.frames, "frame loop stopped");
        Ok(())
    }

    /// Open a modal scope on `root` without waiting for it.
    ///
    /// Input goes only to `root`'s subtree until the returned handle
    /// finishes.
    pub fn open_modal(&mut self, root: ObjectId) -> TrellisResult<ModalHandle> {
        let handle = ModalHandle::new();
        self.open_scope(root, handle.clone())?;
        Ok(handle)
    }

    /// Open a modal scope on `root` and run frames until it finishes.
    ///
    /// Returns [`DialogCode::Rejected`] when the scope is cancelled by a
    /// quit or by running out of frames.
    pub fn exec_modal(&mut self, root: ObjectId) -> TrellisResult<DialogCode> {
        self.exec_modal_with_handle(root, ModalHandle::new())
    }

    /// Like [`exec_modal`](Self::exec_modal), finishing when `handle` does.
    ///
    /// The dialog keeps a clone of `handle` and accepts or rejects it.
    pub fn exec_modal_with_handle(
        &mut self,
        root: ObjectId,
        handle: ModalHandle,
    ) -> TrellisResult<DialogCode> {
        self.open_scope(root, handle.clone())?;
        self.drive(|_| !handle.is_running())?;
        self.close_finished_scopes()?;
        Ok(handle.code().unwrap_or(DialogCode::Rejected))
    }

    /// The one loop: tick until `done` holds, the app quits or the frame
    /// budget runs out.
    fn drive(&mut self, mut done: impl FnMut(&Self) -> bool) -> TrellisResult<()> {
        let interval = self.config.tick_interval();
        let depth = self.modals.depth();
        tracing::debug!(target: "trellis::app", depth, "driving frame loop");
        loop {
            if done(self) || self.quitting {
                return Ok(());
            }
            if self.config.max_frames.is_some_and(|max| self.frames >= max) {
                tracing::debug!(target: "trellis::app", frames = self.frames, "frame budget exhausted");
                self.modals.cancel_all();
                return self.close_finished_scopes();
            }
            let started = Instant::now();
            self.tick()?;
            if let Some(rest) = interval.checked_sub(started.elapsed())
                && !rest.is_zero()
            {
                std::thread::sleep(rest);
            }
        }
    }

    // =========================================================================
    // Frame steps
    // =========================================================================

    fn handle_event(&mut self, event: &RawEvent) -> TrellisResult<()> {
        match event {
            RawEvent::Quit => {
                self.quit();
                return Ok(());
            }
            RawEvent::Resize { width, height } => {
                self.resize_window(*width, *height);
                return Ok(());
            }
            _ => {}
        }
        let Some(root) = self.input_root() else {
            tracing::trace!(target: "trellis::dispatch", "no input root, event dropped");
            return Ok(());
        };
        let dispatched = self.dispatcher.dispatch(&mut self.tree, root, event);
        self.apply_policy(dispatched)?;
        self.apply_app_requests()?;
        self.close_finished_scopes()
    }

    /// The root receiving input: the innermost modal scope, else the window
    /// root.
    fn input_root(&self) -> Option<ObjectId> {
        self.modals.top().map(|scope| scope.root).or(self.root)
    }

    fn apply_app_requests(&mut self) -> TrellisResult<()> {
        loop {
            let requests = self.dispatcher.take_app_requests();
            if requests.is_empty() {
                return Ok(());
            }
            for request in requests {
                match request {
                    AppRequest::OpenModal { root, handle } => {
                        match self.open_scope(root, handle.clone()) {
                            Ok(()) => {}
                            Err(err @ TrellisError::Handler(_)) => return Err(err),
                            Err(err) => {
                                tracing::warn!(target: "trellis::modal", ?root, %err, "modal scope not opened");
                                handle.reject();
                            }
                        }
                    }
                    AppRequest::Quit => self.quit(),
                }
            }
        }
    }

    fn open_scope(&mut self, root: ObjectId, handle: ModalHandle) -> TrellisResult<()> {
        if !self.tree.contains(root) {
            return Err(TrellisError::WidgetNotFound(root));
        }
        let background = capture_or_none(&mut self.backend, self.surface);
        let focus_before = self.dispatcher.focused_widget();
        let reset = self.dispatcher.reset_pointer(&mut self.tree);
        self.apply_policy(reset)?;

        self.tree.set_visible(root, true)?;
        self.tree.raise(root)?;
        self.modals
            .push_with_handle(root, background, handle, focus_before);

        let first = FocusManager::tab_order(&self.tree, root).first().copied();
        let focused = match first {
            Some(id) => self
                .dispatcher
                .set_focus(&mut self.tree, id, FocusReason::Modal)
                .map(|_| ()),
            None => self.dispatcher.clear_focus(&mut self.tree, FocusReason::Modal),
        };
        self.apply_policy(focused)
    }

    fn close_finished_scopes(&mut self) -> TrellisResult<()> {
        for scope in self.modals.pop_finished() {
            let reset = self.dispatcher.reset_pointer(&mut self.tree);
            self.apply_policy(reset)?;
            if self.tree.contains(scope.root) {
                self.tree.set_visible(scope.root, false)?;
            }
            let validated = self.dispatcher.validate_focus(&mut self.tree);
            self.apply_policy(validated)?;
            if let Some(previous) = scope.focus_before
                && self.tree.is_effectively_visible(previous)
            {
                let restored =
                    self.dispatcher
                        .set_focus(&mut self.tree, previous, FocusReason::Modal);
                self.apply_policy(restored)?;
            }
        }
        Ok(())
    }

    fn resize_window(&mut self, width: u32, height: u32) {
        match self.backend.create_surface(width, height) {
            Ok(surface) => {
                self.surface = surface;
                self.window_size = Size::from((width, height));
                let window = self.window_rect();
                if let Some(root) = self.root
                    && let Some(widget) = self.tree.widget_mut(root)
                {
                    widget.widget_base_mut().set_geometry(window);
                }
                tracing::debug!(target: "trellis::app", width, height, "window resized");
            }
            Err(err) => {
                tracing::warn!(target: "trellis::app", width, height, %err, "surface resize failed");
            }
        }
    }

    fn render(&mut self) -> TrellisResult<()> {
        if let Some(root) = self.root {
            self.tree.arrange(root);
        }
        for scope in self.modals.scopes() {
            self.tree.arrange(scope.root);
        }
        // Layouts may have hidden the focused widget.
        let validated = self.dispatcher.validate_focus(&mut self.tree);
        self.apply_policy(validated)?;

        let window = self.window_rect();
        let painter = self.backend.begin_frame(self.surface, self.background)?;
        match self.modals.top() {
            Some(ModalScope {
                root,
                background: Some(image),
                ..
            }) => {
                painter.draw_image(*image, window);
                paint_subtree(&self.tree, *root, painter);
            }
            _ => {
                if let Some(root) = self.root {
                    self.tree.paint(root, painter);
                }
                for scope in self.modals.scopes() {
                    let inside_root = self
                        .root
                        .is_some_and(|root| self.tree.is_ancestor_of(root, scope.root));
                    if !inside_root {
                        paint_subtree(&self.tree, scope.root, painter);
                    }
                }
            }
        }
        self.backend.present(self.surface)?;
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Log or return a handler error according to the configured policy.
    fn apply_policy<T>(&self, result: Result<T, HandlerError>) -> TrellisResult<()> {
        match result {
            Ok(_) => Ok(()),
            Err(err) => match self.config.handler_errors {
                HandlerErrorPolicy::LogAndContinue => {
                    tracing::error!(target: "trellis::app", widget = ?err.widget, %err, "event handler failed");
                    Ok(())
                }
                HandlerErrorPolicy::Abort => Err(err.into()),
            },
        }
    }

    fn base_mut(&mut self, id: ObjectId) -> TrellisResult<&mut crate::widget::WidgetBase> {
        self.tree
            .widget_mut(id)
            .map(|w| w.widget_base_mut())
            .ok_or(TrellisError::WidgetNotFound(id))
    }

    fn window_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.window_size)
    }
}

/// Paint `root` at its window position.
fn paint_subtree(tree: &WidgetTree, root: ObjectId, painter: &mut dyn Painter) {
    let origin = tree
        .parent(root)
        .and_then(|parent| tree.absolute_origin(parent))
        .unwrap_or(Point::ZERO);
    painter.save();
    painter.translate(origin.x, origin.y);
    tree.paint(root, painter);
    painter.restore();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use trellis_render::{DrawCommand, KeyboardModifiers, MouseButton};

    use super::*;
    use crate::widget::{
        EventContext, EventResult, PaintContext, SizeHint, WidgetBase, WidgetEvent,
    };

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    struct Panel {
        base: WidgetBase,
        color: Color,
        presses: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Panel {
        fn new(color: Color) -> Self {
            Self {
                base: WidgetBase::new(),
                color,
                presses: Arc::new(AtomicUsize::new(0)),
                fail: false,
            }
        }
    }

    impl Widget for Panel {
        fn widget_base(&self) -> &WidgetBase {
            &self.base
        }

        fn widget_base_mut(&mut self) -> &mut WidgetBase {
            &mut self.base
        }

        fn size_hint(&self) -> SizeHint {
            SizeHint::from_dimensions(50.0, 50.0)
        }

        fn paint(&self, ctx: &mut PaintContext<'_>) {
            let rect = ctx.rect();
            ctx.painter().fill_rect(rect, self.color);
        }

        fn event(&mut self, _ctx: &mut EventContext<'_>, event: &mut WidgetEvent) -> EventResult {
            if let WidgetEvent::MousePress(_) = event {
                self.presses.fetch_add(1, Ordering::SeqCst);
                if self.fail {
                    return Err(HandlerError::new(Boom));
                }
                return Ok(true);
            }
            Ok(false)
        }
    }

    fn app() -> Application<HeadlessBackend> {
        let config = AppConfig::new().with_size(200, 100).with_tick_ms(0);
        Application::headless(config).unwrap()
    }

    fn click(x: f32, y: f32) -> Vec<RawEvent> {
        let pos = Point::new(x, y);
        vec![
            RawEvent::PointerDown {
                pos,
                button: MouseButton::Left,
                modifiers: KeyboardModifiers::NONE,
            },
            RawEvent::PointerUp {
                pos,
                button: MouseButton::Left,
                modifiers: KeyboardModifiers::NONE,
            },
        ]
    }

    #[test]
    fn test_tick_presents_one_frame() {
        let mut app = app();
        let root = app.add(Panel::new(Color::BLUE));
        app.set_root(root).unwrap();
        app.tick().unwrap();

        assert_eq!(app.frame_count(), 1);
        let frame = app.backend().last_frame().unwrap();
        assert_eq!(frame[0], DrawCommand::Clear(Color::WHITE));
        assert!(frame.iter().any(|c| matches!(
            c,
            DrawCommand::FillRect { rect, color } if *color == Color::BLUE && rect.width() == 200.0
        )));
    }

    #[test]
    fn test_invalid_clear_color() {
        let config = AppConfig {
            clear_color: "nope".to_string(),
            ..AppConfig::new()
        };
        assert!(matches!(
            Application::headless(config),
            Err(TrellisError::Config(_))
        ));
    }

    #[test]
    fn test_resize_event_resizes_root() {
        let mut app = app();
        let root = app.add(Panel::new(Color::BLUE));
        app.set_root(root).unwrap();
        app.backend()
            .injector()
            .push(RawEvent::Resize { width: 320, height: 240 });
        app.tick().unwrap();

        assert_eq!(app.window_size(), Size::new(320.0, 240.0));
        assert_eq!(
            app.tree().widget(root).unwrap().geometry(),
            Rect::new(0.0, 0.0, 320.0, 240.0)
        );
        assert_eq!(app.backend().surface_size(app.surface()), Some(Size::new(320.0, 240.0)));
    }

    #[test]
    fn test_run_stops_on_quit() {
        let mut app = app();
        app.backend().injector().push(RawEvent::Quit);
        app.run().unwrap();
        assert!(app.is_quitting());
        assert_eq!(app.frame_count(), 1);
    }

    #[test]
    fn test_run_respects_max_frames() {
        let config = AppConfig::new().with_tick_ms(0).with_max_frames(3);
        let mut app = Application::headless(config).unwrap();
        app.run().unwrap();
        assert_eq!(app.frame_count(), 3);
        assert!(!app.is_quitting());
    }

    #[test]
    fn test_modal_blocks_outside_input() {
        let mut app = app();
        let root = app.add(Panel::new(Color::GRAY));
        app.set_root(root).unwrap();
        let background = Panel::new(Color::BLUE);
        let background_presses = background.presses.clone();
        let button = app.add_child(root, background).unwrap();
        app.set_geometry(button, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();

        let dialog = app.add(Panel::new(Color::GRAY));
        app.set_geometry(dialog, Rect::new(150.0, 0.0, 50.0, 50.0)).unwrap();
        let handle = app.open_modal(dialog).unwrap();

        app.backend().injector().push_batch(click(10.0, 10.0));
        app.tick().unwrap();
        assert_eq!(background_presses.load(Ordering::SeqCst), 0);

        handle.accept();
        app.tick().unwrap();
        assert!(app.modals().is_empty());
        assert!(!app.is_visible(dialog));

        app.backend().injector().push_batch(click(10.0, 10.0));
        app.tick().unwrap();
        assert_eq!(background_presses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_error_policy() {
        let mut app = app();
        let mut panel = Panel::new(Color::BLUE);
        panel.fail = true;
        let root = app.add(panel);
        app.set_root(root).unwrap();

        app.backend().injector().push_batch(click(10.0, 10.0));
        app.tick().unwrap();
        assert_eq!(app.frame_count(), 1);

        let config = AppConfig::new()
            .with_tick_ms(0)
            .with_handler_errors(HandlerErrorPolicy::Abort);
        let mut app = Application::headless(config).unwrap();
        let mut panel = Panel::new(Color::BLUE);
        panel.fail = true;
        let root = app.add(panel);
        app.set_root(root).unwrap();
        app.backend().injector().push_batch(click(10.0, 10.0));
        match app.tick() {
            Err(TrellisError::Handler(err)) => assert_eq!(err.widget, Some(root)),
            other => panic!("expected handler error, got {other:?}"),
        }
    }

    #[test]
    fn test_destroy_forgets_root() {
        let mut app = app();
        let root = app.add(Panel::new(Color::BLUE));
        let child = app.add_child(root, Panel::new(Color::GRAY)).unwrap();
        app.set_root(root).unwrap();
        let removed = app.destroy(root).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(removed.contains(&child));
        assert_eq!(app.root(), None);
        app.tick().unwrap();
    }
}
