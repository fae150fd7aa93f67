//! Modal scopes, quitting and handler error policy.

mod common;

use std::sync::Arc;

use common::{EventLog, Recorder, app, click, step};
use parking_lot::Mutex;
use trellis::prelude::*;
use trellis::render::{DrawCommand, HeadlessBackend, ImageId, RawEvent};

fn background_images(app: &Application<HeadlessBackend>) -> Vec<ImageId> {
    app.backend()
        .last_frame()
        .unwrap_or_default()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Image { image, .. } => Some(*image),
            _ => None,
        })
        .collect()
}

#[test]
fn test_nested_scopes_restore_outer_background() {
    let log = EventLog::new();
    let mut app = app(200, 100);
    let root = app.add(Recorder::new("root", &log));
    app.set_root(root).unwrap();
    let outer = app.add(Recorder::new("outer", &log));
    let inner = app.add(Recorder::new("inner", &log));
    app.set_geometry(outer, Rect::new(20.0, 20.0, 60.0, 40.0)).unwrap();
    app.set_geometry(inner, Rect::new(100.0, 20.0, 60.0, 40.0)).unwrap();
    app.tick().unwrap();

    let outer_handle = app.open_modal(outer).unwrap();
    let outer_background = app.modals().top().and_then(|s| s.background).unwrap();
    app.tick().unwrap();
    assert_eq!(background_images(&app), vec![outer_background]);

    let inner_handle = app.open_modal(inner).unwrap();
    let inner_background = app.modals().top().and_then(|s| s.background).unwrap();
    assert_ne!(inner_background, outer_background);
    assert_eq!(app.modals().depth(), 2);
    app.tick().unwrap();
    assert_eq!(background_images(&app), vec![inner_background]);

    // Only the innermost scope takes input.
    step(&mut app, click(50.0, 40.0));
    assert!(!log.contains("outer:mouse_press"));
    assert!(!log.contains("root:mouse_press"));
    step(&mut app, click(120.0, 40.0));
    assert!(log.contains("inner:mouse_press"));

    inner_handle.accept();
    app.tick().unwrap();
    assert_eq!(app.modals().depth(), 1);
    assert_eq!(
        app.modals().top().and_then(|s| s.background),
        Some(outer_background)
    );
    assert_eq!(background_images(&app), vec![outer_background]);
    assert!(!app.is_visible(inner));
    assert!(outer_handle.is_running());

    step(&mut app, click(50.0, 40.0));
    assert!(log.contains("outer:mouse_press"));
}

#[test]
fn test_quit_cancels_every_scope() {
    let log = EventLog::new();
    let mut app = app(200, 100);
    let first = app.add(Recorder::new("first", &log));
    let second = app.add(Recorder::new("second", &log));
    let a = app.open_modal(first).unwrap();
    let b = app.open_modal(second).unwrap();

    step(&mut app, vec![RawEvent::Quit]);
    assert!(app.is_quitting());
    assert_eq!(a.code(), Some(DialogCode::Rejected));
    assert_eq!(b.code(), Some(DialogCode::Rejected));
    assert!(app.modals().is_empty());
}

#[test]
fn test_exec_modal_returns_dialog_code() {
    let log = EventLog::new();
    let mut app = app(200, 100);
    let handle = ModalHandle::new();
    let dialog = app.add(
        Recorder::new("dialog", &log).finishing(handle.clone(), DialogCode::Accepted),
    );
    app.set_geometry(dialog, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
    app.backend().injector().push_batch(click(10.0, 10.0));

    let code = app.exec_modal_with_handle(dialog, handle).unwrap();
    assert_eq!(code, DialogCode::Accepted);
    assert!(app.modals().is_empty());
    assert!(!app.is_visible(dialog));
    assert!(!app.is_quitting());
}

#[test]
fn test_exec_modal_rejected_by_quit() {
    let log = EventLog::new();
    let mut app = app(200, 100);
    let dialog = app.add(Recorder::new("dialog", &log));
    app.backend().injector().push(RawEvent::Quit);

    assert_eq!(app.exec_modal(dialog).unwrap(), DialogCode::Rejected);
    assert!(app.is_quitting());

    // The outer loop sees the quit too.
    app.run().unwrap();
}

#[test]
fn test_exec_modal_bounded_by_frame_budget() {
    let log = EventLog::new();
    let config = AppConfig::new().with_tick_ms(0).with_max_frames(3);
    let mut app = Application::headless(config).unwrap();
    let dialog = app.add(Recorder::new("dialog", &log));

    assert_eq!(app.exec_modal(dialog).unwrap(), DialogCode::Rejected);
    assert_eq!(app.frame_count(), 3);
    assert!(app.modals().is_empty());
}

#[test]
fn test_handler_opens_scope_without_reentering() {
    let log = EventLog::new();
    let handles = Arc::new(Mutex::new(Vec::new()));
    let mut app = app(200, 100);
    let inner = app.add(Recorder::new("inner", &log));
    let outer = app.add(Recorder::new("outer", &log).opening_modal(inner, handles.clone()));
    app.set_geometry(outer, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    app.set_geometry(inner, Rect::new(100.0, 0.0, 100.0, 100.0)).unwrap();

    let outer_handle = app.open_modal(outer).unwrap();
    step(&mut app, click(10.0, 10.0));
    assert_eq!(app.modals().depth(), 2);
    assert_eq!(app.modals().top().map(|s| s.root), Some(inner));

    let inner_handle = handles.lock().pop().unwrap();
    inner_handle.reject();
    app.tick().unwrap();
    assert_eq!(app.modals().depth(), 1);
    assert_eq!(app.modals().top().map(|s| s.root), Some(outer));
    assert!(outer_handle.is_running());
}

#[test]
fn test_modal_moves_focus_and_restores_it() {
    let log = EventLog::new();
    let mut app = app(200, 100);
    let root = app.add(Recorder::new("root", &log).passive());
    app.set_root(root).unwrap();
    let field = app.add_child(root, Recorder::new("field", &log).focusable()).unwrap();
    app.set_geometry(field, Rect::new(0.0, 0.0, 50.0, 20.0)).unwrap();
    let dialog = app.add(Recorder::new("dialog", &log).passive());
    let ok = app.add_child(dialog, Recorder::new("ok", &log).focusable()).unwrap();
    app.set_geometry(dialog, Rect::new(100.0, 0.0, 100.0, 100.0)).unwrap();
    app.set_geometry(ok, Rect::new(10.0, 10.0, 50.0, 20.0)).unwrap();

    app.set_focus(field).unwrap();
    let handle = app.open_modal(dialog).unwrap();
    assert_eq!(app.dispatcher().focused_widget(), Some(ok));

    handle.accept();
    app.tick().unwrap();
    assert_eq!(app.dispatcher().focused_widget(), Some(field));
}

#[test]
fn test_log_and_continue_keeps_dispatching() {
    let log = EventLog::new();
    let mut app = app(200, 100);
    let root = app.add(Recorder::new("root", &log));
    app.set_root(root).unwrap();
    let broken = app.add_child(root, Recorder::new("broken", &log).failing()).unwrap();
    let fine = app.add_child(root, Recorder::new("fine", &log)).unwrap();
    app.set_geometry(broken, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
    app.set_geometry(fine, Rect::new(100.0, 0.0, 50.0, 50.0)).unwrap();

    let mut events = click(10.0, 10.0);
    events.extend(click(110.0, 10.0));
    step(&mut app, events);
    assert!(log.contains("broken:mouse_press"));
    assert!(log.contains("fine:mouse_press"));
    assert_eq!(app.frame_count(), 1);
}

#[test]
fn test_abort_policy_surfaces_failing_widget() {
    let log = EventLog::new();
    let config = AppConfig::new()
        .with_size(200, 100)
        .with_tick_ms(0)
        .with_handler_errors(HandlerErrorPolicy::Abort);
    let mut app = Application::headless(config).unwrap();
    let root = app.add(Recorder::new("root", &log));
    app.set_root(root).unwrap();
    let broken = app.add_child(root, Recorder::new("broken", &log).failing()).unwrap();
    app.set_geometry(broken, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();

    app.backend().injector().push_batch(click(10.0, 10.0));
    match app.run() {
        Err(TrellisError::Handler(err)) => {
            assert_eq!(err.widget, Some(broken));
            assert_eq!(err.source.to_string(), "recorder failed");
        }
        other => panic!("expected a handler error, got {other:?}"),
    }
}

#[test]
fn test_config_file_drives_application() {
    let config = AppConfig::from_toml_str(
        r##"
        title = "Scripted"
        width = 320
        height = 240
        tick_ms = 0
        max_frames = 2
        clear_color = "#102030"
        "##,
    )
    .unwrap();
    let mut app = Application::headless(config).unwrap();
    app.run().unwrap();

    assert_eq!(app.frame_count(), 2);
    assert_eq!(app.window_size(), Size::new(320.0, 240.0));
    let frame = app.backend().last_frame().unwrap();
    assert_eq!(
        frame.first(),
        Some(&DrawCommand::Clear(Color::from_rgba8(0x10, 0x20, 0x30, 0xff)))
    );
}
