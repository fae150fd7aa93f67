//! End-to-end layout, hit-test and item graph scenarios on a headless
//! application.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{EventLog, Recorder, app, approx_eq, click, geometry, step};
use trellis::prelude::*;
use trellis::widget::WidgetTree;
use trellis::widget::layout::LayoutConstraint;

#[test]
fn test_fixed_fixed_stretch_column() {
    let log = EventLog::new();
    let mut app = app(200, 300);
    let root = app.add(Recorder::new("root", &log));
    let a = app.add(Recorder::new("a", &log).sized(100.0, 30.0));
    let b = app.add(Recorder::new("b", &log).sized(100.0, 30.0));
    let c = app.add(Recorder::new("c", &log).sized(100.0, 30.0));

    let mut column = BoxLayout::vertical();
    column.add_widget_with(a, LayoutConstraint::fixed()).unwrap();
    column.add_widget_with(b, LayoutConstraint::fixed()).unwrap();
    column.add_widget_with(c, LayoutConstraint::stretch(1)).unwrap();
    app.set_layout(root, column).unwrap();
    app.set_root(root).unwrap();
    app.tick().unwrap();

    assert_eq!(geometry(&app, a), Rect::new(0.0, 0.0, 200.0, 30.0));
    assert_eq!(geometry(&app, b), Rect::new(0.0, 30.0, 200.0, 30.0));
    assert_eq!(geometry(&app, c), Rect::new(0.0, 60.0, 200.0, 240.0));
    assert_eq!(app.tree().parent(c), Some(root));
}

#[test]
fn test_overlapping_siblings_click_goes_to_last_added() {
    let log = EventLog::new();
    let mut app = app(400, 300);
    let root = app.add(Recorder::new("root", &log));
    app.set_root(root).unwrap();
    let a = app.add_child(root, Recorder::new("A", &log)).unwrap();
    let b = app.add_child(root, Recorder::new("B", &log)).unwrap();
    for id in [a, b] {
        app.set_geometry(id, Rect::new(50.0, 50.0, 100.0, 100.0)).unwrap();
    }

    step(&mut app, click(75.0, 75.0));

    assert_eq!(log.count("B:mouse_press"), 1);
    assert_eq!(log.count("B:mouse_release"), 1);
    assert!(!log.contains("A:mouse_press"));
    assert!(!log.contains("root:mouse_press"));

    // Raising A makes it the topmost sibling.
    log.clear();
    app.tree_mut().raise(a).unwrap();
    step(&mut app, click(75.0, 75.0));
    assert!(log.contains("A:mouse_press"));
    assert!(!log.contains("B:mouse_press"));
}

#[test]
fn test_grid_auto_insert_fills_rows() {
    let log = EventLog::new();
    let mut app = app(300, 200);
    let root = app.add(Recorder::new("root", &log));
    let widgets: Vec<ObjectId> = (0..6)
        .map(|_| app.add(Recorder::new("cell", &log).sized(10.0, 10.0)))
        .collect();

    let mut grid = GridLayout::new();
    grid.set_column_count(3);
    let positions: Vec<(usize, usize)> = widgets
        .iter()
        .map(|&id| grid.add_widget(id).unwrap())
        .collect();
    assert_eq!(
        positions,
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
    );

    app.set_layout(root, grid).unwrap();
    app.set_root(root).unwrap();
    app.tick().unwrap();

    let first = geometry(&app, widgets[0]);
    let second = geometry(&app, widgets[1]);
    let fourth = geometry(&app, widgets[3]);
    assert!(second.left() > first.left());
    assert!(approx_eq(second.top(), first.top()));
    assert!(fourth.top() > first.top());
    assert!(approx_eq(fourth.left(), first.left()));
}

#[test]
fn test_graph_click_selects_topmost_item_once() {
    let mut view = GraphView::default();
    let changes = Arc::new(AtomicUsize::new(0));
    let counter = changes.clone();
    view.graph().selection_changed.connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let items: Vec<ItemId> = (0..3)
        .map(|z| {
            view.graph_mut().add_item_at(
                ShapeItem::rect(Rect::new(0.0, 0.0, 50.0, 50.0), Color::BLUE),
                Point::new(10.0, 10.0),
                z as f32,
            )
        })
        .collect();

    let mut app = app(200, 200);
    let id = app.add(view);
    app.set_root(id).unwrap();
    step(&mut app, click(30.0, 30.0));

    let graph = app.tree().widget_as::<GraphView>(id).unwrap().graph();
    assert_eq!(graph.selected_items(), vec![items[2]]);
    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert_eq!(app.dispatcher().focused_widget(), Some(id));
}

#[test]
fn test_graph_drag_moves_selected_item() {
    let mut view = GraphView::default();
    let item = view.graph_mut().add_item_at(
        ShapeItem::rect(Rect::new(0.0, 0.0, 40.0, 40.0), Color::BLUE),
        Point::new(20.0, 20.0),
        0.0,
    );
    view.graph_mut().set_flags(item, ItemFlags::ALL).unwrap();

    let mut app = app(200, 200);
    let id = app.add(view);
    app.set_root(id).unwrap();
    step(
        &mut app,
        vec![
            common::press(30.0, 30.0),
            common::drag_move(70.0, 40.0),
            common::release(70.0, 40.0),
        ],
    );

    let graph = app.tree().widget_as::<GraphView>(id).unwrap().graph();
    assert_eq!(graph.pos(item), Some(Point::new(60.0, 30.0)));
    assert!(graph.is_selected(item));
    assert!(!graph.is_moving());
}

fn row_of(tree: &mut WidgetTree, count: usize, width: f32) -> (ObjectId, Vec<ObjectId>) {
    let log = EventLog::new();
    let root = tree.insert(Recorder::new("root", &log));
    tree.widget_mut(root)
        .unwrap()
        .widget_base_mut()
        .set_geometry(Rect::new(0.0, 0.0, width, 40.0));
    let mut row = BoxLayout::horizontal();
    let mut ids = Vec::new();
    for _ in 0..count {
        let id = tree.insert(Recorder::new("item", &log).sized(0.0, 0.0));
        row.add_widget(id).unwrap();
        ids.push(id);
    }
    tree.set_layout(root, row).unwrap();
    (root, ids)
}

#[test]
fn test_stretch_items_fill_container_exactly() {
    for width in [0.0, 1.0, 7.0, 99.5, 333.0, 1000.0] {
        for count in 1..=5 {
            let mut tree = WidgetTree::new();
            let (root, ids) = row_of(&mut tree, count, width);
            tree.arrange(root);
            let total: f32 = ids
                .iter()
                .map(|&id| tree.widget(id).unwrap().geometry().width())
                .sum();
            assert!(
                (total - width).abs() <= 1.0,
                "{count} items in {width}: total {total}"
            );
        }
    }
}

#[test]
fn test_minimums_survive_a_small_container() {
    let log = EventLog::new();
    let mut tree = WidgetTree::new();
    let root = tree.insert(Recorder::new("root", &log));
    tree.widget_mut(root)
        .unwrap()
        .widget_base_mut()
        .set_geometry(Rect::new(0.0, 0.0, 100.0, 10.0));

    let mut row = BoxLayout::horizontal();
    let mut ids = Vec::new();
    for _ in 0..3 {
        let id = tree.insert(Recorder::new("item", &log).with_minimum(50.0, 20.0));
        row.add_widget(id).unwrap();
        ids.push(id);
    }
    tree.set_layout(root, row).unwrap();
    tree.arrange(root);

    for id in ids {
        let rect = tree.widget(id).unwrap().geometry();
        assert!(rect.width() >= 50.0, "{rect:?}");
        assert!(rect.height() >= 20.0, "{rect:?}");
    }
}

#[test]
fn test_arrange_is_idempotent() {
    let mut tree = WidgetTree::new();
    let (root, ids) = row_of(&mut tree, 4, 317.0);
    tree.arrange(root);
    let first: Vec<Rect> = ids.iter().map(|&id| tree.widget(id).unwrap().geometry()).collect();
    tree.arrange(root);
    let second: Vec<Rect> = ids.iter().map(|&id| tree.widget(id).unwrap().geometry()).collect();
    assert_eq!(first, second);
}

#[test]
fn test_children_paint_over_parent() {
    let log = EventLog::new();
    let red = Color::from_rgb(1.0, 0.0, 0.0);
    let mut app = app(100, 100);
    let root = app.add(Recorder::new("root", &log).colored(Color::BLUE));
    app.set_root(root).unwrap();
    let child = app.add_child(root, Recorder::new("child", &log).colored(red)).unwrap();
    app.set_geometry(child, Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
    app.tick().unwrap();

    let frame = app.backend().last_frame().unwrap();
    let position = |wanted: Color| {
        frame.iter().position(|c| {
            matches!(c, trellis::render::DrawCommand::FillRect { color, .. } if *color == wanted)
        })
    };
    let parent_at = position(Color::BLUE).unwrap();
    let child_at = position(red).unwrap();
    assert!(parent_at < child_at);
    assert!(frame.iter().any(|c| matches!(
        c,
        trellis::render::DrawCommand::FillRect { rect, .. } if *rect == Rect::new(10.0, 10.0, 20.0, 20.0)
    )));
}
