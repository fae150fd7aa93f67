//! A widget hosting an [`ItemGraph`].

use trellis_render::{Color, CursorShape, Key, MouseButton, Point};

use super::scene::ItemGraph;
use crate::widget::{
    EventContext, EventResult, PaintContext, SizeHint, Widget, WidgetBase, WidgetEvent,
};

/// Displays an item graph and forwards pointer gestures to it.
///
/// Graph coordinates map to view coordinates through a scroll offset:
/// the graph point at `scroll` is drawn at the view's top-left corner.
/// Ctrl+A selects every item and Escape clears the selection while the view
/// has focus.
pub struct GraphView {
    base: WidgetBase,
    graph: ItemGraph,
    scroll: Point,
    background: Color,
}

impl Default for GraphView {
    fn default() -> Self {
        Self::new(ItemGraph::new())
    }
}

impl GraphView {
    pub fn new(graph: ItemGraph) -> Self {
        let mut base = WidgetBase::new();
        base.set_focusable(true);
        Self {
            base,
            graph,
            scroll: Point::ZERO,
            background: Color::WHITE,
        }
    }

    pub fn graph(&self) -> &ItemGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ItemGraph {
        &mut self.graph
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Convert a view-local point to graph coordinates.
    pub fn map_to_graph(&self, local: Point) -> Point {
        local + self.scroll
    }
}

impl Widget for GraphView {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_hint(&self) -> SizeHint {
        let bounds = self.graph.bounding_rect();
        SizeHint::from_dimensions(bounds.right().max(0.0), bounds.bottom().max(0.0))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) {
        let rect = ctx.rect();
        let painter = ctx.painter();
        painter.fill_rect(rect, self.background);
        painter.save();
        painter.clip_rect(rect);
        painter.translate(-self.scroll.x, -self.scroll.y);
        self.graph.paint(painter);
        painter.restore();
    }

    fn event(&mut self, _ctx: &mut EventContext<'_>, event: &mut WidgetEvent) -> EventResult {
        match event {
            WidgetEvent::MousePress(e) if e.button == MouseButton::Left => {
                let point = self.map_to_graph(e.local_pos);
                self.graph.press(point, e.modifiers);
                Ok(true)
            }
            WidgetEvent::MouseMove(e) if self.graph.is_moving() => {
                let point = self.map_to_graph(e.local_pos);
                Ok(self.graph.drag_to(point))
            }
            WidgetEvent::MouseRelease(e) if e.button == MouseButton::Left => {
                self.graph.release();
                Ok(true)
            }
            WidgetEvent::Wheel(e) => {
                self.scroll = Point::new(self.scroll.x - e.delta.x, self.scroll.y - e.delta.y);
                Ok(true)
            }
            WidgetEvent::KeyPress(e) => match e.key {
                Key::Char('a') if e.modifiers.control => {
                    self.graph.select_all();
                    Ok(true)
                }
                Key::Escape => Ok(self.graph.clear_selection()),
                _ => Ok(false),
            },
            _ => Ok(false),
        }
    }

    fn cursor(&self) -> Option<CursorShape> {
        if self.graph.is_moving() {
            Some(CursorShape::Move)
        } else {
            self.base.cursor()
        }
    }
}

static_assertions::assert_impl_all!(GraphView: Send, Sync);

#[cfg(test)]
mod tests {
    use trellis_render::{KeyboardModifiers, Rect};

    use super::*;
    use crate::graph::ShapeItem;
    use crate::widget::{EventBase, KeyPressEvent, MousePressEvent};

    #[test]
    fn test_scroll_maps_points() {
        let mut view = GraphView::default();
        let id = view.graph_mut().add_item_at(
            ShapeItem::rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLUE),
            Point::new(100.0, 100.0),
            0.0,
        );
        view.set_scroll(Point::new(95.0, 95.0));
        assert_eq!(view.map_to_graph(Point::new(10.0, 10.0)), Point::new(105.0, 105.0));
        assert_eq!(view.graph().item_at(view.map_to_graph(Point::new(10.0, 10.0))), Some(id));
    }

    #[test]
    fn test_size_hint_covers_items() {
        let mut view = GraphView::default();
        view.graph_mut().add_item_at(
            ShapeItem::rect(Rect::new(0.0, 0.0, 30.0, 20.0), Color::BLUE),
            Point::new(50.0, 40.0),
            0.0,
        );
        assert_eq!(view.size_hint().preferred, trellis_render::Size::new(80.0, 60.0));
    }

    #[test]
    fn test_events_reach_graph() {
        let mut view = GraphView::default();
        let id = view.graph_mut().add_item(ShapeItem::rect(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Color::BLUE,
        ));

        let mut requests = Vec::new();
        let mut ctx = EventContext::new(view.base.object_id().unwrap_or_default(), &mut requests, 4.0);

        let mut press = WidgetEvent::MousePress(MousePressEvent::new(
            MouseButton::Left,
            Point::new(5.0, 5.0),
            KeyboardModifiers::NONE,
        ));
        assert!(view.event(&mut ctx, &mut press).unwrap());
        assert!(view.graph().is_selected(id));

        let mut escape = WidgetEvent::KeyPress(KeyPressEvent {
            base: EventBase::new(),
            key: Key::Escape,
            modifiers: KeyboardModifiers::NONE,
            text: None,
        });
        assert!(view.event(&mut ctx, &mut escape).unwrap());
        assert!(view.graph().selected_items().is_empty());
    }
}
