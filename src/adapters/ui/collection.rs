//! Collection view model: flow layout, scrolling, reusable cards.
//!
//! Stands in for a native collection widget. A rendering surface reads
//! `items()` and `visible_items()`; the owner feeds it through `CardDataSource`.

use crate::domain::SessionViewModel;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Horizontal,
    Vertical,
}

/// Where a target item ends up after `scroll_to_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPosition {
    LeadingEdge,
    Center,
    TrailingEdge,
}

/// Single-row (or single-column) flow layout with fixed item size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowLayout {
    pub item_size: Size,
    pub scroll_direction: ScrollDirection,
    pub minimum_interitem_spacing: f64,
}

impl FlowLayout {
    fn item_length(&self) -> f64 {
        match self.scroll_direction {
            ScrollDirection::Horizontal => self.item_size.width,
            ScrollDirection::Vertical => self.item_size.height,
        }
    }

    fn stride(&self) -> f64 {
        self.item_length() + self.minimum_interitem_spacing
    }

    pub fn frame_for_item(&self, index: usize) -> Rect {
        let start = index as f64 * self.stride();
        match self.scroll_direction {
            ScrollDirection::Horizontal => {
                Rect::new(start, 0.0, self.item_size.width, self.item_size.height)
            }
            ScrollDirection::Vertical => {
                Rect::new(0.0, start, self.item_size.width, self.item_size.height)
            }
        }
    }

    /// Length of all items along the scroll axis (no trailing gutter).
    pub fn content_length(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        count as f64 * self.stride() - self.minimum_interitem_spacing
    }

    /// First item whose trailing edge lies past `offset`.
    pub fn item_at_offset(&self, offset: f64, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let offset = offset.max(0.0);
        let mut index = (offset / self.stride()).floor() as usize;
        if offset >= index as f64 * self.stride() + self.item_length() {
            // Offset falls in the gutter after `index`.
            index += 1;
        }
        (index < count).then_some(index)
    }
}

/// Scroll offset along one axis, clamped to the scrollable range.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    offset: f64,
    viewport: f64,
    content_length: f64,
    /// The scroller exists (trackpad scrolling works) but is drawn with this alpha.
    pub scroller_alpha: f64,
}

impl ScrollState {
    pub fn new(viewport: f64) -> Self {
        Self {
            offset: 0.0,
            viewport,
            content_length: 0.0,
            scroller_alpha: 1.0,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    fn max_offset(&self) -> f64 {
        (self.content_length - self.viewport).max(0.0)
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.offset = offset.clamp(0.0, self.max_offset());
    }

    pub fn set_viewport(&mut self, viewport: f64) {
        self.viewport = viewport;
        self.scroll_to(self.offset);
    }

    pub fn set_content_length(&mut self, length: f64) {
        self.content_length = length;
        self.scroll_to(self.offset);
    }
}

pub type DoubleClickHandler = Rc<dyn Fn(&SessionViewModel)>;

/// One reusable rendering unit, bound to at most one view-model at a time.
#[derive(Clone, Default)]
pub struct SessionCard {
    identifier: Option<&'static str>,
    view_model: Option<SessionViewModel>,
    double_clicked: Option<DoubleClickHandler>,
}

impl SessionCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifier(&self) -> Option<&'static str> {
        self.identifier
    }

    pub fn view_model(&self) -> Option<&SessionViewModel> {
        self.view_model.as_ref()
    }

    pub fn set_view_model(&mut self, view_model: SessionViewModel) {
        self.view_model = Some(view_model);
    }

    pub fn set_double_clicked(&mut self, handler: DoubleClickHandler) {
        self.double_clicked = Some(handler);
    }

    /// Fire the double-click handler with the bound view-model. Returns false
    /// for blank cards.
    pub fn double_click(&self) -> bool {
        match (&self.view_model, &self.double_clicked) {
            (Some(vm), Some(handler)) => {
                handler(vm);
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for SessionCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCard")
            .field("identifier", &self.identifier)
            .field("view_model", &self.view_model)
            .field("has_double_click", &self.double_clicked.is_some())
            .finish()
    }
}

/// Capabilities a collection owner provides to the collection view.
pub trait CardDataSource {
    fn number_of_sections(&self) -> usize {
        1
    }

    fn item_count(&self, section: usize) -> usize;

    /// Build the card for `index`, normally via `view.make_item`.
    fn item_at(&self, view: &CollectionView, index: usize) -> SessionCard;

    /// Called when the user double-clicks a card.
    fn on_select(&self, view_model: &SessionViewModel);

    /// Filter a proposed highlight change. Default accepts everything.
    fn should_change_highlight(&self, indices: &BTreeSet<usize>) -> BTreeSet<usize> {
        indices.clone()
    }
}

pub type CardTemplate = fn() -> SessionCard;

pub struct CollectionView {
    layout: FlowLayout,
    scroll: ScrollState,
    templates: HashMap<&'static str, CardTemplate>,
    items: Vec<SessionCard>,
    highlighted: BTreeSet<usize>,
    reloads: usize,
}

impl CollectionView {
    pub fn new(layout: FlowLayout, viewport: f64) -> Self {
        Self {
            layout,
            scroll: ScrollState::new(viewport),
            templates: HashMap::new(),
            items: Vec::new(),
            highlighted: BTreeSet::new(),
            reloads: 0,
        }
    }

    pub fn layout(&self) -> &FlowLayout {
        &self.layout
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }

    pub fn register(&mut self, identifier: &'static str, template: CardTemplate) {
        self.templates.insert(identifier, template);
    }

    /// Instantiate the template registered under `identifier`.
    pub fn make_item(&self, identifier: &'static str) -> Option<SessionCard> {
        let template = self.templates.get(identifier)?;
        let mut card = template();
        card.identifier = Some(identifier);
        Some(card)
    }

    /// Drop every card and ask `source` for a fresh set.
    pub fn reload_data(&mut self, source: &dyn CardDataSource) {
        let count = if source.number_of_sections() == 0 {
            0
        } else {
            source.item_count(0)
        };
        let view: &CollectionView = self;
        let items: Vec<SessionCard> = (0..count).map(|i| source.item_at(view, i)).collect();
        self.items = items;
        self.highlighted.clear();
        self.scroll
            .set_content_length(self.layout.content_length(count));
        self.reloads += 1;
    }

    pub fn items(&self) -> &[SessionCard] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn reload_count(&self) -> usize {
        self.reloads
    }

    pub fn highlighted(&self) -> &BTreeSet<usize> {
        &self.highlighted
    }

    pub fn set_highlighted(&mut self, indices: BTreeSet<usize>) {
        self.highlighted = indices;
    }

    /// Scroll so `index` sits at `position`. Out-of-range indices are ignored.
    pub fn scroll_to_item(&mut self, index: usize, position: ScrollPosition) {
        if index >= self.items.len() {
            return;
        }
        let frame = self.layout.frame_for_item(index);
        let (start, length) = match self.layout.scroll_direction {
            ScrollDirection::Horizontal => (frame.x, frame.width),
            ScrollDirection::Vertical => (frame.y, frame.height),
        };
        let viewport = self.scroll.viewport();
        let target = match position {
            ScrollPosition::LeadingEdge => start,
            ScrollPosition::Center => start + length / 2.0 - viewport / 2.0,
            ScrollPosition::TrailingEdge => start + length - viewport,
        };
        self.scroll.scroll_to(target);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        let offset = self.scroll.offset() + delta;
        self.scroll.scroll_to(offset);
    }

    pub fn leading_visible_item(&self) -> Option<usize> {
        self.layout
            .item_at_offset(self.scroll.offset(), self.items.len())
    }

    /// Items intersecting the viewport.
    pub fn visible_items(&self) -> Range<usize> {
        let Some(first) = self.leading_visible_item() else {
            return 0..0;
        };
        let end = self.scroll.offset() + self.scroll.viewport();
        let mut last = first;
        while last < self.items.len() {
            let frame = self.layout.frame_for_item(last);
            let start = match self.layout.scroll_direction {
                ScrollDirection::Horizontal => frame.x,
                ScrollDirection::Vertical => frame.y,
            };
            if start >= end {
                break;
            }
            last += 1;
        }
        first..last
    }
}
