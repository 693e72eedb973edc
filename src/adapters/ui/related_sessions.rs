//! "Related sessions" strip: a titled, horizontally scrolling row of session cards.
//!
//! UI state is confined to the main thread (`Rc`/`RefCell`, not `Send`).
//! The owner assigns view-models and gets a single delegate callback on double-click.

use crate::adapters::ui::collection::{
    CardDataSource, CollectionView, FlowLayout, Rect, ScrollDirection, ScrollPosition,
    SessionCard, Size,
};
use crate::domain::SessionViewModel;
use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};
use tracing::debug;

/// Template identifier for session cards.
pub const SESSION_ITEM: &str = "sessionCell";

pub struct Metrics;

impl Metrics {
    pub const HEIGHT: f64 = 96.0;
    pub const ITEM_HEIGHT: f64 = 64.0;
    pub const ITEM_WIDTH: f64 = 360.0;
    pub const PADDING: f64 = 24.0;
    /// Initial width before the owner resizes the panel.
    pub const DEFAULT_WIDTH: f64 = 600.0;
}

/// Receives the user's card selection. Held weakly by the panel.
pub trait RelatedSessionsDelegate {
    fn did_select_session(&self, panel: &RelatedSessionsPanel, view_model: &SessionViewModel);
}

pub struct RelatedSessionsPanel {
    this: Weak<RelatedSessionsPanel>,
    sessions: RefCell<Vec<SessionViewModel>>,
    title: RefCell<String>,
    hidden: Cell<bool>,
    frame: Cell<Rect>,
    collection: RefCell<CollectionView>,
    delegate: RefCell<Option<Weak<dyn RelatedSessionsDelegate>>>,
}

impl RelatedSessionsPanel {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| {
            let layout = FlowLayout {
                item_size: Size::new(Metrics::ITEM_WIDTH, Metrics::ITEM_HEIGHT),
                scroll_direction: ScrollDirection::Horizontal,
                minimum_interitem_spacing: Metrics::PADDING,
            };
            let mut collection = CollectionView::new(layout, Metrics::DEFAULT_WIDTH);
            collection.scroll_mut().scroller_alpha = 0.0;
            collection.register(SESSION_ITEM, SessionCard::new);

            Self {
                this: this.clone(),
                sessions: RefCell::new(Vec::new()),
                title: RefCell::new(String::new()),
                hidden: Cell::new(false),
                frame: Cell::new(Rect::new(0.0, 0.0, Metrics::DEFAULT_WIDTH, Metrics::HEIGHT)),
                collection: RefCell::new(collection),
                delegate: RefCell::new(None),
            }
        })
    }

    /// Replace the displayed sessions, reload every card and hide the panel when empty.
    pub fn set_sessions(&self, sessions: Vec<SessionViewModel>) {
        let count = sessions.len();
        *self.sessions.borrow_mut() = sessions;
        self.collection.borrow_mut().reload_data(self);
        self.hidden.set(count == 0);
        debug!(count, "related sessions reloaded");
    }

    pub fn sessions(&self) -> Vec<SessionViewModel> {
        self.sessions.borrow().clone()
    }

    pub fn set_delegate(&self, delegate: Option<Weak<dyn RelatedSessionsDelegate>>) {
        *self.delegate.borrow_mut() = delegate;
    }

    pub fn set_title(&self, title: Option<&str>) {
        *self.title.borrow_mut() = title.unwrap_or_default().to_string();
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    pub fn frame(&self) -> Rect {
        self.frame.get()
    }

    /// Card row frame: full width, pinned to the bottom of the panel.
    pub fn scroll_frame(&self) -> Rect {
        Rect::new(0.0, 0.0, self.frame.get().width, Metrics::ITEM_HEIGHT)
    }

    /// Width follows the owner; height stays fixed.
    pub fn resize(&self, width: f64) {
        let mut frame = self.frame.get();
        frame.width = width;
        self.frame.set(frame);
        self.collection.borrow_mut().scroll_mut().set_viewport(width);
    }

    pub fn collection(&self) -> Ref<'_, CollectionView> {
        self.collection.borrow()
    }

    pub fn scroll_by(&self, delta: f64) {
        self.collection.borrow_mut().scroll_by(delta);
    }

    pub fn scroll_to_beginning(&self) {
        self.collection
            .borrow_mut()
            .scroll_to_item(0, ScrollPosition::LeadingEdge);
    }

    /// Route a double-click on card `index` to the card's handler.
    pub fn double_click_card(&self, index: usize) -> bool {
        let card = self.collection.borrow().items().get(index).cloned();
        card.is_some_and(|card| card.double_click())
    }

    /// Cards never show a highlight; selection happens by double-click only.
    pub fn highlight_cards(&self, indices: &BTreeSet<usize>) {
        let accepted = self.should_change_highlight(indices);
        self.collection.borrow_mut().set_highlighted(accepted);
    }
}

impl CardDataSource for RelatedSessionsPanel {
    fn item_count(&self, _section: usize) -> usize {
        self.sessions.borrow().len()
    }

    fn item_at(&self, view: &CollectionView, index: usize) -> SessionCard {
        let Some(mut card) = view.make_item(SESSION_ITEM) else {
            return SessionCard::new();
        };
        let Some(view_model) = self.sessions.borrow().get(index).cloned() else {
            return card;
        };
        card.set_view_model(view_model);

        let this = self.this.clone();
        card.set_double_clicked(Rc::new(move |vm: &SessionViewModel| {
            if let Some(panel) = this.upgrade() {
                panel.on_select(vm);
            }
        }));
        card
    }

    fn on_select(&self, view_model: &SessionViewModel) {
        let delegate = self.delegate.borrow().as_ref().and_then(Weak::upgrade);
        match delegate {
            Some(delegate) => delegate.did_select_session(self, view_model),
            None => debug!(session = %view_model.session_id, "no delegate for selection"),
        }
    }

    fn should_change_highlight(&self, _indices: &BTreeSet<usize>) -> BTreeSet<usize> {
        BTreeSet::new()
    }
}
