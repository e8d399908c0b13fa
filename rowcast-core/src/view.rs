//! The carousel view: owns all state and wires the components together.
//!
//! Everything here runs on the main thread. Background work (image fetches)
//! reports back through a channel drained by [`CarouselView::pump_completions`],
//! and animations advance in [`CarouselView::tick`]. Each pass applies
//! visibility, then loads, then eviction, in that order.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rowcast_model::ActionPayload;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::animator::{Channel, Easing, ScrollAnimator, SettleAction, TweenSpec};
use crate::cache::{CacheStats, EvictionContext, TextureCache};
use crate::content::ContentIndex;
use crate::diagnostics::{MetricsSnapshot, NavDiagnostics, NavEventKind, NavScenario};
use crate::events::{CarouselEvent, CarouselKey, KeyResponse};
use crate::frame::{Frame, FrameInputs, RenderNodeBuilder};
use crate::layout::CategoryLayoutModel;
use crate::lifecycle::{Lifecycle, LifecyclePhase};
use crate::loading::{
    FetchCompletion, ImageFetcher, ImageLoadCoordinator, LoadContext, LoadOutcome,
};
use crate::navigation::{
    self, Direction, NavGeometry, NavOutcome, NavPlan, NavigationEngine, Selection,
    VerticalTarget,
};
use crate::scroll::{ScrollState, Viewport};
use crate::settings::CarouselTuning;
use crate::surface::RenderSurface;
use crate::visibility::{VisibilityCalculator, VisibleSet};

/// External collaborators a view is built with.
#[derive(Debug, Clone)]
pub struct CarouselDeps {
    pub surface: Arc<dyn RenderSurface>,
    pub fetcher: Arc<dyn ImageFetcher>,
    /// Runtime fetch tasks are spawned on.
    pub runtime: Handle,
    pub diagnostics: Arc<NavDiagnostics>,
}

/// Counters for the embedding application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarouselStats {
    pub cache: CacheStats,
    pub pending_fetches: usize,
    pub visible_items: usize,
    pub animating: bool,
}

/// Categorized poster carousel.
#[derive(Debug)]
pub struct CarouselView {
    tuning: CarouselTuning,
    content: ContentIndex,
    layout: CategoryLayoutModel,
    scroll: ScrollState,
    viewport: Viewport,
    selection: Selection,
    visible: VisibleSet,
    prefetch: BTreeSet<usize>,
    calculator: VisibilityCalculator,
    navigation: NavigationEngine,
    animator: ScrollAnimator,
    cache: Arc<TextureCache>,
    loader: ImageLoadCoordinator,
    completions: mpsc::UnboundedReceiver<FetchCompletion>,
    frames: RenderNodeBuilder,
    surface: Arc<dyn RenderSurface>,
    diagnostics: Arc<NavDiagnostics>,
    lifecycle: Arc<Lifecycle>,
    events: mpsc::UnboundedSender<CarouselEvent>,
}

impl CarouselView {
    /// Create an empty view and the receiver its events are sent on.
    pub fn new(
        tuning: CarouselTuning,
        deps: CarouselDeps,
    ) -> (Self, mpsc::UnboundedReceiver<CarouselEvent>) {
        let tuning = tuning.sanitized();
        let lifecycle = Arc::new(Lifecycle::new());
        let cache = Arc::new(TextureCache::new(tuning.cleanup_threshold()));
        let (loader, completions) = ImageLoadCoordinator::new(
            Arc::clone(&cache),
            deps.fetcher,
            Arc::clone(&deps.surface),
            deps.runtime,
            Arc::clone(&lifecycle),
            tuning.fetch_timeout(),
            tuning.local_memo_capacity,
        );
        let (events, events_rx) = mpsc::unbounded_channel();

        let view = Self {
            calculator: VisibilityCalculator::new(tuning.horizontal_buffer_fraction),
            frames: RenderNodeBuilder::new(tuning.focus_scale),
            layout: CategoryLayoutModel::default().with_left_margin(tuning.left_margin),
            tuning,
            content: ContentIndex::default(),
            scroll: ScrollState::new(),
            viewport: Viewport::default(),
            selection: Selection::default(),
            visible: VisibleSet::default(),
            prefetch: BTreeSet::new(),
            navigation: NavigationEngine::new(),
            animator: ScrollAnimator::new(),
            cache,
            loader,
            completions,
            surface: deps.surface,
            diagnostics: deps.diagnostics,
            lifecycle,
            events,
        };
        (view, events_rx)
    }

    // ----- accessors -----

    pub fn tuning(&self) -> &CarouselTuning {
        &self.tuning
    }

    pub fn content(&self) -> &ContentIndex {
        &self.content
    }

    pub fn layout(&self) -> &CategoryLayoutModel {
        &self.layout
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    pub fn loader(&self) -> &ImageLoadCoordinator {
        &self.loader
    }

    pub fn current_index(&self) -> Option<usize> {
        self.selection.current()
    }

    pub fn current_category(&self) -> Option<&str> {
        self.selection.category(&self.content)
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    /// Indices loaded ahead of visibility.
    pub fn prefetched(&self) -> &BTreeSet<usize> {
        &self.prefetch
    }

    pub fn stats(&self) -> CarouselStats {
        CarouselStats {
            cache: self.cache.stats(),
            pending_fetches: self.loader.pending_count(),
            visible_items: self.visible.indices.len(),
            animating: self.animator.is_active(),
        }
    }

    // ----- content and geometry -----

    /// Replace content and layout. Scroll resets to the origin and focus
    /// moves to the first item of the first row.
    pub fn set_content(&mut self, content: ContentIndex, layout: CategoryLayoutModel) {
        if !self.lifecycle.is_live() {
            return;
        }
        self.release_state();
        self.content = content;
        self.layout = layout;

        log::debug!(
            "Loaded {} items in {} rows",
            self.content.len(),
            self.content.rows().len()
        );
        let _ = self.events.send(CarouselEvent::ContentChanged {
            rows: self.content.rows().to_vec(),
            item_count: self.content.len(),
        });

        if let Some(first) = self.content.first_index() {
            self.selection.set(first, &self.content);
            self.emit_selection(first);
        }
        self.refresh();
    }

    /// Resize the widget. Offsets are re-clamped to the new bounds.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if !self.lifecycle.is_live() {
            return;
        }
        self.viewport = Viewport::new(width.max(0.0), height.max(0.0));
        let max_v = self.max_vertical();
        let (content, layout, viewport) = (&self.content, &self.layout, self.viewport);
        self.scroll.reclamp(max_v, |category| {
            layout.max_horizontal_scroll(content, category, viewport.width)
        });
        self.refresh();
    }

    /// Recompute visibility, load what became visible and evict surplus.
    pub fn refresh(&mut self) {
        if !self.lifecycle.is_live() {
            return;
        }
        self.visible = self.calculator.compute(
            &self.content,
            &self.layout,
            &self.scroll,
            self.viewport,
            self.tuning.buffer_factor,
        );
        self.prune_prefetch();
        let wanted: Vec<usize> = self.visible.indices.iter().copied().collect();
        self.load_indices(&wanted);
        self.evict_if_needed();
    }

    // ----- input -----

    /// Route a remote-control key.
    pub fn handle_key(&mut self, key: CarouselKey) -> KeyResponse {
        if !self.lifecycle.is_live() {
            return KeyResponse::Ignored;
        }
        let direction = match key {
            CarouselKey::Left => Direction::Left,
            CarouselKey::Right => Direction::Right,
            CarouselKey::Up => Direction::Up,
            CarouselKey::Down => Direction::Down,
            CarouselKey::Confirm | CarouselKey::Info => {
                let action = key.action().unwrap_or_default();
                return if self.activate(action) {
                    KeyResponse::Handled
                } else {
                    KeyResponse::Ignored
                };
            }
        };
        match self.navigate(direction) {
            NavOutcome::Propagate => KeyResponse::Ignored,
            NavOutcome::Moved(_) | NavOutcome::Stay => KeyResponse::Handled,
        }
    }

    /// Emit an action event for the focused item.
    pub fn activate(&mut self, action: &str) -> bool {
        let Some(index) = self.selection.current() else {
            return false;
        };
        let Some(item) = self.content.item(index) else {
            return false;
        };
        self.diagnostics.begin_scenario(NavScenario::ItemSelected);
        self.diagnostics
            .log_event(NavEventKind::IndexChanged, Some(index));
        let payload = ActionPayload::for_item(action, item);
        log::debug!("Activated {action} on {:?}", payload.title);
        let _ = self.events.send(CarouselEvent::ActionActivated { index, payload });
        self.diagnostics.end_scenario();
        true
    }

    /// Move focus one step. See [`NavigationEngine::plan`] for the rules.
    pub fn navigate(&mut self, direction: Direction) -> NavOutcome {
        self.navigate_at(direction, Instant::now())
    }

    /// [`CarouselView::navigate`] with an explicit clock.
    pub fn navigate_at(&mut self, direction: Direction, now: Instant) -> NavOutcome {
        if !self.lifecycle.is_live() {
            return NavOutcome::Stay;
        }
        self.diagnostics.begin_scenario(match direction {
            Direction::Left => NavScenario::NavLeft,
            Direction::Right => NavScenario::NavRight,
            Direction::Up => NavScenario::NavUp,
            Direction::Down => NavScenario::NavDown,
        });
        self.diagnostics
            .log_event(NavEventKind::NavStart, self.selection.current());

        let outcome = self.navigation.plan(direction, &self.selection, &self.geometry());
        if let NavOutcome::Moved(plan) = &outcome {
            self.apply_plan(plan, now);
        }

        self.diagnostics
            .log_event(NavEventKind::NavEnd, self.selection.current());
        self.diagnostics.record_metrics(self.metrics());
        self.diagnostics.end_scenario();
        outcome
    }

    fn apply_plan(&mut self, plan: &NavPlan, now: Instant) {
        if self.selection.set(plan.target, &self.content) {
            self.diagnostics
                .log_param(NavEventKind::IndexChanged, Some(plan.target), "from", plan.from as f64);
            self.emit_selection(plan.target);
        }

        let duration = match plan.direction {
            Direction::Down => self.tuning.vertical_down_duration(),
            _ => self.tuning.scroll_duration(),
        };

        if let Some(target) = plan.vertical {
            self.diagnostics
                .log_position(Some(plan.target), plan.horizontal, target.offset);
        }
        self.scroll_to_focus(&plan.category, plan.horizontal, plan.vertical, duration, now);

        let position = self
            .content
            .position_in_category(plan.target)
            .unwrap_or_default();
        self.preload_rows(&plan.preload_rows, position);
        self.evict_if_needed();
    }

    /// Focus `index` programmatically and scroll it into view.
    pub fn set_current_index(&mut self, index: usize) -> bool {
        if !self.lifecycle.is_live() || self.content.item(index).is_none() {
            return false;
        }
        if !self.selection.set(index, &self.content) {
            return true;
        }
        self.emit_selection(index);

        let now = Instant::now();
        let (Some(category), Some(position)) = (
            self.content.category_of(index).map(str::to_string),
            self.content.position_in_category(index),
        ) else {
            return true;
        };
        let geo = self.geometry();
        let horizontal = navigation::horizontal_target(&geo, &category, position);
        let vertical = navigation::vertical_target(&geo, &category);
        let duration = self.tuning.scroll_duration();
        self.scroll_to_focus(&category, horizontal, Some(vertical), duration, now);
        true
    }

    /// Wheel/trackpad scrolling: `dy` moves the row stack, `dx` the focused
    /// row. Cancels any animation on the affected channel.
    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        if !self.lifecycle.is_live() {
            return;
        }
        if dy != 0.0 {
            self.animator.cancel(&Channel::Vertical);
            let max = self.max_vertical();
            self.scroll.set_vertical(self.scroll.vertical() + dy, max);
        }
        if dx != 0.0
            && let Some(category) = self.current_category().map(str::to_string)
        {
            self.animator
                .cancel(&Channel::Horizontal(category.clone()));
            let max = self.max_horizontal(&category);
            let next = self.scroll.horizontal(&category) + dx;
            self.scroll.set_horizontal(&category, next, max);
        }
        self.refresh();
    }

    // ----- time and background work -----

    /// Advance animations. Returns whether any offset changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.lifecycle.is_live() {
            return false;
        }
        let frames = self.animator.tick(now);
        if frames.is_empty() {
            return false;
        }

        let mut settles = Vec::new();
        for frame in frames {
            match &frame.channel {
                Channel::Vertical => {
                    let max = self.max_vertical();
                    self.scroll.set_vertical(frame.offset, max);
                }
                Channel::Horizontal(category) => {
                    let max = self.max_horizontal(category);
                    self.scroll.set_horizontal(category, frame.offset, max);
                }
            }
            if frame.finished {
                self.diagnostics
                    .log_event(NavEventKind::AnimComplete, self.selection.current());
            }
            if let Some(action) = frame.settle {
                settles.push(action);
            }
        }

        self.refresh();
        for action in settles {
            self.settle(action, now);
        }
        true
    }

    /// Apply finished fetches. Returns how many completions were drained.
    pub fn pump_completions(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(completion) = self.completions.try_recv() {
            drained += 1;
            let ctx = LoadContext {
                content: &self.content,
                layout: &self.layout,
                visible: &self.visible,
                prefetch: &self.prefetch,
            };
            let outcome = self.loader.handle_completion(completion, &ctx);
            log::trace!("Completion applied: {outcome:?}");
        }
        if drained > 0 {
            self.evict_if_needed();
        }
        drained
    }

    /// Wait for the next fetch completion and apply it. Returns `false`
    /// once the channel is closed.
    pub async fn next_completion(&mut self) -> bool {
        let Some(completion) = self.completions.recv().await else {
            return false;
        };
        let ctx = LoadContext {
            content: &self.content,
            layout: &self.layout,
            visible: &self.visible,
            prefetch: &self.prefetch,
        };
        self.loader.handle_completion(completion, &ctx);
        self.evict_if_needed();
        true
    }

    /// Compose this frame's nodes.
    pub fn build_frame(&mut self) -> Frame {
        if !self.lifecycle.is_live() {
            return Frame::default();
        }
        let started = Instant::now();
        let frame = self.frames.build(&FrameInputs {
            content: &self.content,
            layout: &self.layout,
            scroll: &self.scroll,
            viewport: self.viewport,
            visible: &self.visible,
            selection: &self.selection,
            cache: &self.cache,
            surface: self.surface.as_ref(),
        });
        let mut metrics = self.metrics();
        metrics.frame_time = started.elapsed();
        self.diagnostics.record_metrics(metrics);
        frame
    }

    // ----- teardown -----

    /// Stop everything and release all resources. Safe to call repeatedly;
    /// only the first call does anything.
    pub fn teardown(&mut self) {
        if !self.lifecycle.begin_teardown() {
            return;
        }
        log::debug!("Tearing down carousel");
        self.release_state();
        self.content = ContentIndex::default();
        self.loader.clear_local_memo();
        self.diagnostics.end_scenario();
        self.lifecycle.finish_teardown();
    }

    /// Cancel fetches, stop animations, hand nodes to the surface for
    /// deferred release, then clear view state. Shared by reload and
    /// teardown.
    fn release_state(&mut self) {
        let cancelled = self.loader.cancel_all();
        let stopped = self.animator.stop_all();
        if stopped > 0 {
            self.diagnostics
                .log_event(NavEventKind::AnimAborted, self.selection.current());
        }
        let nodes = self.cache.clear();
        let released = nodes.len();
        self.surface.schedule_release(nodes);
        while self.completions.try_recv().is_ok() {}

        self.visible = VisibleSet::default();
        self.prefetch.clear();
        self.selection.clear();
        self.scroll.reset();
        log::debug!(
            "Released carousel state: {cancelled} fetches, {stopped} animations, {released} nodes"
        );
    }

    // ----- internals -----

    fn geometry(&self) -> NavGeometry<'_> {
        NavGeometry {
            content: &self.content,
            layout: &self.layout,
            scroll: &self.scroll,
            viewport: self.viewport,
        }
    }

    fn max_vertical(&self) -> f32 {
        self.layout
            .max_vertical_scroll(&self.content, self.viewport.height)
    }

    fn max_horizontal(&self, category: &str) -> f32 {
        self.layout
            .max_horizontal_scroll(&self.content, category, self.viewport.width)
    }

    fn metrics(&self) -> MetricsSnapshot {
        let cache = self.cache.stats();
        MetricsSnapshot {
            node_count: cache.nodes,
            texture_count: cache.textures,
            pending_fetches: self.loader.pending_count(),
            frame_time: Duration::ZERO,
        }
    }

    fn emit_selection(&self, index: usize) {
        if let Some(item) = self.content.item(index) {
            let _ = self.events.send(CarouselEvent::SelectionChanged {
                index,
                payload: ActionPayload::for_item("", item),
            });
        }
    }

    /// Tween `category`'s row and, if given, the row stack towards a new
    /// focus. The settle action rides on the vertical tween when it runs,
    /// else on the horizontal one, else it runs now.
    fn scroll_to_focus(
        &mut self,
        category: &str,
        horizontal: f32,
        vertical: Option<VerticalTarget>,
        duration: Duration,
        now: Instant,
    ) {
        let settle = match vertical {
            Some(target) if target.last_row => SettleAction::LastRowCorrective,
            _ => SettleAction::EnsureFocusVisible,
        };
        let vertical_started = vertical.is_some_and(|target| {
            self.animate(
                Channel::Vertical,
                target.offset,
                duration,
                Easing::EaseOutCubic,
                Some(settle),
                now,
            )
        });
        let horizontal_started = self.animate(
            Channel::Horizontal(category.to_string()),
            horizontal,
            duration,
            Easing::EaseOutCubic,
            (!vertical_started).then_some(settle),
            now,
        );
        if !vertical_started && !horizontal_started {
            self.settle(settle, now);
        }
    }

    /// Start a tween unless the channel is already where it needs to be.
    fn animate(
        &mut self,
        channel: Channel,
        target: f32,
        duration: Duration,
        easing: Easing,
        settle: Option<SettleAction>,
        now: Instant,
    ) -> bool {
        let current = match &channel {
            Channel::Vertical => self.scroll.vertical(),
            Channel::Horizontal(category) => self.scroll.horizontal(category),
        };
        if (current - target).abs() < 0.5 {
            self.animator.cancel(&channel);
            return false;
        }
        self.diagnostics
            .log_param(NavEventKind::AnimStart, self.selection.current(), "target", f64::from(target));
        self.animator.start(
            channel,
            TweenSpec {
                from: current,
                to: target,
                duration,
                easing,
                settle,
            },
            now,
        );
        true
    }

    fn settle(&mut self, action: SettleAction, now: Instant) {
        if !self.lifecycle.is_live() {
            return;
        }
        self.load_around_focus();
        if action != SettleAction::LastRowCorrective {
            return;
        }
        let correction = navigation::last_row_correction(&self.geometry(), &self.selection);
        if let Some(target) = correction {
            let duration = self.tuning.corrective_duration();
            self.animate(
                Channel::Vertical,
                target,
                duration,
                Easing::EaseOutQuad,
                Some(SettleAction::EnsureFocusVisible),
                now,
            );
        }
    }

    /// Eager load with the wider buffer, then preload the focused row and
    /// its neighbors.
    fn load_around_focus(&mut self) {
        let eager = self.calculator.compute(
            &self.content,
            &self.layout,
            &self.scroll,
            self.viewport,
            self.tuning.eager_buffer_factor,
        );
        self.prefetch
            .extend(eager.indices.difference(&self.visible.indices).copied());
        let wanted: Vec<usize> = eager.indices.iter().copied().collect();
        self.load_indices(&wanted);

        if let Some(current) = self.selection.current()
            && let Some(category) = self.content.category_of(current)
        {
            let rows = navigation::neighbor_rows(&self.content, category);
            let position = self
                .content
                .position_in_category(current)
                .unwrap_or_default();
            self.preload_rows(&rows, position);
        }
        self.evict_if_needed();
    }

    /// Load `position ± preload_radius` in each of `rows`.
    fn preload_rows(&mut self, rows: &[String], position: usize) {
        let wanted = self.preload_window(rows, position);
        self.prefetch.extend(wanted.iter().copied());
        self.load_indices(&wanted);
    }

    fn preload_window(&self, rows: &[String], position: usize) -> Vec<usize> {
        let radius = self.tuning.preload_radius;
        let start = position.saturating_sub(radius);
        let mut window = Vec::new();
        for row in rows {
            window.extend(
                self.content
                    .items_in(row)
                    .iter()
                    .skip(start)
                    .take(radius * 2 + 1)
                    .copied(),
            );
        }
        window
    }

    /// Forget prefetched indices that are neither in the eager window nor
    /// near the focus. In-flight requests keep their entry.
    fn prune_prefetch(&mut self) {
        if self.prefetch.is_empty() {
            return;
        }
        let mut keep = self
            .calculator
            .compute(
                &self.content,
                &self.layout,
                &self.scroll,
                self.viewport,
                self.tuning.eager_buffer_factor,
            )
            .indices;
        if let Some(current) = self.selection.current()
            && let Some(category) = self.content.category_of(current)
        {
            let rows = navigation::neighbor_rows(&self.content, category);
            let position = self
                .content
                .position_in_category(current)
                .unwrap_or_default();
            keep.extend(self.preload_window(&rows, position));
        }
        let before = self.prefetch.len();
        let loader = &self.loader;
        self.prefetch
            .retain(|index| keep.contains(index) || loader.is_pending(*index));
        let pruned = before - self.prefetch.len();
        if pruned > 0 {
            log::trace!("Pruned {pruned} stale prefetch entries");
        }
    }

    fn load_indices(&self, indices: &[usize]) {
        let ctx = LoadContext {
            content: &self.content,
            layout: &self.layout,
            visible: &self.visible,
            prefetch: &self.prefetch,
        };
        for &index in indices {
            // A request already in flight is left alone; re-issuing would
            // cancel it.
            if self.loader.is_pending(index) {
                continue;
            }
            if let LoadOutcome::Placeholder = self.loader.load_image(index, &ctx) {
                log::debug!("Index {index} resolved to placeholder");
            }
        }
    }

    fn evict_if_needed(&mut self) {
        if !self.cache.over_threshold() {
            return;
        }
        let report = self.cache.evict_non_visible(&EvictionContext {
            content: &self.content,
            layout: &self.layout,
            scroll: &self.scroll,
            viewport: self.viewport,
            visible: &self.visible,
            protected: self.selection.current(),
        });
        // Prefetched indices that were evicted are no longer wanted.
        for (index, _) in &report.evicted {
            self.prefetch.remove(index);
        }
        self.surface.schedule_release(report.nodes);
    }
}

impl Drop for CarouselView {
    fn drop(&mut self) {
        self.teardown();
    }
}
