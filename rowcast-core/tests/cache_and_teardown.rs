mod support;

use std::time::{Duration, Instant};

use rowcast_core::constants::cache::OFFSCREEN_TILE_SLACK;
use rowcast_core::{
    CarouselKey, CarouselTuning, CategoryLayoutModel, Direction, KeyResponse, LifecyclePhase,
    NavOutcome,
};
use support::{Harness, Reply, ScriptedFetcher, offline_content, remote_content};

const SETTLED: Duration = Duration::from_millis(400);

fn settle(h: &mut Harness, now: &mut Instant) {
    while h.view.is_animating() {
        *now += SETTLED;
        h.view.tick(*now);
    }
}

/// Either the cache is within budget, or everything left is on screen, in
/// a visible row and near the viewport, or focused.
fn assert_bounded(h: &Harness) {
    let view = &h.view;
    let cache = view.cache();
    if cache.len() <= cache.threshold() {
        return;
    }
    let width = view.viewport().width;
    for index in cache.indices() {
        let category = view.content().category_of(index).expect("known index");
        assert!(
            view.visible().contains_category(category),
            "index {index} cached for hidden row {category}"
        );
        if view.visible().contains(index) || view.current_index() == Some(index) {
            continue;
        }
        let position = view.content().position_in_category(index).expect("position");
        let slack = view.layout().layout_for(category).tile_width * OFFSCREEN_TILE_SLACK;
        let x = view.layout().tile_x(category, position) - view.scroll().horizontal(category);
        assert!(
            x >= -slack && x <= width + slack,
            "index {index} kept {x} px away while over budget"
        );
    }
}

#[tokio::test]
async fn cache_stays_bounded_while_browsing() {
    let tuning = CarouselTuning {
        visible_row_budget: 1,
        ..CarouselTuning::default()
    };
    let mut h = Harness::new(tuning, ScriptedFetcher::new(Reply::Hang));
    h.view.set_viewport(1280.0, 720.0);
    let rows: Vec<(String, usize)> = (0..12).map(|r| (format!("Row {r}"), 30)).collect();
    let rows: Vec<(&str, usize)> = rows.iter().map(|(name, n)| (name.as_str(), *n)).collect();
    h.view
        .set_content(offline_content(&rows), CategoryLayoutModel::default());
    assert_eq!(h.view.cache().threshold(), 10);
    assert_bounded(&h);

    let mut now = Instant::now();
    for row in 0..11 {
        for _ in 0..(row % 3) * 6 {
            h.view.navigate_at(Direction::Right, now);
            settle(&mut h, &mut now);
            assert_bounded(&h);
        }
        h.view.navigate_at(Direction::Down, now);
        settle(&mut h, &mut now);
        assert_bounded(&h);
    }
    assert_eq!(h.view.current_category(), Some("Row 11"));

    let frame = h.view.build_frame();
    assert!(frame.tiles.iter().all(|tile| tile.placeholder));
    assert!(frame.focused().is_some());
}

#[tokio::test]
async fn resizing_reclamps_scroll_offsets() {
    let mut h = Harness::offline();
    h.view.set_viewport(1280.0, 360.0);
    h.view.set_content(
        offline_content(&[("Movies", 12), ("Series", 3), ("Sports", 8)]),
        CategoryLayoutModel::default(),
    );
    h.view.scroll_by(10_000.0, 10_000.0);
    assert!(h.view.scroll().vertical() > 115.0);

    h.view.set_viewport(1280.0, 720.0);
    assert_eq!(h.view.scroll().vertical(), 115.0);

    h.view.set_viewport(4000.0, 2000.0);
    assert_eq!(h.view.scroll().vertical(), 0.0);
    assert_eq!(h.view.scroll().horizontal("Movies"), 0.0);
}

#[tokio::test]
async fn reload_releases_previous_nodes_and_resets_focus() {
    let mut h = Harness::offline();
    h.view.set_viewport(1280.0, 720.0);
    h.view.set_content(
        offline_content(&[("Movies", 6), ("Series", 6)]),
        CategoryLayoutModel::default(),
    );
    h.view.handle_key(CarouselKey::Down);
    let drawn = h.view.build_frame().tiles.len();
    assert!(drawn > 0);

    h.view
        .set_content(offline_content(&[("News", 2)]), CategoryLayoutModel::default());
    assert_eq!(h.surface.stats().releases_pending, drawn);
    assert_eq!(h.view.current_index(), Some(0));
    assert_eq!(h.view.current_category(), Some("News"));
    assert_eq!(h.view.scroll().vertical(), 0.0);
    assert_eq!(h.view.cache().len(), 2);
}

#[tokio::test]
async fn teardown_defers_node_release_until_sync() {
    let mut h = Harness::offline();
    h.view.set_viewport(1280.0, 720.0);
    h.view.set_content(
        offline_content(&[("Movies", 8), ("Series", 8)]),
        CategoryLayoutModel::default(),
    );
    let drawn = h.view.build_frame().tiles.len();
    assert!(drawn > 0);
    assert_eq!(h.surface.stats().nodes_live, drawn);

    h.view.teardown();
    assert_eq!(h.view.phase(), LifecyclePhase::Dead);
    assert!(h.view.cache().is_empty());
    assert!(h.view.content().is_empty());
    assert_eq!(h.view.current_index(), None);

    // Nothing is deleted until the renderer syncs.
    let stats = h.surface.stats();
    assert_eq!(stats.releases_pending, drawn);
    assert_eq!(stats.nodes_live, drawn);
    assert_eq!(h.surface.sync(), drawn);
    assert_eq!(h.surface.stats().nodes_live, 0);

    h.view.teardown();
    assert_eq!(h.surface.stats().releases_pending, 0);
}

#[tokio::test]
async fn torn_down_view_ignores_input() {
    let mut h = Harness::offline();
    h.view.set_viewport(1280.0, 720.0);
    h.view.set_content(
        offline_content(&[("Movies", 8), ("Series", 8)]),
        CategoryLayoutModel::default(),
    );
    h.view.teardown();
    h.drain_events();

    assert_eq!(h.view.navigate(Direction::Down), NavOutcome::Stay);
    assert_eq!(h.view.handle_key(CarouselKey::Right), KeyResponse::Ignored);
    assert!(!h.view.set_current_index(3));
    assert!(!h.view.tick(Instant::now() + SETTLED));
    assert!(h.view.build_frame().tiles.is_empty());

    h.view
        .set_content(offline_content(&[("News", 2)]), CategoryLayoutModel::default());
    assert!(h.view.content().is_empty());
    assert!(h.drain_events().is_empty());
}

#[tokio::test]
async fn teardown_cancels_requests_in_flight() {
    let fetcher = ScriptedFetcher::new(Reply::Image);
    let mut h = Harness::new(CarouselTuning::default(), fetcher);
    h.view.set_viewport(1280.0, 720.0);
    h.view
        .set_content(remote_content(&[("Movies", 5)]), CategoryLayoutModel::default());
    assert_eq!(h.view.stats().pending_fetches, 5);

    h.view.teardown();
    assert_eq!(h.view.stats().pending_fetches, 0);

    // Let the cancelled tasks run to completion.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(h.view.pump_completions(), 0);
    assert!(h.view.cache().is_empty());
    assert_eq!(h.surface.stats().textures_created, 0);
}

#[tokio::test]
async fn dropping_mid_animation_releases_everything() {
    let mut h = Harness::offline();
    h.view.set_viewport(1280.0, 720.0);
    h.view.set_content(
        offline_content(&[("Movies", 8), ("Series", 8), ("Sports", 8)]),
        CategoryLayoutModel::default(),
    );
    let drawn = h.view.build_frame().tiles.len();
    h.view.navigate_at(Direction::Down, Instant::now());
    assert!(h.view.is_animating());

    let Harness { view, surface, .. } = h;
    drop(view);
    assert_eq!(surface.stats().releases_pending, drawn);
    assert_eq!(surface.sync(), drawn);
}

#[tokio::test]
async fn prefetch_follows_focus_even_when_nothing_could_be_cached() {
    let mut h = Harness::offline();
    h.surface.set_ready(false);
    h.view.set_viewport(1280.0, 720.0);
    let rows: Vec<(String, usize)> = (0..8).map(|r| (format!("Row {r}"), 30)).collect();
    let rows: Vec<(&str, usize)> = rows.iter().map(|(name, n)| (name.as_str(), *n)).collect();
    h.view
        .set_content(offline_content(&rows), CategoryLayoutModel::default());

    let mut now = Instant::now();
    for _ in 0..20 {
        h.view.navigate_at(Direction::Right, now);
        settle(&mut h, &mut now);
    }
    assert!(h.view.cache().is_empty());
    assert!(h.view.prefetched().contains(&20));

    for _ in 0..6 {
        h.view.navigate_at(Direction::Down, now);
        settle(&mut h, &mut now);
    }
    assert_eq!(h.view.current_category(), Some("Row 6"));
    assert!(h.view.cache().is_empty());

    // Rows 0 and 1 are above the eager window and far from the focus.
    let content = h.view.content();
    let stale: Vec<usize> = h
        .view
        .prefetched()
        .iter()
        .copied()
        .filter(|&i| matches!(content.category_of(i), Some("Row 0" | "Row 1")))
        .collect();
    assert!(stale.is_empty(), "stale prefetch entries {stale:?}");
    assert!(h.view.prefetched().contains(&(6 * 30 + 20)));
}
