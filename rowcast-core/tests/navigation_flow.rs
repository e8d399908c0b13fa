mod support;

use std::time::{Duration, Instant};

use rowcast_core::diagnostics::NavScenario;
use rowcast_core::{
    CarouselEvent, CarouselKey, CategoryLayoutModel, Direction, KeyResponse, NavOutcome,
};
use support::{Harness, offline_content};

const SETTLED: Duration = Duration::from_millis(400);

fn catalog() -> Harness {
    let mut h = Harness::offline();
    h.view.set_viewport(1280.0, 720.0);
    h.view.set_content(
        offline_content(&[("Movies", 12), ("Series", 3), ("Sports", 8)]),
        CategoryLayoutModel::default(),
    );
    h
}

/// Navigate and run the animation (and any settle follow-up) to the end.
fn step(h: &mut Harness, direction: Direction, now: &mut Instant) -> NavOutcome {
    let outcome = h.view.navigate_at(direction, *now);
    while h.view.is_animating() {
        *now += SETTLED;
        h.view.tick(*now);
    }
    outcome
}

#[tokio::test]
async fn right_stops_at_the_last_item_of_a_row() {
    let mut h = Harness::offline();
    h.view.set_viewport(1280.0, 720.0);
    h.view.set_content(
        offline_content(&[("A", 3), ("B", 5)]),
        CategoryLayoutModel::default(),
    );
    assert_eq!(h.view.current_index(), Some(0));

    assert_eq!(h.view.handle_key(CarouselKey::Right), KeyResponse::Handled);
    assert_eq!(h.view.handle_key(CarouselKey::Right), KeyResponse::Handled);
    assert_eq!(h.view.current_index(), Some(2));

    assert_eq!(h.view.navigate(Direction::Right), NavOutcome::Stay);
    assert_eq!(h.view.current_index(), Some(2));
    assert_eq!(h.view.current_category(), Some("A"));
}

#[tokio::test]
async fn boundaries_leave_state_untouched() {
    let mut h = catalog();
    h.drain_events();

    let before = (h.view.current_index(), h.view.scroll().clone());
    assert_eq!(h.view.navigate(Direction::Up), NavOutcome::Stay);
    assert_eq!(h.view.navigate(Direction::Left), NavOutcome::Propagate);
    assert_eq!(h.view.handle_key(CarouselKey::Left), KeyResponse::Ignored);
    assert_eq!((h.view.current_index(), h.view.scroll().clone()), before);
    assert_eq!(h.view.current_category(), Some("Movies"));
    assert!(h.drain_events().is_empty());

    let mut now = Instant::now();
    step(&mut h, Direction::Down, &mut now);
    step(&mut h, Direction::Down, &mut now);
    assert_eq!(h.view.current_category(), Some("Sports"));
    let at_bottom = h.view.current_index();
    assert_eq!(step(&mut h, Direction::Down, &mut now), NavOutcome::Stay);
    assert_eq!(h.view.current_index(), at_bottom);
}

#[tokio::test]
async fn down_then_up_returns_to_the_same_position() {
    let mut h = catalog();
    let mut now = Instant::now();

    step(&mut h, Direction::Right, &mut now);
    step(&mut h, Direction::Right, &mut now);
    assert_eq!(h.view.current_index(), Some(2));

    step(&mut h, Direction::Down, &mut now);
    assert_eq!(h.view.current_category(), Some("Series"));
    assert_eq!(h.view.current_index(), Some(14));

    step(&mut h, Direction::Up, &mut now);
    assert_eq!(h.view.current_index(), Some(2));
}

#[tokio::test]
async fn shorter_row_falls_back_to_its_first_item() {
    let mut h = catalog();
    let mut now = Instant::now();
    for _ in 0..5 {
        step(&mut h, Direction::Right, &mut now);
    }
    assert_eq!(h.view.current_index(), Some(5));

    step(&mut h, Direction::Down, &mut now);
    assert_eq!(h.view.current_index(), Some(12));
    step(&mut h, Direction::Up, &mut now);
    assert_eq!(h.view.current_index(), Some(0));
}

#[tokio::test]
async fn horizontal_move_centers_the_focused_tile() {
    let mut h = catalog();
    let mut now = Instant::now();

    // Tiles near the start cannot be centered; the row stays at rest.
    step(&mut h, Direction::Right, &mut now);
    assert_eq!(h.view.scroll().horizontal("Movies"), 0.0);

    for _ in 0..3 {
        step(&mut h, Direction::Right, &mut now);
    }
    // Tile 4 is four 210 strides in; centering a 200 wide tile in 1280
    // puts the row at 840 - 540.
    assert_eq!(h.view.current_index(), Some(4));
    assert!((h.view.scroll().horizontal("Movies") - 300.0).abs() < 0.01);

    for _ in 0..7 {
        step(&mut h, Direction::Right, &mut now);
    }
    // The last tile pins the row to its end.
    let max = h
        .view
        .layout()
        .max_horizontal_scroll(h.view.content(), "Movies", 1280.0);
    assert_eq!(h.view.current_index(), Some(11));
    assert!((h.view.scroll().horizontal("Movies") - max).abs() < 0.01);
}

#[tokio::test]
async fn animation_is_in_flight_until_its_duration_elapses() {
    let mut h = catalog();
    let start = Instant::now();

    h.view.navigate_at(Direction::Down, start);
    assert!(h.view.is_animating());
    // Selection moves with the input, before the scroll finishes.
    assert_eq!(h.view.current_category(), Some("Series"));

    h.view.tick(start + Duration::from_millis(100));
    let midway = h.view.scroll().vertical();
    assert!(midway > 0.0 && midway < 15.0, "midway offset {midway}");

    h.view.tick(start + SETTLED);
    assert!(!h.view.is_animating());
    // Series tiles start at 270; centering a 210 row in 720 gives 15.
    assert!((h.view.scroll().vertical() - 15.0).abs() < 0.01);
}

#[tokio::test]
async fn last_row_is_anchored_then_nudged_into_full_view() {
    let mut h = catalog();
    let start = Instant::now();
    let mut now = start;
    step(&mut h, Direction::Down, &mut now);

    let leg = now;
    h.view.navigate_at(Direction::Down, leg);
    h.view.tick(leg + SETTLED);
    // Bottom anchored at 90% of the viewport: 515 + 240 - 648.
    assert!((h.view.scroll().vertical() - 107.0).abs() < 0.01);
    // The focused tile still overflows the 95% line, so a corrective
    // scroll is running.
    assert!(h.view.is_animating());

    h.view.tick(leg + SETTLED * 2);
    assert!(!h.view.is_animating());
    let max = h
        .view
        .layout()
        .max_vertical_scroll(h.view.content(), 720.0);
    assert!((h.view.scroll().vertical() - max).abs() < 0.01);
}

#[tokio::test]
async fn row_change_without_vertical_travel_still_corrects_the_last_row() {
    let mut h = Harness::offline();
    h.view.set_viewport(1280.0, 720.0);
    h.view.set_content(
        offline_content(&[("Movies", 12), ("Series", 12), ("Sports", 12)]),
        CategoryLayoutModel::default(),
    );
    let mut now = Instant::now();
    for _ in 0..6 {
        step(&mut h, Direction::Right, &mut now);
    }
    step(&mut h, Direction::Down, &mut now);
    assert_eq!(h.view.current_index(), Some(18));

    // Park the stack where the last row anchors, so only the row slides.
    h.view.scroll_by(0.0, 107.0 - h.view.scroll().vertical());
    assert!((h.view.scroll().vertical() - 107.0).abs() < 0.01);

    let leg = now;
    h.view.navigate_at(Direction::Down, leg);
    assert_eq!(h.view.current_index(), Some(30));
    assert!(h.view.is_animating());
    assert!((h.view.scroll().vertical() - 107.0).abs() < 0.01);

    // The row tween finishes and hands over to the corrective scroll.
    h.view.tick(leg + SETTLED);
    assert!((h.view.scroll().horizontal("Sports") - 720.0).abs() < 0.01);
    assert!(h.view.is_animating());

    h.view.tick(leg + SETTLED * 2);
    assert!(!h.view.is_animating());
    let max = h
        .view
        .layout()
        .max_vertical_scroll(h.view.content(), 720.0);
    assert!((h.view.scroll().vertical() - max).abs() < 0.01);
}

#[tokio::test]
async fn selection_and_activation_events_carry_the_item() {
    let mut h = catalog();
    let events = h.drain_events();
    assert!(matches!(
        &events[0],
        CarouselEvent::ContentChanged { rows, item_count: 23 } if rows.len() == 3
    ));
    assert!(matches!(&events[1], CarouselEvent::SelectionChanged { index: 0, .. }));

    h.view.handle_key(CarouselKey::Right);
    h.view.handle_key(CarouselKey::Confirm);
    h.view.handle_key(CarouselKey::Info);

    let events = h.drain_events();
    assert_eq!(events.len(), 3);
    match &events[1] {
        CarouselEvent::ActionActivated { index, payload } => {
            assert_eq!(*index, 1);
            assert_eq!(payload.action, "OK");
            assert_eq!(payload.title, "Movies 1");
            assert_eq!(payload.category, "Movies");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(
        &events[2],
        CarouselEvent::ActionActivated { payload, .. } if payload.action == "INFO"
    ));
}

#[tokio::test]
async fn set_current_index_scrolls_to_the_item() {
    let mut h = catalog();
    assert!(!h.view.set_current_index(99));
    assert!(h.view.set_current_index(20));
    assert_eq!(h.view.current_category(), Some("Sports"));

    let mut now = Instant::now();
    while h.view.is_animating() {
        now += SETTLED;
        h.view.tick(now);
    }
    assert!(h.view.scroll().vertical() > 0.0);
    assert!(h.view.visible().contains(20));
}

#[tokio::test]
async fn wheel_scrolling_clamps_and_cancels_animation() {
    let mut h = catalog();
    h.view.navigate_at(Direction::Down, Instant::now());
    assert!(h.view.is_animating());

    h.view.scroll_by(0.0, 10_000.0);
    assert!(!h.view.is_animating());
    let max = h
        .view
        .layout()
        .max_vertical_scroll(h.view.content(), 720.0);
    assert_eq!(h.view.scroll().vertical(), max);

    h.view.scroll_by(-50_000.0, -10_000.0);
    assert_eq!(h.view.scroll().vertical(), 0.0);
    assert_eq!(h.view.scroll().horizontal("Series"), 0.0);
}

#[tokio::test]
async fn navigation_is_recorded_as_a_diagnostic_scenario() {
    let mut h = catalog();
    h.view.navigate(Direction::Right);

    let summary = h.diagnostics.last_summary().expect("scenario summary");
    assert_eq!(summary.scenario, NavScenario::NavRight);
    assert!(summary.events.len() >= 3);
}
