//! Target acquisition and popup placement in virtual time.
//!
//! The fake page is 1000x800, unscrolled, with a 60x30 popup unless a test
//! says otherwise. The default settle delay is 100ms and the default step
//! delay is 1000ms.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use waypoint::testing::{FakeElement, FakePage, RecordingRouter};
use waypoint::{
    ClientRect, ElementRef, Padding, PopupControl, PopupPosition, PopupSize, ScrollBehavior,
    ScrollRequest, StepDefinition, StepOptionsPatch, TargetSize, TourConfig, TourController,
    TourDefinition,
};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn page() -> FakePage {
    FakePage::new(1000.0, 800.0).with_popup(PopupSize::new(60.0, 30.0))
}

fn controller_on(page: FakePage) -> TourController<FakePage> {
    TourController::new(TourConfig::default(), RecordingRouter::new(), page)
}

fn controller() -> TourController<FakePage> {
    controller_on(page())
}

fn element(left: f64, top: f64, width: f64, height: f64) -> Rc<FakeElement> {
    FakeElement::at(ClientRect::new(left, top, width, height))
}

fn single(step: StepDefinition) -> TourDefinition {
    TourDefinition::new().add_step(step)
}

fn position(tour: &TourController<FakePage>) -> Option<PopupPosition> {
    tour.view_signal().get().and_then(|view| view.position)
}

#[test]
fn down_placement_end_to_end() {
    let mut tour = controller();
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.start_tour(single(StepDefinition::new("a"))).unwrap();
    assert_eq!(position(&tour), None);

    tour.advance_time(Duration::ZERO);

    assert_eq!(position(&tour), Some(PopupPosition::top_left(120, 170)));
    assert_eq!(tour.host().focused(), &[PopupControl::Next]);
    assert_eq!(
        tour.host().scrolls(),
        &[ScrollRequest {
            top: -30,
            left: 200,
            behavior: ScrollBehavior::Instant,
        }]
    );
}

#[test]
fn center_placement_ignores_target() {
    let mut tour = controller();
    tour.register_target("a", element(10.0, 10.0, 5.0, 5.0));
    tour.start_tour(single(
        StepDefinition::new("a").options(StepOptionsPatch::new().placement("center")),
    ))
    .unwrap();
    tour.advance_time(Duration::ZERO);
    assert_eq!(position(&tour), Some(PopupPosition::top_left(385, 470)));
}

#[test]
fn target_padding_grows_the_box() {
    let mut tour = controller();
    tour.register_target("a", element(50.0, 20.0, 100.0, 100.0));
    tour.start_tour(single(
        StepDefinition::new("a")
            .options(StepOptionsPatch::new().step_target_resize(Padding::uniform(10))),
    ))
    .unwrap();
    tour.advance_time(Duration::ZERO);

    let target = tour.view_signal().get().and_then(|view| view.target);
    assert_eq!(
        target,
        Some(TargetSize {
            top: 10,
            left: 40,
            bottom: 130,
            right: 160,
            width: 120,
            height: 120,
            page_height: 800,
        })
    );
}

#[test]
fn top_placement_scrolls_above_the_popup() {
    let mut tour = controller();
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.start_tour(single(StepDefinition::new("a").options(
        StepOptionsPatch::new().placement("top").smooth_scroll(true),
    )))
    .unwrap();
    tour.advance_time(Duration::ZERO);

    assert_eq!(position(&tour), Some(PopupPosition::top_left(20, 170)));
    assert_eq!(
        tour.host().scrolls(),
        &[ScrollRequest {
            top: -10,
            left: 0,
            behavior: ScrollBehavior::Smooth,
        }]
    );
}

#[test]
fn fixed_popup_scrolls_to_origin() {
    let mut tour = controller();
    tour.register_target("a", element(200.0, 500.0, 40.0, 30.0));
    tour.start_tour(single(
        StepDefinition::new("a").options(StepOptionsPatch::new().fixed(true)),
    ))
    .unwrap();
    tour.advance_time(Duration::ZERO);
    assert_eq!(
        tour.host().scrolls(),
        &[ScrollRequest {
            top: 0,
            left: 0,
            behavior: ScrollBehavior::Instant,
        }]
    );
}

#[test]
fn focus_falls_back_to_done() {
    let mut tour = controller_on(page().with_controls(vec![PopupControl::Done]));
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.start_tour(single(StepDefinition::new("a"))).unwrap();
    tour.advance_time(Duration::ZERO);
    assert_eq!(tour.host().focused(), &[PopupControl::Done]);
}

#[test]
fn autofocus_and_scroll_can_be_disabled() {
    let mut tour = controller();
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.start_tour(single(
        StepDefinition::new("a").options(StepOptionsPatch::new().autofocus(false).scroll_to(false)),
    ))
    .unwrap();
    tour.advance_time(Duration::ZERO);
    assert!(position(&tour).is_some());
    assert!(tour.host().focused().is_empty());
    assert!(tour.host().scrolls().is_empty());
}

#[test]
fn view_moves_from_pending_to_confirmed() {
    let mut tour = controller();
    tour.start_tour(single(StepDefinition::new("a"))).unwrap();

    let pending = tour.view_signal().get().unwrap();
    assert_eq!(pending.classes, "with-arrow pos-down fade-on");
    assert_eq!(pending.backdrop.target_background, "rgb(20, 60, 60)");
    assert_eq!(pending.target, None);

    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    let confirmed = tour.view_signal().get().unwrap();
    assert_eq!(confirmed.classes, "with-arrow pos-down animation-on a");
    assert_eq!(confirmed.backdrop.target_background, "transparent");
    assert!(confirmed.target.is_some());
}

#[test]
fn route_change_delays_notification() {
    let mut tour = controller();
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.start_tour(single(StepDefinition::new("a").route("/x")))
        .unwrap();

    tour.advance_time(ms(999));
    assert_eq!(tour.target_signal().get(), None);

    tour.advance_time(ms(1));
    assert_eq!(
        tour.target_signal().get().map(|ready| ready.step_name),
        Some("a".to_string())
    );
    assert_eq!(position(&tour), Some(PopupPosition::top_left(120, 170)));
}

#[test]
fn route_change_retries_before_skipping() {
    let mut tour = controller();
    let def = TourDefinition::new()
        .add_step(StepDefinition::new("a").route("/x"))
        .add_step(StepDefinition::new("b"));
    tour.start_tour(def).unwrap();

    // First check after delay + settle, then two retries one delay apart.
    tour.advance_time(ms(3099));
    assert_eq!(tour.history(), &[0]);

    tour.advance_time(ms(1));
    assert_eq!(tour.history(), &[0, 1]);
    assert!(tour.is_started());
}

#[test]
fn missing_target_on_routed_last_step_stops() {
    let mut tour = controller();
    tour.start_tour(single(StepDefinition::new("only").route("/r")))
        .unwrap();

    tour.advance_time(ms(3099));
    assert!(tour.is_started());

    tour.advance_time(ms(1));
    assert!(!tour.is_started());
    assert_eq!(tour.target_signal().get(), None);
    assert_eq!(tour.time_until_next(), None);
}

#[test]
fn late_registration_beats_the_check() {
    let mut tour = controller();
    tour.start_tour(single(StepDefinition::new("a"))).unwrap();
    tour.advance_time(ms(50));
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.advance_time(ms(500));

    assert!(tour.is_started());
    assert_eq!(position(&tour), Some(PopupPosition::top_left(120, 170)));
}

#[test]
fn unregistered_target_counts_as_missing() {
    let mut tour = controller();
    tour.register_target("only", element(0.0, 0.0, 10.0, 10.0));
    assert!(tour.unregister_target("only").is_some());
    tour.start_tour(single(StepDefinition::new("only"))).unwrap();
    tour.advance_time(ms(100));
    assert!(!tour.is_started());
}

#[test]
fn timers_from_a_left_step_never_fire() {
    let mut tour = controller();
    tour.register_target("a", element(0.0, 0.0, 10.0, 10.0));
    tour.register_target("b", element(200.0, 70.0, 40.0, 30.0));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = tour.target_signal().subscribe_changes(move |ready| {
        if let Some(ready) = ready {
            sink.borrow_mut().push(ready.step_name.clone());
        }
    });

    let def = TourDefinition::new()
        .add_step(StepDefinition::new("a"))
        .add_step(StepDefinition::new("b"));
    tour.start_tour(def).unwrap();
    tour.next_step().unwrap();
    tour.advance_time(ms(500));

    assert_eq!(*seen.borrow(), vec!["b".to_string()]);
    assert_eq!(tour.history(), &[0, 1]);
}

#[test]
fn readiness_for_another_step_is_ignored() {
    let mut tour = controller();
    tour.register_target("b", element(200.0, 70.0, 40.0, 30.0));
    let def = TourDefinition::new()
        .add_step(StepDefinition::new("a"))
        .add_step(StepDefinition::new("b"));
    tour.start_tour(def).unwrap();

    let stray: ElementRef = element(0.0, 0.0, 1.0, 1.0);
    tour.notify_target_ready("b", stray);
    assert_eq!(tour.target_signal().get(), None);
}

#[test]
fn stopping_cancels_pending_work() {
    let mut tour = controller();
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.start_tour(single(StepDefinition::new("a").route("/x")))
        .unwrap();
    assert!(tour.time_until_next().is_some());

    tour.stop_tour();
    assert_eq!(tour.time_until_next(), None);
    tour.advance_time(ms(5000));
    assert_eq!(tour.target_signal().get(), None);
    assert_eq!(tour.view_signal().get(), None);
}

#[test]
fn placement_waits_for_the_popup() {
    let mut tour = controller_on(FakePage::new(1000.0, 800.0));
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.start_tour(single(StepDefinition::new("a"))).unwrap();

    tour.advance_time(Duration::ZERO);
    assert!(tour.target_signal().get().is_some());
    assert_eq!(position(&tour), None);
    assert_eq!(tour.time_until_next(), Some(ms(100)));

    tour.host_mut().set_popup(Some(PopupSize::new(60.0, 30.0)));
    tour.advance_time(ms(100));
    assert_eq!(position(&tour), Some(PopupPosition::top_left(120, 170)));
    assert_eq!(tour.host().focused(), &[PopupControl::Next]);
}

#[test]
fn resize_remeasures_and_replaces() {
    let mut tour = controller();
    let target = element(200.0, 70.0, 40.0, 30.0);
    tour.register_target("a", Rc::clone(&target) as ElementRef);
    tour.start_tour(single(StepDefinition::new("a"))).unwrap();
    tour.advance_time(Duration::ZERO);

    target.move_to(ClientRect::new(400.0, 170.0, 40.0, 30.0));
    tour.host_mut().set_viewport(1200.0, 900.0);
    tour.handle_resize();

    assert_eq!(position(&tour), Some(PopupPosition::top_left(220, 370)));
    assert_eq!(tour.host().scrolls().len(), 2);
}

#[test]
fn repeated_registration_places_once() {
    let mut tour = controller_on(FakePage::new(1000.0, 800.0));
    tour.start_tour(single(StepDefinition::new("a").options(
        StepOptionsPatch::new().smooth_scroll(true),
    )))
    .unwrap();
    for _ in 0..3 {
        tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    }
    tour.advance_time(ms(250));
    assert_eq!(position(&tour), None);

    tour.host_mut().set_popup(Some(PopupSize::new(60.0, 30.0)));
    tour.advance_time(ms(500));

    assert_eq!(position(&tour), Some(PopupPosition::top_left(120, 170)));
    assert_eq!(tour.host().focused(), &[PopupControl::Next]);
    assert_eq!(tour.host().scrolls().len(), 1);
    assert_eq!(tour.time_until_next(), None);
}

#[test]
fn resize_before_measurement_keeps_one_placement() {
    let mut tour = controller_on(FakePage::new(1000.0, 800.0));
    tour.register_target("a", element(200.0, 70.0, 40.0, 30.0));
    tour.start_tour(single(StepDefinition::new("a"))).unwrap();
    tour.advance_time(Duration::ZERO);
    tour.handle_resize();
    tour.handle_resize();

    tour.host_mut().set_popup(Some(PopupSize::new(60.0, 30.0)));
    tour.advance_time(ms(500));
    assert_eq!(tour.host().focused(), &[PopupControl::Next]);
    assert_eq!(tour.host().scrolls().len(), 1);
}

#[test]
fn pending_hole_keeps_the_previous_theme() {
    let mut tour = controller();
    let def = TourDefinition::new()
        .add_step(StepDefinition::new("a").options(StepOptionsPatch::new().theme_color("black")))
        .add_step(StepDefinition::new("b").options(StepOptionsPatch::new().theme_color("white")));
    tour.start_tour(def).unwrap();
    let first = tour.view_signal().get().unwrap();
    assert_eq!(first.backdrop.target_background, "black");

    tour.next_step().unwrap();
    let second = tour.view_signal().get().unwrap();
    assert_eq!(second.backdrop.theme_color, "white");
    assert_eq!(second.backdrop.target_background, "black");
}
