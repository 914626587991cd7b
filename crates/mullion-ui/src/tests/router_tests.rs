use mullion_graphics::{Insets, UiPoint};

use crate::input::{AllowedMovement, CursorKind, KeyCode, Modifiers, PointerButton};
use crate::node::FrameId;
use crate::router::{HitTarget, InputRouter};
use crate::support::{drain, RecordedEvent, Recorder};
use crate::tree::FrameTree;

fn target(frame: FrameId, x: i32, y: i32) -> HitTarget {
    HitTarget {
        frame,
        point: UiPoint::new(x, y),
    }
}

#[test]
fn press_then_move_drags_the_child_by_the_pointer_travel() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let child = tree.create_frame(200, 150);
    tree.add_child(root, child);
    tree.set_position(child, UiPoint::new(100, 100));
    tree.node_mut(child).set_can_move(AllowedMovement::All);

    let mut router = InputRouter::new();
    router.mouse_down(&mut tree, root, UiPoint::new(150, 150), PointerButton::Primary);
    assert_eq!(router.captured(), Some(child));

    router.mouse_move(&mut tree, root, UiPoint::new(160, 170));
    assert_eq!(tree.node(child).position(), UiPoint::new(110, 120));

    router.mouse_up(&mut tree, root, UiPoint::new(160, 170), PointerButton::Primary);
    assert_eq!(router.captured(), None);
    assert!(!tree.node(child).is_engaged());
}

#[test]
fn topmost_blocking_sibling_wins_the_overlap() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let below = tree.create_frame(100, 100);
    let above = tree.create_frame(100, 100);
    tree.add_child(root, below);
    tree.add_child(root, above);
    tree.set_position(below, UiPoint::new(50, 50));

    let router = InputRouter::new();
    // inside both: the frame later in the child list is on top
    assert_eq!(
        router.hit_test(&tree, root, UiPoint::new(60, 60)),
        vec![target(above, 60, 60)]
    );
    // outside the top frame the lower sibling shows through
    assert_eq!(
        router.hit_test(&tree, root, UiPoint::new(120, 120)),
        vec![target(below, 70, 70)]
    );
}

#[test]
fn non_blocking_frames_stack_targets_deepest_first() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let panel = tree.create_frame(200, 200);
    let badge = tree.create_frame(50, 50);
    tree.add_child(root, panel);
    tree.add_child(panel, badge);
    tree.set_position(panel, UiPoint::new(100, 100));
    tree.set_position(badge, UiPoint::new(20, 20));
    tree.node_mut(badge).set_blocks_mouse(false);
    tree.node_mut(panel).set_blocks_mouse(false);

    let router = InputRouter::new();
    assert_eq!(
        router.hit_test(&tree, root, UiPoint::new(130, 130)),
        vec![
            target(badge, 10, 10),
            target(panel, 30, 30),
            target(root, 130, 130),
        ]
    );
}

#[test]
fn pass_through_frames_receive_nothing() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let lower = tree.create_frame(100, 100);
    let overlay = tree.create_frame(100, 100);
    tree.add_child(root, lower);
    tree.add_child(root, overlay);
    tree.node_mut(overlay).set_can_receive_mouse(false);
    tree.node_mut(overlay).set_blocks_mouse(false);

    let router = InputRouter::new();
    assert_eq!(
        router.hit_test(&tree, root, UiPoint::new(10, 10)),
        vec![target(lower, 10, 10)]
    );

    // a deaf but blocking overlay shadows everything beneath it
    tree.node_mut(overlay).set_blocks_mouse(true);
    assert_eq!(router.hit_test(&tree, root, UiPoint::new(10, 10)), vec![]);
}

#[test]
fn client_insets_clip_the_border_band() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(200, 150);
    let fill = tree.create_frame(200, 150);
    tree.add_child(root, fill);
    tree.node_mut(root).set_client_insets(Insets::uniform(4));

    let router = InputRouter::new();
    assert_eq!(
        router.hit_test(&tree, root, UiPoint::new(50, 50)),
        vec![target(fill, 50, 50)]
    );
    // the border band is outside the client area for every frame
    assert_eq!(router.hit_test(&tree, root, UiPoint::new(2, 50)), vec![]);
}

#[test]
fn children_do_not_extend_the_hittable_area_of_a_parent() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let panel = tree.create_frame(100, 100);
    let badge = tree.create_frame(50, 50);
    tree.add_child(root, panel);
    tree.add_child(panel, badge);
    tree.set_position(panel, UiPoint::new(100, 100));
    // sticks out past the panel's bottom-right corner
    tree.set_position(badge, UiPoint::new(80, 80));

    let router = InputRouter::new();
    // over the clipped part of the badge inside the panel
    assert_eq!(
        router.hit_test(&tree, root, UiPoint::new(190, 190)),
        vec![target(badge, 10, 10)]
    );
    // over the overhang: the badge is clipped away, the root shows
    assert_eq!(
        router.hit_test(&tree, root, UiPoint::new(210, 210)),
        vec![target(root, 210, 210)]
    );
}

#[test]
fn hover_transitions_fire_enter_and_translated_leave() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let left = tree.create_frame(100, 100);
    let right = tree.create_frame(100, 100);
    tree.add_child(root, left);
    tree.add_child(root, right);
    tree.set_position(right, UiPoint::new(100, 0));
    tree.node_mut(root).set_can_receive_mouse(false);
    tree.node_mut(root).set_blocks_mouse(false);
    let log = Recorder::install(&mut tree, left);
    Recorder::install_shared(&mut tree, right, &log);

    let mut router = InputRouter::new();
    router.mouse_move(&mut tree, root, UiPoint::new(50, 50));
    assert_eq!(
        drain(&log),
        vec![
            RecordedEvent::MouseMove(left, UiPoint::new(50, 50)),
            RecordedEvent::MouseEnter(left, UiPoint::new(50, 50)),
        ]
    );
    assert_eq!(router.hovered(), Some(left));

    router.mouse_move(&mut tree, root, UiPoint::new(150, 50));
    // the departed frame gets the point in its own space, then the leave
    assert_eq!(
        drain(&log),
        vec![
            RecordedEvent::MouseMove(right, UiPoint::new(50, 50)),
            RecordedEvent::MouseMove(left, UiPoint::new(150, 50)),
            RecordedEvent::MouseLeave(left, UiPoint::new(150, 50)),
            RecordedEvent::MouseEnter(right, UiPoint::new(50, 50)),
        ]
    );

    // moving into empty space changes nothing
    router.mouse_move(&mut tree, root, UiPoint::new(400, 400));
    assert!(drain(&log).is_empty());
    assert_eq!(router.hovered(), Some(right));
}

#[test]
fn repeated_moves_inside_one_frame_enter_once() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let child = tree.create_frame(100, 100);
    tree.add_child(root, child);
    let log = Recorder::install(&mut tree, child);

    let mut router = InputRouter::new();
    router.mouse_move(&mut tree, root, UiPoint::new(10, 10));
    router.mouse_move(&mut tree, root, UiPoint::new(20, 20));
    let events = drain(&log);
    let enters = events
        .iter()
        .filter(|event| matches!(event, RecordedEvent::MouseEnter(..)))
        .count();
    assert_eq!(enters, 1);
}

#[test]
fn capture_redirects_moves_away_from_other_frames() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let dragged = tree.create_frame(100, 100);
    let other = tree.create_frame(100, 100);
    tree.add_child(root, dragged);
    tree.add_child(root, other);
    tree.set_position(other, UiPoint::new(200, 0));
    tree.node_mut(dragged).set_can_move(AllowedMovement::All);
    let other_log = Recorder::install(&mut tree, other);

    let mut router = InputRouter::new();
    router.mouse_down(&mut tree, root, UiPoint::new(50, 50), PointerButton::Primary);
    assert_eq!(router.captured(), Some(dragged));

    // crosses deep into the other frame's bounds
    router.mouse_move(&mut tree, root, UiPoint::new(250, 50));
    assert_eq!(
        router.hit_test(&tree, root, UiPoint::new(250, 50)),
        vec![target(dragged, 50, 50)]
    );
    assert!(drain(&other_log).is_empty());
    assert_eq!(tree.node(dragged).position(), UiPoint::new(200, 0));
}

#[test]
fn the_outermost_engaging_frame_keeps_the_capture() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let panel = tree.create_frame(200, 200);
    let child = tree.create_frame(100, 100);
    tree.add_child(root, panel);
    tree.add_child(panel, child);
    tree.node_mut(panel).set_can_move(AllowedMovement::All);
    tree.node_mut(child).set_can_move(AllowedMovement::All);
    tree.node_mut(child).set_blocks_mouse(false);

    let mut router = InputRouter::new();
    router.mouse_down(&mut tree, root, UiPoint::new(50, 50), PointerButton::Primary);
    assert_eq!(router.captured(), Some(panel));
    assert_eq!(router.last_pressed(), Some(child));
    // the deeper frame lost the capture race and went back to idle
    assert!(!tree.node(child).is_engaged());
    assert!(tree.node(panel).is_engaged());

    router.mouse_up(&mut tree, root, UiPoint::new(50, 50), PointerButton::Primary);
    assert_eq!(router.captured(), None);
    assert!(!tree.node(panel).is_engaged());
}

#[test]
fn keys_reach_the_source_and_the_last_pressed_frame_once() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let child = tree.create_frame(100, 100);
    tree.add_child(root, child);
    tree.set_position(child, UiPoint::new(100, 100));
    let log = Recorder::install(&mut tree, root);
    Recorder::install_shared(&mut tree, child, &log);

    let mut router = InputRouter::new();
    router.mouse_down(&mut tree, root, UiPoint::new(150, 150), PointerButton::Primary);
    drain(&log);

    router.key_down(&mut tree, root, KeyCode::A, Modifiers::NONE);
    assert_eq!(
        drain(&log),
        vec![
            RecordedEvent::KeyDown(root, KeyCode::A, Modifiers::NONE),
            RecordedEvent::KeyDown(child, KeyCode::A, Modifiers::NONE),
        ]
    );

    // pressing the root itself collapses both deliveries into one
    router.mouse_down(&mut tree, root, UiPoint::new(400, 400), PointerButton::Primary);
    assert_eq!(router.last_pressed(), Some(root));
    drain(&log);
    router.key_up(&mut tree, root, KeyCode::A, Modifiers::NONE);
    assert_eq!(
        drain(&log),
        vec![RecordedEvent::KeyUp(root, KeyCode::A, Modifiers::NONE)]
    );
}

#[test]
fn wheel_and_double_click_visit_every_target() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let panel = tree.create_frame(200, 200);
    tree.add_child(root, panel);
    tree.node_mut(panel).set_blocks_mouse(false);
    let log = Recorder::install(&mut tree, panel);
    Recorder::install_shared(&mut tree, root, &log);

    let mut router = InputRouter::new();
    router.mouse_wheel(&mut tree, root, UiPoint::new(50, 50), -3);
    router.mouse_double_click(&mut tree, root, UiPoint::new(50, 50), PointerButton::Primary);
    assert_eq!(
        drain(&log),
        vec![
            RecordedEvent::Wheel(panel, UiPoint::new(50, 50), -3),
            RecordedEvent::Wheel(root, UiPoint::new(50, 50), -3),
            RecordedEvent::DoubleClick(panel, PointerButton::Primary, UiPoint::new(50, 50)),
            RecordedEvent::DoubleClick(root, PointerButton::Primary, UiPoint::new(50, 50)),
        ]
    );
}

#[test]
fn move_over_a_resize_border_requests_the_band_cursor() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let child = tree.create_frame(200, 150);
    tree.add_child(root, child);
    tree.set_position(child, UiPoint::new(100, 100));
    tree.node_mut(child).set_can_resize(true);

    let mut router = InputRouter::new();
    router.mouse_move(&mut tree, root, UiPoint::new(101, 101));
    assert_eq!(router.take_cursor(), Some(CursorKind::SizeNwse));
    assert_eq!(router.take_cursor(), None);

    router.mouse_move(&mut tree, root, UiPoint::new(150, 150));
    assert_eq!(router.take_cursor(), Some(CursorKind::Arrow));
}

#[test]
fn destroying_the_captured_frame_releases_it() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let child = tree.create_frame(100, 100);
    tree.add_child(root, child);
    tree.node_mut(child).set_can_move(AllowedMovement::All);

    let mut router = InputRouter::new();
    router.mouse_down(&mut tree, root, UiPoint::new(50, 50), PointerButton::Primary);
    assert_eq!(router.captured(), Some(child));

    tree.destroy(child);
    router.mouse_move(&mut tree, root, UiPoint::new(60, 60));
    assert_eq!(router.captured(), None);
    assert_eq!(router.last_pressed(), None);
}

#[test]
fn forget_clears_every_reference_to_a_frame() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let child = tree.create_frame(100, 100);
    tree.add_child(root, child);
    tree.node_mut(child).set_can_move(AllowedMovement::All);

    let mut router = InputRouter::new();
    router.mouse_move(&mut tree, root, UiPoint::new(50, 50));
    router.mouse_down(&mut tree, root, UiPoint::new(50, 50), PointerButton::Primary);
    router.forget(child);
    assert_eq!(router.captured(), None);
    assert_eq!(router.hovered(), None);
    assert_eq!(router.last_pressed(), None);
}
