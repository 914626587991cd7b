use mullion_graphics::UiPoint;

use crate::anchors::{Anchor, EdgeMask};
use crate::node::FrameId;
use crate::support::{drain, RecordedEvent, Recorder};
use crate::tree::{FrameTree, GeometrySync};

fn anchor(target: FrameId, source: EdgeMask, edges: EdgeMask, margin: UiPoint) -> Anchor {
    Anchor {
        target,
        source_edges: source,
        target_edges: edges,
        margin,
    }
}

#[test]
fn bottom_right_anchor_tracks_root_resize() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let child = tree.create_frame(200, 150);
    tree.add_child(root, child);
    tree.set_position(child, UiPoint::new(100, 100));

    tree.add_anchor(
        root,
        anchor(
            child,
            EdgeMask::BOTTOM | EdgeMask::RIGHT,
            EdgeMask::BOTTOM | EdgeMask::RIGHT,
            UiPoint::new(-10, -10),
        ),
    );
    // applied immediately: both edges pinned 10px inside the root
    assert_eq!(tree.node(child).area().right(), 790);
    assert_eq!(tree.node(child).area().bottom(), 590);

    tree.set_size(root, UiPoint::new(1000, 600));
    assert_eq!(tree.node(child).area().right(), 990);
    assert_eq!(tree.node(child).area().bottom(), 590);
    assert_eq!(tree.node(child).position(), UiPoint::new(100, 100));
}

#[test]
fn each_rule_derives_from_the_driving_extent() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);

    // bottom edge drives a target's top: stacked below the driver
    let below = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(below, EdgeMask::BOTTOM, EdgeMask::TOP, UiPoint::new(0, 8)),
    );
    assert_eq!(tree.node(below).position().y, 208);

    // right edge drives a target's left: trailing the driver
    let trailing = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(trailing, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::new(4, 0)),
    );
    assert_eq!(tree.node(trailing).position().x, 304);

    // top edge drives a target's bottom: hanging above the margin line
    let hanging = tree.create_frame(50, 50);
    tree.set_position(hanging, UiPoint::new(0, 10));
    tree.add_anchor(
        driver,
        anchor(hanging, EdgeMask::TOP, EdgeMask::BOTTOM, UiPoint::new(0, 60)),
    );
    assert_eq!(tree.node(hanging).area().bottom(), 60);
    assert_eq!(tree.node(hanging).height(), 50);

    // left edge drives a target's right edge out to the margin line
    let pinned = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(pinned, EdgeMask::LEFT, EdgeMask::RIGHT, UiPoint::new(120, 0)),
    );
    assert_eq!(tree.node(pinned).area().right(), 120);

    // the driving extent is read fresh on every propagation
    tree.set_size(driver, UiPoint::new(400, 300));
    assert_eq!(tree.node(below).position().y, 308);
    assert_eq!(tree.node(trailing).position().x, 404);
}

#[test]
fn any_changed_source_edge_fires_the_whole_anchor() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);
    let corner = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(
            corner,
            EdgeMask::BOTTOM | EdgeMask::RIGHT,
            EdgeMask::BOTTOM | EdgeMask::RIGHT,
            UiPoint::ZERO,
        ),
    );

    tree.set_position(corner, UiPoint::new(10, 10));
    // width changes only the horizontal edges, but the anchor re-derives
    // both of its rules once any of its source edges moved
    tree.set_width(driver, 360);
    assert_eq!(tree.node(corner).area().right(), 360);
    assert_eq!(tree.node(corner).area().bottom(), 200);
}

#[test]
fn untouched_source_edges_fire_nothing() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);
    let side = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(side, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::ZERO),
    );
    assert_eq!(tree.node(side).position().x, 300);

    tree.set_position(side, UiPoint::new(7, 7));
    // height propagates the vertical edges only
    tree.set_height(driver, 260);
    assert_eq!(tree.node(side).position(), UiPoint::new(7, 7));

    tree.set_width(driver, 350);
    assert_eq!(tree.node(side).position(), UiPoint::new(350, 7));
}

#[test]
fn plain_moves_do_not_propagate() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);
    let target = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(target, EdgeMask::ALL, EdgeMask::LEFT, UiPoint::new(5, 0)),
    );
    tree.set_position(target, UiPoint::new(99, 99));

    tree.set_position(driver, UiPoint::new(40, 40));
    tree.set_left(driver, 60);
    tree.set_top(driver, 60);
    assert_eq!(tree.node(target).position(), UiPoint::new(99, 99));
}

#[test]
fn propagation_stops_after_one_level() {
    let mut tree = FrameTree::new();
    let a = tree.create_frame(100, 100);
    let b = tree.create_frame(100, 100);
    let c = tree.create_frame(100, 100);
    tree.add_anchor(a, anchor(b, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::ZERO));
    tree.add_anchor(b, anchor(c, EdgeMask::LEFT, EdgeMask::LEFT, UiPoint::new(3, 0)));
    let c_before = tree.node(c).position();

    // driving b through a's anchor must not re-run b's own anchors
    tree.set_width(a, 140);
    assert_eq!(tree.node(b).position().x, 140);
    assert_eq!(tree.node(c).position(), c_before);

    // a direct setter on b still drives c
    tree.set_position(c, UiPoint::new(50, 50));
    tree.set_width(b, 120);
    assert_eq!(tree.node(c).position(), UiPoint::new(3, 50));
}

#[test]
fn dead_targets_are_skipped() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);
    let doomed = tree.create_frame(50, 50);
    let survivor = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(doomed, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::ZERO),
    );
    tree.add_anchor(
        driver,
        anchor(survivor, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::new(1, 0)),
    );
    tree.destroy(doomed);

    tree.set_width(driver, 360);
    assert_eq!(tree.node(survivor).position().x, 361);
    assert_eq!(tree.anchors(driver).len(), 2);
}

#[test]
fn remove_anchor_ignores_the_margin() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);
    let target = tree.create_frame(50, 50);
    let first = anchor(target, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::new(10, 0));
    let second = anchor(target, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::new(20, 0));
    tree.add_anchor(driver, first);
    tree.add_anchor(driver, second);

    tree.remove_anchor(
        driver,
        anchor(target, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::ZERO),
    );
    assert_eq!(tree.anchors(driver), &[second]);
}

#[test]
#[should_panic(expected = "does not have")]
fn removing_a_missing_anchor_panics() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);
    let target = tree.create_frame(50, 50);
    tree.remove_anchor(
        driver,
        anchor(target, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::ZERO),
    );
}

#[test]
fn sizes_clamp_to_the_minimum() {
    let mut tree = FrameTree::new();
    let id = tree.create_frame(100, 100);
    tree.set_size(id, UiPoint::new(1, 1));
    assert_eq!(tree.node(id).area().size(), UiPoint::new(20, 20));

    tree.node_mut(id).set_min_size(UiPoint::new(50, 40));
    tree.set_width(id, 10);
    tree.set_height(id, 10);
    assert_eq!(tree.node(id).area().size(), UiPoint::new(50, 40));
}

#[test]
fn unchanged_geometry_fires_no_hooks() {
    let mut tree = FrameTree::new();
    let id = tree.create_frame(100, 100);
    tree.set_position(id, UiPoint::new(30, 30));
    let log = Recorder::install(&mut tree, id);
    tree.take_syncs();

    tree.set_position(id, UiPoint::new(30, 30));
    tree.set_size(id, UiPoint::new(100, 100));
    tree.set_width(id, 100);
    tree.set_left(id, 30);
    assert!(drain(&log).is_empty());
    assert!(tree.take_syncs().is_empty());
}

#[test]
fn edge_setters_resize_against_the_opposite_edge() {
    let mut tree = FrameTree::new();
    let id = tree.create_frame(100, 80);
    tree.set_position(id, UiPoint::new(30, 20));

    tree.set_right(id, 90);
    assert_eq!(tree.node(id).position().x, 30);
    assert_eq!(tree.node(id).width(), 60);

    tree.set_bottom(id, 70);
    assert_eq!(tree.node(id).position().y, 20);
    assert_eq!(tree.node(id).height(), 50);

    // collapsing below the minimum clamps instead
    tree.set_right(id, 35);
    assert_eq!(tree.node(id).width(), 20);
}

#[test]
fn geometry_changes_queue_window_syncs() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);
    let target = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(target, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::ZERO),
    );
    tree.take_syncs();

    tree.set_width(driver, 360);
    assert_eq!(
        tree.take_syncs(),
        vec![
            GeometrySync::Resized(driver),
            GeometrySync::Moved(target),
        ]
    );
    assert!(tree.take_syncs().is_empty());
}

#[test]
fn hooks_report_driver_resize_then_driven_move() {
    let mut tree = FrameTree::new();
    let driver = tree.create_frame(300, 200);
    let target = tree.create_frame(50, 50);
    tree.add_anchor(
        driver,
        anchor(target, EdgeMask::RIGHT, EdgeMask::LEFT, UiPoint::ZERO),
    );
    let log = Recorder::install(&mut tree, driver);
    Recorder::install_shared(&mut tree, target, &log);

    tree.set_width(driver, 360);
    assert_eq!(
        drain(&log),
        vec![
            RecordedEvent::Resized(driver, 360, 200),
            RecordedEvent::Moved(target, UiPoint::new(360, 0)),
        ]
    );
}

#[test]
fn global_position_accumulates_ancestor_offsets() {
    let mut tree = FrameTree::new();
    let root = tree.create_frame(800, 600);
    let mid = tree.create_frame(400, 300);
    let leaf = tree.create_frame(50, 50);
    tree.add_child(root, mid);
    tree.add_child(mid, leaf);
    tree.set_position(root, UiPoint::new(5, 5));
    tree.set_position(mid, UiPoint::new(100, 50));
    tree.set_position(leaf, UiPoint::new(10, 20));

    assert_eq!(tree.global_position(leaf), UiPoint::new(115, 75));
    assert_eq!(tree.global_position(root), UiPoint::new(5, 5));
}
