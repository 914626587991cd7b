//! Frames demo: a root window hosting an always-on-top toolbar, panels
//! anchored to the window edges and draggable, resizable cards.

use std::cell::RefCell;
use std::rc::Rc;

use mullion_graphics::{Color, UiPoint, UiRect};
use mullion_platform_winit::WinitWindowSystem;
use mullion_render_common::{DrawCommandBuffer, FontLibrary, FontProvider, NullFonts};
use mullion_render_wgpu::WgpuDeviceFactory;
use mullion_shell::{MessagePump, Shell, StaticTheme, WindowOptions};
use mullion_ui::{
    AllowedMovement, Anchor, EdgeMask, FrameHook, FrameId, FrameTree, KeyCode, Modifiers,
    PointerButton,
};

const TOOLBAR_BACKGROUND: Color = Color::rgb(0.13, 0.13, 0.16);
const BUTTON_BACKGROUND: Color = Color::rgb(0.26, 0.42, 0.69);
const CARD_HEADER: Color = Color::rgb(0.22, 0.22, 0.26);
const CARD_HEADER_ACTIVE: Color = Color::rgb(0.26, 0.42, 0.69);
const ACCENT: Color = Color::rgb(0.26, 0.42, 0.69);

/// Structural changes requested by hooks, applied by the main loop
/// between ticks.
enum DemoAction {
    SpawnCard,
    CloseCard(FrameId),
    DumpTree,
}

type ActionQueue = Rc<RefCell<Vec<DemoAction>>>;

fn install(tree: &mut FrameTree, id: FrameId, hook: impl FrameHook + 'static) {
    tree.node_mut(id).set_hook(Rc::new(RefCell::new(hook)));
}

/// Root-level key handling.
struct DemoRoot {
    actions: ActionQueue,
}

impl FrameHook for DemoRoot {
    fn on_key_down(
        &mut self,
        _tree: &mut FrameTree,
        _id: FrameId,
        key: KeyCode,
        _modifiers: Modifiers,
    ) {
        match key {
            KeyCode::N => self.actions.borrow_mut().push(DemoAction::SpawnCard),
            KeyCode::D => self.actions.borrow_mut().push(DemoAction::DumpTree),
            _ => {}
        }
    }

    fn on_close(&mut self, _tree: &mut FrameTree, _id: FrameId) {
        log::info!("root window closed");
    }
}

/// Title strip pinned over everything else.
struct Toolbar;

impl FrameHook for Toolbar {
    fn on_paint(&mut self, tree: &FrameTree, id: FrameId, cmd: &mut DrawCommandBuffer) {
        let area = tree.node(id).area();
        cmd.draw_rectangle(0, area.height - 2, area.width, 2, ACCENT);
        cmd.draw_text(12, 8, area.width - 24, 20, "mullion frames");
    }
}

/// Toolbar button that spawns a card on press.
struct SpawnButton {
    actions: ActionQueue,
}

impl FrameHook for SpawnButton {
    fn on_paint(&mut self, tree: &FrameTree, id: FrameId, cmd: &mut DrawCommandBuffer) {
        let area = tree.node(id).area();
        cmd.draw_text(10, 3, area.width - 20, 18, "+ card");
    }

    fn on_mouse_down(
        &mut self,
        _tree: &mut FrameTree,
        _id: FrameId,
        button: PointerButton,
        _position: UiPoint,
    ) {
        if button == PointerButton::Primary {
            self.actions.borrow_mut().push(DemoAction::SpawnCard);
        }
    }
}

const HINTS: [&str; 5] = [
    "drag a card to move it",
    "pull a card edge to resize",
    "double click highlights",
    "n spawns, delete closes",
    "d dumps the tree",
];

/// Static panel listing the controls.
struct HintPanel;

impl FrameHook for HintPanel {
    fn on_paint(&mut self, tree: &FrameTree, id: FrameId, cmd: &mut DrawCommandBuffer) {
        let width = tree.node(id).width();
        cmd.draw_text(12, 10, width - 24, 20, "controls");
        cmd.draw_rectangle(12, 32, width - 24, 1, CARD_HEADER_ACTIVE);
        for (line, text) in HINTS.iter().enumerate() {
            cmd.draw_text(12, 44 + line as i32 * 22, width - 24, 20, *text);
        }
    }
}

/// A draggable, resizable card.
struct Card {
    label: String,
    highlighted: bool,
    actions: ActionQueue,
}

impl FrameHook for Card {
    fn on_paint(&mut self, tree: &FrameTree, id: FrameId, cmd: &mut DrawCommandBuffer) {
        let area = tree.node(id).area();
        let header = if self.highlighted {
            CARD_HEADER_ACTIVE
        } else {
            CARD_HEADER
        };
        cmd.draw_rectangle(0, 0, area.width, 26, header);
        cmd.draw_text(10, 4, area.width - 20, 18, &self.label);
        cmd.draw_text(
            10,
            38,
            area.width - 20,
            18,
            format!("{}x{} at {},{}", area.width, area.height, area.x, area.y),
        );
    }

    fn on_mouse_double_click(
        &mut self,
        _tree: &mut FrameTree,
        id: FrameId,
        button: PointerButton,
        _position: UiPoint,
    ) {
        if button == PointerButton::Primary {
            self.highlighted = !self.highlighted;
            log::info!("card {id} highlighted: {}", self.highlighted);
        }
    }

    fn on_key_down(
        &mut self,
        _tree: &mut FrameTree,
        id: FrameId,
        key: KeyCode,
        _modifiers: Modifiers,
    ) {
        if key == KeyCode::Delete {
            self.actions.borrow_mut().push(DemoAction::CloseCard(id));
        }
    }
}

fn spawn_card(shell: &mut Shell, root: FrameId, actions: &ActionQueue, spawned: &mut i32) {
    let slot = *spawned;
    *spawned += 1;
    let origin = UiPoint::new(280 + (slot % 6) * 36, 90 + (slot % 6) * 30);
    let id = shell.create_child(root, UiRect::new(origin.x, origin.y, 260, 170));
    let tree = shell.tree_mut();
    {
        let node = tree.node_mut(id);
        node.set_can_move(AllowedMovement::All);
        node.set_can_resize(true);
        node.set_min_size(UiPoint::new(140, 90));
    }
    install(
        tree,
        id,
        Card {
            label: format!("card {}", slot + 1),
            highlighted: false,
            actions: actions.clone(),
        },
    );
    log::info!("spawned card {id}");
}

fn dump_tree(tree: &FrameTree, root: FrameId) {
    fn walk(tree: &FrameTree, id: FrameId, depth: usize) {
        let node = tree.node(id);
        log::info!(
            "{:indent$}frame {id} {:?} on-top: {}",
            "",
            node.area(),
            node.always_on_top(),
            indent = depth * 2
        );
        for &child in tree.children(id) {
            walk(tree, child, depth + 1);
        }
    }
    walk(tree, root, 0);
}

/// Looks for a usable UI font. Without one every text packet records an
/// empty glyph run and only rectangles are drawn.
fn load_fonts() -> Box<dyn FontProvider> {
    let mut candidates: Vec<String> = std::env::var("MULLION_FONT").ok().into_iter().collect();
    candidates.extend(
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "C:\\Windows\\Fonts\\segoeui.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ]
        .into_iter()
        .map(String::from),
    );
    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        match FontLibrary::from_bytes(&bytes, 15.0) {
            Ok(library) => {
                log::info!("using font {path}");
                return Box::new(library);
            }
            Err(error) => log::warn!("{path}: {error}"),
        }
    }
    log::warn!("no usable font found, text will not be drawn");
    Box::new(NullFonts::new())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== mullion frames demo ===");
    println!("Drag cards by their body, pull their edges to resize.");
    println!("Double click highlights a card.");
    println!("Keys: N spawns a card, Delete closes the pressed one, D dumps the tree.");
    println!();

    let windows = WinitWindowSystem::new().expect("event loop unavailable");
    let mut shell = Shell::new(
        windows,
        WgpuDeviceFactory::new(),
        StaticTheme::default(),
        load_fonts(),
    );

    let actions: ActionQueue = Rc::new(RefCell::new(Vec::new()));

    let root = shell
        .create_root(&WindowOptions::new("mullion frames", 960, 640))
        .expect("no usable graphics device");
    install(
        shell.tree_mut(),
        root,
        DemoRoot {
            actions: actions.clone(),
        },
    );

    let toolbar = shell.create_child(root, UiRect::new(0, 0, 960, 36));
    {
        let tree = shell.tree_mut();
        tree.set_always_on_top(toolbar, true);
        tree.node_mut(toolbar).set_background(TOOLBAR_BACKGROUND);
        tree.node_mut(toolbar).set_can_focus(false);
        install(tree, toolbar, Toolbar);
        tree.add_anchor(
            root,
            Anchor {
                target: toolbar,
                source_edges: EdgeMask::RIGHT,
                target_edges: EdgeMask::RIGHT,
                margin: UiPoint::ZERO,
            },
        );
    }

    let spawn_button = shell.create_child(toolbar, UiRect::new(160, 6, 70, 24));
    {
        let tree = shell.tree_mut();
        tree.node_mut(spawn_button).set_background(BUTTON_BACKGROUND);
        tree.node_mut(spawn_button).set_can_focus(false);
        install(
            tree,
            spawn_button,
            SpawnButton {
                actions: actions.clone(),
            },
        );
    }

    let sidebar = shell.create_child(root, UiRect::new(12, 48, 220, 580));
    {
        let tree = shell.tree_mut();
        tree.node_mut(sidebar).set_can_focus(false);
        install(tree, sidebar, HintPanel);
        tree.add_anchor(
            root,
            Anchor {
                target: sidebar,
                source_edges: EdgeMask::BOTTOM,
                target_edges: EdgeMask::BOTTOM,
                margin: UiPoint::new(0, -12),
            },
        );
    }

    let mut spawned = 0;
    spawn_card(&mut shell, root, &actions, &mut spawned);
    spawn_card(&mut shell, root, &actions, &mut spawned);

    let mut pump = MessagePump::new();
    while pump.tick(&mut shell) {
        let drained: Vec<DemoAction> = actions.borrow_mut().drain(..).collect();
        for action in drained {
            match action {
                DemoAction::SpawnCard => spawn_card(&mut shell, root, &actions, &mut spawned),
                DemoAction::CloseCard(id) => {
                    if shell.tree().contains(id) {
                        log::info!("closing card {id}");
                        shell.destroy_frame(id);
                    }
                }
                DemoAction::DumpTree => dump_tree(shell.tree(), root),
            }
        }
        shell.invalidate(root);
        shell.render();
    }
    log::info!("all windows closed, exiting");
}
