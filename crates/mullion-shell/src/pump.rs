//! Per-tick message pump over every registered root surface.

use crate::shell::Shell;
use crate::window::WindowEvent;
use mullion_ui::FrameId;

/// Drains OS events into the shell once per tick.
///
/// A window reporting closure fires the owning frame's close hook and
/// stops this tick's sweep; the surface leaves the registry on the next
/// tick through the pending-removal list, never while the sweep is
/// iterating it.
#[derive(Default)]
pub struct MessagePump {
    pending_removal: Vec<FrameId>,
}

impl MessagePump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one tick: drops surfaces queued last tick, pumps the
    /// platform, routes each window's event batch and mirrors geometry
    /// back onto the OS windows. Returns false once no surface is left
    /// to serve, ending the host loop.
    pub fn tick(&mut self, shell: &mut Shell) -> bool {
        for frame in self.pending_removal.drain(..) {
            shell.close_surface(frame);
        }

        shell.pump_windows();

        let mut index = 0;
        while index < shell.surface_count() {
            let (frame, window) = shell.surface_entry(index);
            if window.borrow().closed() {
                log::info!("window of frame {frame} closed");
                let hook = shell.tree().hook(frame);
                if let Some(hook) = hook {
                    hook.borrow_mut().on_close(shell.tree_mut(), frame);
                }
                self.pending_removal.push(frame);
                break;
            }
            let events = window.borrow_mut().take_events();
            let saw_move = events
                .iter()
                .any(|event| matches!(event, WindowEvent::MouseMove { .. }));
            for event in events {
                shell.route_event(frame, event);
            }
            if saw_move {
                if let Some(cursor) = shell.take_cursor() {
                    window.borrow_mut().set_cursor(cursor);
                }
            }
            index += 1;
        }

        shell.drain_geometry_syncs();

        shell.surface_count() > 0 || !self.pending_removal.is_empty()
    }
}
