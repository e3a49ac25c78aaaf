use glam::DVec2;
use voxelspace_ecs::{System, SystemError, World};

use crate::{Keyboard, Mouse, MouseButton, WantsQuit, WindowProvider};

/// Polls the window once per tick and writes every [`Keyboard`], [`Mouse`]
/// and [`WantsQuit`] component from the snapshot.
pub struct InputSystem<W> {
    window: W,
}

impl<W: WindowProvider> InputSystem<W> {
    pub fn new(window: W) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }
}

impl<W: WindowProvider> System for InputSystem<W> {
    fn name(&self) -> &'static str {
        "input"
    }

    fn run(&mut self, world: &mut World) -> Result<(), SystemError> {
        self.window.poll_events();

        let movement = Keyboard::movement_from(&self.window);
        let keyboards: Vec<_> = world.view::<(Keyboard,)>().collect();
        for entity in keyboards {
            world.get_mut::<Keyboard>(entity).movement = movement;
        }

        let pointer = self.window.pointer_position();
        let (left, right, middle) = (
            self.window.is_button_pressed(MouseButton::Left),
            self.window.is_button_pressed(MouseButton::Right),
            self.window.is_button_pressed(MouseButton::Middle),
        );
        let mice: Vec<_> = world.view::<(Mouse,)>().collect();
        for entity in mice {
            let mouse = world.get_mut::<Mouse>(entity);
            match pointer {
                Some(position) => {
                    mouse.delta = position - mouse.position;
                    mouse.position = position;
                }
                None => {
                    mouse.position = DVec2::ZERO;
                    mouse.delta = DVec2::ZERO;
                }
            }
            mouse.left = left;
            mouse.right = right;
            mouse.middle = middle;
        }

        let closing = self.window.is_closing();
        let quits: Vec<_> = world.view::<(WantsQuit,)>().collect();
        for entity in quits {
            world.get_mut::<WantsQuit>(entity).0 = closing;
        }
        if closing {
            tracing::info!("window requested close");
        }
        Ok(())
    }
}
