use std::cell::Cell;
use std::rc::Rc;

use deckinput::backends::virtual_input::VirtualPlatform;
use deckinput::logger::Logger;
use deckinput::{EventFilter, GamepadAxis, GamepadButton, InputManager, Scancode};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut input = InputManager::new(VirtualPlatform::new());
    if let Err(err) = input.initialize() {
        eprintln!("input init failed: {err}");
    }
    input
        .event_bus_mut()
        .add_listener(Logger::new(), EventFilter::All);

    // Player state driven by bound commands
    let x = Rc::new(Cell::new(0.0_f32));
    let jumps = Rc::new(Cell::new(0_u32));

    let px = x.clone();
    input.bind_key_command(Scancode::D, move |dt| px.set(px.get() + 100.0 * dt));
    let px = x.clone();
    input.bind_gamepad_axis_command(GamepadAxis::LeftX, 0.15, move |v| px.set(px.get() + v));
    let j = jumps.clone();
    input.bind_gamepad_button_command(GamepadButton::A, move |_| j.set(j.get() + 1));

    let dt = 1.0 / 60.0;
    for frame in 0..6 {
        let platform = input.platform_mut();
        match frame {
            0 => platform.press_key(Scancode::D),
            2 => {
                platform.release_key(Scancode::D);
                let pad = platform.connect_gamepad("Handheld Controls");
                platform.set_axis(pad, GamepadAxis::LeftX, 20000);
                platform.press_button(pad, GamepadButton::A);
            }
            4 => platform.feed(deckinput::PlatformEvent::WindowResized {
                width: 1280,
                height: 800,
            }),
            _ => {}
        }

        let forwarded = input.update(dt);
        println!(
            "frame {frame}: x={:.3} jumps={} active={} pad={} forwarded={:?}",
            x.get(),
            jumps.get(),
            input.active_input_method(),
            input
                .gamepad_info()
                .map(|meta| meta.to_string())
                .unwrap_or_else(|| "none".into()),
            forwarded
        );
    }

    input.shutdown();
}
