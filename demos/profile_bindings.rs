use std::cell::RefCell;
use std::rc::Rc;

use deckinput::backends::virtual_input::VirtualPlatform;
use deckinput::{BindingProfile, Command, InputManager, Scancode};

const PROFILE: &str = r#"
name = "platformer"
description = "Keyboard and pad layout"

[[bindings]]
input = { Key = 44 }
action = "jump"

[[bindings]]
input = { GamepadButton = "A" }
action = "jump"

[[bindings]]
input = { GamepadAxis = "LeftX" }
action = "move"
deadzone = 0.2

[[bindings]]
input = { Key = 41 }
action = "pause"
"#;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let profile = match BindingProfile::from_toml(PROFILE) {
        Ok(profile) => profile,
        Err(err) => {
            eprintln!("bad profile: {err}");
            return;
        }
    };

    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let mut input = InputManager::new(VirtualPlatform::new());
    if let Err(err) = input.initialize() {
        eprintln!("input init failed: {err}");
    }

    // "pause" has no command here and is skipped with a warning.
    let sink = log.clone();
    let installed = input.install_profile(&profile, move |action| -> Option<Command> {
        let sink = sink.clone();
        match action {
            "jump" => Some(Box::new(move |_: f32| sink.borrow_mut().push("jump".into()))),
            "move" => Some(Box::new(move |v: f32| sink.borrow_mut().push(format!("move {v:.2}")))),
            _ => None,
        }
    });
    println!("installed {installed} of {} bindings", profile.bindings.len());

    input.platform_mut().press_key(Scancode::SPACE);
    input.update(1.0 / 60.0);
    println!("dispatched: {:?}", log.borrow());

    match profile.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("could not serialize profile: {err}"),
    }
}
