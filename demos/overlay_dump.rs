//! Prints the overlay for a sample profile.
//!
//! Usage: `cargo run --example overlay_dump -- [registry.json] [style.toml]`
//! Without a registry the built-in composite rules still split the SEM device.

use std::path::Path;
use stickplate::layout::DrawInstruction;
use stickplate::{
    compose, logger, ActionBinding, ActionMap, Device, DeviceResolver, LabelOverrideStore,
    LayoutStyle, OverlayEngine, Profile, Surface, SurfaceField, TemplateRegistry,
};

fn main() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    logger::init(&level).expect("init logging");

    let mut args = std::env::args().skip(1);
    let registry = match args.next() {
        Some(path) => TemplateRegistry::load_or_empty(Path::new(&path)).expect("valid registry"),
        None => TemplateRegistry::default(),
    };
    let mut style = args
        .next()
        .map(|path| LayoutStyle::load_or_default(Path::new(&path)))
        .unwrap_or_default();
    style.table.enabled = true;
    style.background.enabled = true;
    let engine = OverlayEngine::new(style);

    let profile = Profile::new(
        "demo",
        vec![Device::joystick(1, "VKBsim Gladiator EVO R SEM")],
        vec![ActionMap {
            name: "spaceship_weapons".into(),
            actions: vec![
                ActionBinding::new("v_attack1", "js1_button1"),
                ActionBinding::new("v_attack1_group2", "js1_button1"),
                ActionBinding::new("v_weapon_cycle_missile_fwd", "js1_button3"),
                ActionBinding::new("v_strafe_up", "js1_hat1_up"),
                ActionBinding::new("v_ifcs_toggle_esp", "js1_button42"),
                ActionBinding::new("v_toggle_mining_mode", "js1_button44"),
                ActionBinding::new("v_yaw", "js1_x"),
            ],
        }],
    );
    let store = LabelOverrideStore::default();
    let fields = [
        SurfaceField::new("js1_button1", 200.0, 120.0).sized(120.0, 16.0),
        SurfaceField::new("Hat1 up", 260.0, 80.0),
    ];
    let surface = Surface {
        width: 1024.0,
        height: 768.0,
    };

    for device in profile.joysticks() {
        for component in DeviceResolver::new(&registry).resolve(device) {
            let overlay = compose(&component, &profile, &store, &fields, surface, &engine);
            println!("== {} ==", overlay.component_name);
            for instruction in &overlay.layout.instructions {
                match instruction {
                    DrawInstruction::Text(t) => println!(
                        "text  ({:.1}, {:.1}) size={:.1} {:?}",
                        t.x, t.y, t.font_size, t.lines
                    ),
                    DrawInstruction::Rect(r) => {
                        println!("rect  ({:.1}, {:.1}) {:.1}x{:.1}", r.x, r.y, r.width, r.height)
                    }
                    DrawInstruction::Line(l) => {
                        println!("line  ({:.1}, {:.1}) -> ({:.1}, {:.1})", l.x1, l.y1, l.x2, l.y2)
                    }
                    DrawInstruction::Table(table) => {
                        println!(
                            "table ({:.1}, {:.1}) {:.1}x{:.1}",
                            table.x, table.y, table.width, table.height
                        );
                        for row in &table.rows {
                            println!("      {:<12} {}", row.input, row.action.text());
                        }
                    }
                }
            }
            if !overlay.unresolved_fields.is_empty() {
                println!("unresolved: {:?}", overlay.unresolved_fields);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&overlay.layout.unplaced).expect("serialize entries")
            );
        }
    }
}
