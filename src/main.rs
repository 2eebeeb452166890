//! Wildwood headless driver
//!
//! Loads settings, walks the player along a scripted path and logs what the
//! world does around them. Usage: `wildwood [settings.json] [seconds]`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use glam::Vec2;
    use wildwood::sim::{CameraMode, WorldEvent};
    use wildwood::{Settings, TickInput, World, tick};

    const DT: f32 = 1.0 / 60.0;
    const REPORT_EVERY: u64 = 600;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Wildwood (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(Path::new(&path)),
        None => Settings::default(),
    };
    let seconds: f32 = match args.next().map(|s| s.parse()) {
        Some(Ok(s)) => s,
        Some(Err(err)) => {
            log::warn!("Ignoring bad duration: {err}");
            120.0
        }
        None => 120.0,
    };

    let mut world = World::new(settings);
    let mut chirps = 0usize;
    let mut footsteps = 0usize;
    let mut shots = 0usize;
    let mut villages_heard = 0usize;

    let frames = (seconds / DT).max(0.0) as u64;
    for frame in 0..frames {
        let t = frame as f32 * DT;
        let input = TickInput {
            movement: Vec2::new(0.0, 1.0),
            run: (t % 20.0) > 10.0,
            // Slow meander
            turn: (t * 0.05).sin() * 0.3,
            jump: (t % 3.0) < 0.1,
            fire: frame % 300 == 0,
            camera_mode: if (t % 60.0) < 30.0 {
                CameraMode::FirstPerson
            } else {
                CameraMode::ThirdPerson
            },
            equipped_item: ((t / 15.0) as u8) % 3,
            ..Default::default()
        };
        tick(&mut world, &input, DT);

        for event in world.drain_events() {
            match event {
                WorldEvent::BirdChirp { .. } => chirps += 1,
                WorldEvent::Footstep { .. } => footsteps += 1,
                WorldEvent::WeaponFire { .. } => shots += 1,
                WorldEvent::VillageAmbientStart { village, .. } => {
                    villages_heard += 1;
                    log::info!("Village in range at chunk ({}, {})", village.x, village.z);
                }
                WorldEvent::VillageAmbientStop { .. } => {}
            }
        }

        if world.frame % REPORT_EVERY == 0 {
            let stats = world.stats();
            let pos = world.player_position();
            log::info!(
                "t={:.0}s day {} ({:.2}) pos=({:.1}, {:.1}, {:.1}) chunks={} \
                 birds={} ({} flying) villagers={} ({} asleep) particles={}",
                t,
                stats.day_index,
                stats.time_of_day,
                pos.x,
                pos.y,
                pos.z,
                stats.active_chunks,
                stats.birds,
                stats.flying_birds,
                stats.villagers,
                stats.sleeping_villagers,
                stats.particles
            );
        }
    }

    log::info!(
        "Done after {} frames: {} chirps, {} footsteps, {} shots, {} villages",
        world.frame,
        chirps,
        footsteps,
        shots,
        villages_heard
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; there is nothing to run here
}
