//! Tank Arena headless runner
//!
//! Plays a scripted demo mission and logs the outcome. Pass a settings JSON
//! path as the first argument to override the defaults.

use glam::{Vec2, Vec3};

use tank_arena::Settings;
use tank_arena::ai::{AiBehavior, find_behavior, find_behavior_mut};
use tank_arena::sim::{
    ArenaMap, ControllerKind, PlayerType, SimEvent, Simulation, TankId, TankStats, Team,
    nearest_enemy,
};

/// Demo length (about 30 seconds at 60 ticks per second)
const DEMO_TICKS: u32 = 1800;

struct AiPilot {
    tank: TankId,
    behaviors: Vec<AiBehavior>,
}

impl AiPilot {
    fn new(tank: TankId) -> Self {
        Self {
            tank,
            behaviors: vec![AiBehavior::new("fire"), AiBehavior::new("wander")],
        }
    }

    fn drive(&mut self, sim: &mut Simulation) -> Result<(), tank_arena::fx::AssetError> {
        for b in &mut self.behaviors {
            b.advance();
        }

        let Some(target) = nearest_enemy(sim, self.tank) else {
            sim.steer(self.tank, Vec2::ZERO);
            return Ok(());
        };
        let Some(tank) = sim.tank_mut(self.tank) else {
            return Ok(());
        };
        tank.aim_at(target);
        let to_target = target - tank.position2d();

        let wander = find_behavior(&self.behaviors, "wander").is_some_and(|b| b.is_mod_of(240));
        let input = if to_target.length() > 120.0 {
            to_target
        } else if wander {
            to_target.perp()
        } else {
            Vec2::ZERO
        };
        sim.steer(self.tank, input);

        let fire = find_behavior(&self.behaviors, "fire").is_some_and(|b| b.is_mod_of(90));
        if fire && sim.fire(self.tank)?.is_none() {
            // Try again next tick
            if let Some(b) = find_behavior_mut(&mut self.behaviors, "fire") {
                b.value -= 1;
            }
        }
        Ok(())
    }
}

fn build_map() -> ArenaMap {
    let mut map = ArenaMap::default();
    map.add_wall(Vec2::new(-120.0, 80.0), 4, 2);
    map.add_wall(Vec2::new(60.0, 180.0), 4, 1);
    map.add_block(Vec2::new(0.0, 130.0), 3);
    map
}

fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut sim = Simulation::new(settings, build_map());

    let player = sim.spawn_tank(
        ControllerKind::Player(PlayerType::Blue),
        Team::Blue,
        Vec3::new(0.0, 0.0, 0.0),
        &TankStats::player(),
    );
    let mut pilots: Vec<AiPilot> = [
        Vec3::new(-180.0, 0.0, 260.0),
        Vec3::new(0.0, 0.0, 280.0),
        Vec3::new(180.0, 0.0, 260.0),
    ]
    .into_iter()
    .map(|pos| {
        AiPilot::new(sim.spawn_tank(ControllerKind::Ai, Team::Red, pos, &TankStats::ai_default()))
    })
    .collect();

    sim.start_mission();

    for t in 0..DEMO_TICKS {
        // Player: sweep left and right, shooting at whatever is closest
        let sweep = if (t / 200) % 2 == 0 { Vec2::X } else { Vec2::NEG_X };
        sim.steer(player, sweep + Vec2::new(0.0, 0.3));
        if let Some(target) = nearest_enemy(&sim, player) {
            if let Some(tank) = sim.tank_mut(player) {
                tank.aim_at(target);
            }
            if t % 20 == 0 {
                sim.fire(player)?;
            }
        }
        if t == 300 {
            sim.lay_mine(player)?;
        }

        for pilot in &mut pilots {
            pilot.drive(&mut sim)?;
        }

        for event in sim.tick()? {
            if let SimEvent::TankDestroyed { tank } = event {
                log::info!("Tick {}: tank {} destroyed", t, tank.0);
            }
        }
        sim.render_tick();
        let played = sim.audio.drain().count();
        if played > 0 {
            log::trace!("Tick {}: {} sounds played", t, played);
        }

        let player_dead = sim.tank(player).is_none_or(|p| p.is_dead());
        let enemies_left = sim.live_tanks().filter(|t| t.team == Team::Red).count();
        if player_dead || enemies_left == 0 {
            break;
        }
    }

    sim.end_mission();
    for tank in sim.tanks() {
        log::info!("Tank {}: {}", tank.id.0, tank.general_stats());
    }
    log::info!(
        "{} footprints, {} death marks, {} particles live",
        sim.footprints.len(),
        sim.death_marks.len(),
        sim.particles.len()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Tank Arena (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    if let Err(e) = run(settings) {
        log::error!("Demo mission failed: {}", e);
        std::process::exit(1);
    }
}
