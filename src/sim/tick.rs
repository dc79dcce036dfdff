//! Fixed timestep simulation tick
//!
//! One tick updates every live tank in id order, then shells, then mines.
//! Rendering state advances separately in `Simulation::render_tick`.

use glam::{Vec2, Vec3};

use super::collision::Rect;
use super::shell::{MineId, ShellId, ShellStep};
use super::state::{SimEvent, Simulation};
use super::tank::{TankId, UpdateContext};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::fx::{AssetError, Color, Effects, Particle, ParticleBehavior, names};

impl Simulation {
    /// Advance the simulation by one tick
    pub fn tick(&mut self) -> Result<Vec<SimEvent>, AssetError> {
        let mut events = Vec::new();

        self.update_tanks()?;
        self.update_shells(&mut events)?;
        self.update_mines(&mut events)?;

        self.time_ticks += 1;
        Ok(events)
    }

    fn update_tanks(&mut self) -> Result<(), AssetError> {
        let interval = self.settings.footprint_interval;
        for i in 0..self.tanks.len() {
            if self.tanks[i].is_dead() {
                continue;
            }

            // Peers at their current positions, including moves made earlier this tick
            let peers: Vec<Rect> = self
                .tanks
                .iter()
                .enumerate()
                .filter(|(j, t)| *j != i && !t.is_dead())
                .map(|(_, t)| t.collision_box())
                .collect();

            let mut fx = Effects::new(&self.assets, &mut self.audio, &mut self.particles);
            let mut ctx = UpdateContext {
                view: &self.view,
                peers: &peers,
                map: &self.map,
                footprints: &mut self.footprints,
                fx: &mut fx,
                footprint_interval: interval,
            };
            self.tanks[i].update(&mut ctx)?;
        }
        Ok(())
    }

    fn update_shells(&mut self, events: &mut Vec<SimEvent>) -> Result<(), AssetError> {
        let mut expired: Vec<ShellId> = Vec::new();
        let mut hits: Vec<(ShellId, TankId)> = Vec::new();
        let mut bounces = 0usize;

        for shell in &mut self.shells {
            if shell.homing.is_active(shell.age) {
                let origin = shell.position2d();
                let target = self
                    .tanks
                    .iter()
                    .filter(|t| !t.is_dead() && t.id != shell.owner)
                    .map(|t| t.position2d())
                    .filter(|p| p.distance(origin) <= shell.homing.radius)
                    .min_by(|a, b| {
                        a.distance(origin)
                            .partial_cmp(&b.distance(origin))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                if let Some(target) = target {
                    shell.steer_toward(target);
                }
            }

            match shell.advance(&self.map) {
                ShellStep::Expired => {
                    expired.push(shell.id);
                    continue;
                }
                ShellStep::Ricocheted => {
                    bounces += 1;
                    log::trace!("Shell {} ricocheted, {} left", shell.id.0, shell.ricochets);
                }
                ShellStep::Flying => {}
            }

            let point = shell.position2d();
            let victim = self.tanks.iter().find(|t| {
                !t.is_dead()
                    && t.collision_box().contains(point)
                    && !(t.id == shell.owner && shell.age <= SHELL_OWNER_GRACE_TICKS)
            });
            if let Some(victim) = victim {
                hits.push((shell.id, victim.id));
            }
        }

        // Every wall or block hit plays the ricochet, including the final one
        if bounces > 0 || !expired.is_empty() {
            let sound = self.fx().sound(SoundEffect::Ricochet)?;
            for _ in 0..bounces {
                self.fx().play(SoundEffect::Ricochet, sound);
            }
            for id in expired {
                self.destroy_shell(id);
                self.fx().play(SoundEffect::Ricochet, sound);
                events.push(SimEvent::ShellExpired { shell: id });
            }
        }

        for (shell, tank) in hits {
            self.destroy_shell(shell);
            events.push(SimEvent::ShellHit { shell, tank });
            if self.destroy_tank(tank)? {
                events.push(SimEvent::TankDestroyed { tank });
            }
        }
        Ok(())
    }

    fn update_mines(&mut self, events: &mut Vec<SimEvent>) -> Result<(), AssetError> {
        let detonated: Vec<MineId> = self
            .mines
            .iter_mut()
            .filter_map(|mine| mine.tick().then_some(mine.id))
            .collect();

        for id in detonated {
            self.detonate_mine(id, events)?;
        }
        Ok(())
    }

    /// Blow a mine up, taking out tanks and shells within range
    pub fn detonate_mine(&mut self, id: MineId, events: &mut Vec<SimEvent>) -> Result<bool, AssetError> {
        let Some(mine) = self.mines.iter().find(|m| m.id == id).cloned() else {
            return Ok(false);
        };

        let fx = self.fx();
        let sound = fx.sound(SoundEffect::MineExplode)?;
        let flash = fx.texture(names::HIT_TEXTURE)?;

        self.remove_mine(id);
        let mut fx = self.fx();
        fx.play(SoundEffect::MineExplode, sound);
        fx.spawn(
            Particle::new(mine.position + Vec3::new(0.0, DECAL_LIFT, 0.0), flash)
                .with_scale(MINE_BLAST_RADIUS / 10.0)
                .with_color(Color::ORANGE),
            ParticleBehavior::Shockwave,
        );
        events.push(SimEvent::MineDetonated { mine: id });
        log::debug!("Mine {} detonated at {}", id.0, crate::flatten(mine.position));

        let caught: Vec<TankId> = self
            .live_tanks()
            .filter(|t| mine.in_blast(t.position2d()))
            .map(|t| t.id)
            .collect();
        for tank in caught {
            if self.destroy_tank(tank)? {
                events.push(SimEvent::TankDestroyed { tank });
            }
        }

        let shells: Vec<ShellId> = self
            .shells
            .iter()
            .filter(|s| mine.in_blast(s.position2d()))
            .map(|s| s.id)
            .collect();
        for shell in shells {
            self.destroy_shell(shell);
        }
        Ok(true)
    }
}

/// Closest live enemy of `owner`, for AI aiming
pub fn nearest_enemy(sim: &Simulation, owner: TankId) -> Option<Vec2> {
    let me = sim.tank(owner)?;
    let origin = me.position2d();
    sim.live_tanks()
        .filter(|t| t.id != owner && t.team != me.team)
        .map(|t| t.position2d())
        .min_by(|a, b| {
            a.distance(origin)
                .partial_cmp(&b.distance(origin))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
