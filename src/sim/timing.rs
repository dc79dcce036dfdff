//! Per-tank action timing
//!
//! Four independent tick counters gate movement and combat:
//! - shoot stun / mine stun: tank cannot move while either is nonzero
//! - shoot cooldown / mine cooldown: same action cannot repeat until zero

use serde::{Deserialize, Serialize};

/// Configured durations, in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionDurations {
    pub shoot_stun: u32,
    pub shoot_cooldown: u32,
    pub mine_stun: u32,
    pub mine_cooldown: u32,
}

/// Value `time_since_last_action` starts at before any action
pub const IDLE_START: u32 = 15_000;

/// Live countdown counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTimers {
    pub durations: ActionDurations,
    shoot_stun: u32,
    shoot_cooldown: u32,
    mine_stun: u32,
    mine_cooldown: u32,
    time_since_last_action: u32,
}

impl ActionTimers {
    pub fn new(durations: ActionDurations) -> Self {
        Self {
            durations,
            shoot_stun: 0,
            shoot_cooldown: 0,
            mine_stun: 0,
            mine_cooldown: 0,
            time_since_last_action: IDLE_START,
        }
    }

    /// Count every nonzero counter down by one
    pub fn tick(&mut self) {
        self.shoot_stun = self.shoot_stun.saturating_sub(1);
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        self.mine_stun = self.mine_stun.saturating_sub(1);
        self.mine_cooldown = self.mine_cooldown.saturating_sub(1);
        self.time_since_last_action = self.time_since_last_action.saturating_add(1);
    }

    pub fn is_stunned(&self) -> bool {
        self.shoot_stun > 0 || self.mine_stun > 0
    }

    pub fn can_fire(&self, owned_shells: u32, shell_limit: u32) -> bool {
        self.shoot_cooldown == 0 && owned_shells < shell_limit
    }

    pub fn can_lay_mine(&self, owned_mines: u32, mine_limit: u32) -> bool {
        self.mine_cooldown == 0 && owned_mines < mine_limit
    }

    /// Restart shoot stun and cooldown after a successful shot
    pub fn on_fire(&mut self) {
        self.shoot_stun = self.durations.shoot_stun;
        self.shoot_cooldown = self.durations.shoot_cooldown;
        self.time_since_last_action = 0;
    }

    /// Restart mine stun and cooldown after a successful mine lay
    pub fn on_mine(&mut self) {
        self.mine_stun = self.durations.mine_stun;
        self.mine_cooldown = self.durations.mine_cooldown;
        self.time_since_last_action = 0;
    }

    pub fn shoot_stun(&self) -> u32 {
        self.shoot_stun
    }

    pub fn shoot_cooldown(&self) -> u32 {
        self.shoot_cooldown
    }

    pub fn mine_stun(&self) -> u32 {
        self.mine_stun
    }

    pub fn mine_cooldown(&self) -> u32 {
        self.mine_cooldown
    }

    pub fn time_since_last_action(&self) -> u32 {
        self.time_since_last_action
    }
}
