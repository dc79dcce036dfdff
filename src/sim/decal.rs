//! Fixed-capacity decal pools
//!
//! Footprints and death marks are visual traces with no gameplay effect.
//! Both pools are bounded:
//! - footprints overwrite the oldest surviving entry once full
//! - death marks stop recording once full (nothing is evicted)

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::state::ViewContext;
use crate::consts::MAX_DEATH_MARKS;
use crate::fx::AssetHandle;

/// Tread mark left behind a moving tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Footprint {
    pub location: Vec3,
    pub rotation: f32,
    /// Wide variant laid while turning
    pub alternate: bool,
    pub model: AssetHandle,
    pub texture: AssetHandle,
    /// Placement order; lower is older
    pub sequence: u64,
    /// Render ticks survived
    pub life_time: u64,
    pub world: Mat4,
}

impl Footprint {
    fn scale(&self) -> Vec3 {
        if self.alternate {
            Vec3::new(0.5, 1.0, 0.35)
        } else {
            Vec3::new(0.5, 1.0, 0.075)
        }
    }

    fn compute_world(&self) -> Mat4 {
        Mat4::from_translation(self.location)
            * Mat4::from_rotation_y(self.rotation)
            * Mat4::from_scale(self.scale())
    }
}

/// Footprint store with oldest-first eviction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintPool {
    slots: Vec<Footprint>,
    capacity: usize,
    /// Slot holding the oldest entry once the pool is full
    cursor: usize,
    placed_total: u64,
    /// Camera from the last render tick
    view: ViewContext,
}

impl FootprintPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.min(4096)),
            capacity,
            cursor: 0,
            placed_total: 0,
            view: ViewContext::default(),
        }
    }

    /// Record a footprint, returning its slot. `None` only for a zero-capacity pool.
    pub fn create(
        &mut self,
        location: Vec3,
        rotation: f32,
        alternate: bool,
        model: AssetHandle,
        texture: AssetHandle,
    ) -> Option<usize> {
        if self.capacity == 0 {
            return None;
        }

        let mut footprint = Footprint {
            location,
            rotation,
            alternate,
            model,
            texture,
            sequence: self.placed_total,
            life_time: 0,
            world: Mat4::IDENTITY,
        };
        footprint.world = footprint.compute_world();
        self.placed_total += 1;

        if self.slots.len() < self.capacity {
            self.slots.push(footprint);
            return Some(self.slots.len() - 1);
        }

        // Slots fill in placement order and are overwritten in the same
        // order, so the cursor always points at the lowest sequence.
        let slot = self.cursor;
        log::trace!(
            "Footprint pool full, evicting sequence {}",
            self.slots[slot].sequence
        );
        self.slots[slot] = footprint;
        self.cursor = (self.cursor + 1) % self.capacity;
        Some(slot)
    }

    /// Render tick: age every footprint and refresh its transform
    pub fn advance(&mut self, view: &ViewContext) {
        self.view = *view;
        for footprint in &mut self.slots {
            footprint.life_time += 1;
            footprint.world = footprint.compute_world();
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Footprint> {
        self.slots.get(slot)
    }

    /// Clip-space transform of a footprint under the last render tick's camera
    pub fn clip_transform(&self, slot: usize) -> Option<Mat4> {
        self.slots
            .get(slot)
            .map(|f| self.view.projection * self.view.view * f.world)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Footprint> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Footprints placed since the last clear, evicted ones included
    pub fn placed_total(&self) -> u64 {
        self.placed_total
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
        self.placed_total = 0;
    }
}

/// Death mark tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckColor {
    Blue,
    Red,
    White,
}

impl CheckColor {
    pub fn texture_name(&self) -> &'static str {
        use crate::fx::names::*;
        match self {
            CheckColor::Blue => CHECK_BLUE_TEXTURE,
            CheckColor::Red => CHECK_RED_TEXTURE,
            CheckColor::White => CHECK_WHITE_TEXTURE,
        }
    }
}

/// Cross left where a tank was destroyed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathMark {
    pub location: Vec3,
    pub color: CheckColor,
    pub model: AssetHandle,
    pub texture: AssetHandle,
    pub world: Mat4,
}

impl DeathMark {
    fn compute_world(&self) -> Mat4 {
        Mat4::from_translation(self.location) * Mat4::from_scale(Vec3::splat(0.7))
    }
}

/// Append-only death mark store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathMarkPool {
    marks: Vec<DeathMark>,
    capacity: usize,
    dropped: u64,
    view: ViewContext,
}

impl Default for DeathMarkPool {
    fn default() -> Self {
        Self::new()
    }
}

impl DeathMarkPool {
    pub fn new() -> Self {
        Self::with_capacity(MAX_DEATH_MARKS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            marks: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
            view: ViewContext::default(),
        }
    }

    /// Record a mark, or drop it silently once the pool is full
    pub fn create(
        &mut self,
        location: Vec3,
        color: CheckColor,
        model: AssetHandle,
        texture: AssetHandle,
    ) -> Option<usize> {
        if self.marks.len() >= self.capacity {
            self.dropped += 1;
            log::debug!("Death mark pool full ({}), dropping mark", self.capacity);
            return None;
        }
        let mut mark = DeathMark {
            location,
            color,
            model,
            texture,
            world: Mat4::IDENTITY,
        };
        mark.world = mark.compute_world();
        self.marks.push(mark);
        Some(self.marks.len() - 1)
    }

    /// Render tick: refresh transforms
    pub fn advance(&mut self, view: &ViewContext) {
        self.view = *view;
        for mark in &mut self.marks {
            mark.world = mark.compute_world();
        }
    }

    pub fn get(&self, slot: usize) -> Option<&DeathMark> {
        self.marks.get(slot)
    }

    /// Clip-space transform of a mark under the last render tick's camera
    pub fn clip_transform(&self, slot: usize) -> Option<Mat4> {
        self.marks
            .get(slot)
            .map(|m| self.view.projection * self.view.view * m.world)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeathMark> {
        self.marks.iter()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Marks refused because the pool was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.marks.clear();
        self.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: AssetHandle = AssetHandle(1);
    const TEX: AssetHandle = AssetHandle(2);

    fn place(pool: &mut FootprintPool, x: f32) -> Option<usize> {
        pool.create(Vec3::new(x, 0.1, 0.0), 0.0, false, MODEL, TEX)
    }

    #[test]
    fn test_footprints_append_until_full() {
        let mut pool = FootprintPool::new(3);
        assert_eq!(place(&mut pool, 0.0), Some(0));
        assert_eq!(place(&mut pool, 1.0), Some(1));
        assert_eq!(place(&mut pool, 2.0), Some(2));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_full_footprint_pool_evicts_oldest() {
        let mut pool = FootprintPool::new(3);
        for x in 0..3 {
            place(&mut pool, x as f32);
        }
        pool.advance(&ViewContext::default());

        assert_eq!(place(&mut pool, 10.0), Some(0));
        assert_eq!(pool.len(), 3);
        assert!(pool.iter().all(|f| f.location.x != 0.0));

        // Next eviction takes the next-oldest
        assert_eq!(place(&mut pool, 11.0), Some(1));
        assert!(pool.iter().all(|f| f.location.x != 1.0));
        let min_seq = pool.iter().map(|f| f.sequence).min().unwrap();
        assert_eq!(pool.get(2).unwrap().sequence, min_seq);
    }

    #[test]
    fn test_eviction_wraps_around() {
        let mut pool = FootprintPool::new(2);
        for x in 0..7 {
            place(&mut pool, x as f32);
        }
        let mut xs: Vec<f32> = pool.iter().map(|f| f.location.x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![5.0, 6.0]);
        assert_eq!(pool.placed_total(), 7);
    }

    #[test]
    fn test_zero_capacity_footprint_pool() {
        let mut pool = FootprintPool::new(0);
        assert_eq!(place(&mut pool, 0.0), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_advance_ages_footprints() {
        let mut pool = FootprintPool::new(4);
        place(&mut pool, 0.0);
        pool.advance(&ViewContext::default());
        pool.advance(&ViewContext::default());
        place(&mut pool, 1.0);
        pool.advance(&ViewContext::default());
        assert_eq!(pool.get(0).unwrap().life_time, 3);
        assert_eq!(pool.get(1).unwrap().life_time, 1);
    }

    #[test]
    fn test_footprint_transform() {
        let mut pool = FootprintPool::new(1);
        pool.create(Vec3::new(4.0, 0.1, -2.0), 0.0, true, MODEL, TEX);
        let fp = pool.get(0).unwrap();
        let origin = fp.world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(4.0, 0.1, -2.0)).length() < 1e-5);
        let edge = fp.world.transform_point3(Vec3::new(0.0, 0.0, 1.0));
        assert!((edge.z - (-2.0 + 0.35)).abs() < 1e-5);
    }

    #[test]
    fn test_clip_transform_uses_last_view() {
        let mut pool = FootprintPool::new(2);
        place(&mut pool, 3.0);
        let view = ViewContext {
            view: Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
            projection: Mat4::from_scale(Vec3::splat(2.0)),
        };
        pool.advance(&view);
        let clip = pool.clip_transform(0).unwrap().transform_point3(Vec3::ZERO);
        assert!((clip - Vec3::new(6.0, 0.2, -10.0)).length() < 1e-5);
        assert!(pool.clip_transform(1).is_none());

        let mut marks = DeathMarkPool::with_capacity(1);
        marks.create(Vec3::new(1.0, 0.1, 1.0), CheckColor::Blue, MODEL, TEX);
        marks.advance(&view);
        let clip = marks.clip_transform(0).unwrap().transform_point3(Vec3::ZERO);
        assert!((clip - Vec3::new(2.0, 0.2, -8.0)).length() < 1e-5);
    }

    #[test]
    fn test_death_marks_drop_when_full() {
        let mut pool = DeathMarkPool::with_capacity(2);
        assert_eq!(pool.create(Vec3::ZERO, CheckColor::White, MODEL, TEX), Some(0));
        assert_eq!(pool.create(Vec3::X, CheckColor::Blue, MODEL, TEX), Some(1));
        assert_eq!(pool.create(Vec3::Y, CheckColor::Red, MODEL, TEX), None);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.dropped(), 1);
        assert!(pool.iter().all(|m| m.color != CheckColor::Red));
        assert_eq!(pool.get(0).unwrap().location, Vec3::ZERO);
    }

    #[test]
    fn test_default_death_mark_capacity() {
        let mut pool = DeathMarkPool::new();
        for i in 0..=MAX_DEATH_MARKS {
            pool.create(Vec3::new(i as f32, 0.0, 0.0), CheckColor::White, MODEL, TEX);
        }
        assert_eq!(pool.len(), MAX_DEATH_MARKS);
        assert!(pool.iter().all(|m| m.location.x != MAX_DEATH_MARKS as f32));
    }

    #[test]
    fn test_clear_resets_pools() {
        let mut fp = FootprintPool::new(1);
        place(&mut fp, 0.0);
        place(&mut fp, 1.0);
        fp.clear();
        assert!(fp.is_empty());
        assert_eq!(place(&mut fp, 2.0), Some(0));

        let mut marks = DeathMarkPool::with_capacity(1);
        marks.create(Vec3::ZERO, CheckColor::White, MODEL, TEX);
        marks.create(Vec3::ZERO, CheckColor::White, MODEL, TEX);
        marks.clear();
        assert_eq!(marks.dropped(), 0);
        assert!(marks.create(Vec3::ZERO, CheckColor::White, MODEL, TEX).is_some());
    }
}
