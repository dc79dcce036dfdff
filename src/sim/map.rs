//! Static arena geometry: blocks and the playable rectangle

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{ArenaBounds, Rect};
use crate::consts::BLOCK_SIZE;

/// A static obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub collider: Rect,
    /// Stack height (render only)
    pub height: u8,
}

impl Block {
    /// Block of the standard size centered at `center`
    pub fn at(id: u32, center: Vec2, height: u8) -> Self {
        Self {
            id,
            collider: Rect::from_center(center, Vec2::splat(BLOCK_SIZE)),
            height,
        }
    }
}

/// Arena layout consumed by the collision step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaMap {
    pub bounds: ArenaBounds,
    pub blocks: Vec<Block>,
}

impl ArenaMap {
    pub fn new(bounds: ArenaBounds) -> Self {
        Self {
            bounds,
            blocks: Vec::new(),
        }
    }

    /// Add a standard block, returning its id
    pub fn add_block(&mut self, center: Vec2, height: u8) -> u32 {
        let id = self.blocks.last().map(|b| b.id + 1).unwrap_or(0);
        self.blocks.push(Block::at(id, center, height));
        id
    }

    /// Place a horizontal run of `count` blocks starting at `start`
    pub fn add_wall(&mut self, start: Vec2, count: u32, height: u8) {
        for i in 0..count {
            self.add_block(start + Vec2::new(i as f32 * BLOCK_SIZE, 0.0), height);
        }
    }

    /// Obstacle boxes in enumeration order
    pub fn obstacles(&self) -> impl Iterator<Item = &Rect> {
        self.blocks.iter().map(|b| &b.collider)
    }

    /// First block containing `point`
    pub fn block_at(&self, point: Vec2) -> Option<&Block> {
        self.blocks.iter().find(|b| b.collider.contains(point))
    }
}
