//! Synthetic occupancy world with a precomputed obstacle-distance field.

use std::collections::VecDeque;

use serde::Deserialize;

use crate::core::types::{LaserScan, Pose2D};
use crate::filter::ObstacleField;

/// Configuration for the synthetic world.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GridWorldConfig {
    /// World width in meters (centered on the origin).
    pub width_m: f32,
    /// World height in meters (centered on the origin).
    pub height_m: f32,
    /// Cell size in meters.
    pub resolution: f32,
    /// Distances beyond this are clamped, meters.
    pub max_dist: f32,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            width_m: 10.0,
            height_m: 10.0,
            resolution: 0.05,
            max_dist: 2.0,
        }
    }
}

/// Boolean occupancy grid plus a BFS-propagated nearest-obstacle distance
/// field, centered on the map origin.
#[derive(Debug, Clone)]
pub struct GridWorld {
    config: GridWorldConfig,
    width: usize,
    height: usize,
    origin_x: f32,
    origin_y: f32,
    occupied: Vec<bool>,
    distance: Vec<f32>,
}

impl GridWorld {
    /// Create an empty world.
    pub fn new(config: GridWorldConfig) -> Self {
        let width = (config.width_m / config.resolution).ceil() as usize;
        let height = (config.height_m / config.resolution).ceil() as usize;
        Self {
            width,
            height,
            origin_x: -config.width_m / 2.0,
            origin_y: -config.height_m / 2.0,
            occupied: vec![false; width * height],
            distance: vec![config.max_dist; width * height],
            config,
        }
    }

    /// A rectangular room: four walls just inside the world bounds, distance
    /// field ready.
    pub fn rectangle_room(config: GridWorldConfig) -> Self {
        let mut world = Self::new(config);
        let hw = config.width_m / 2.0 - config.resolution;
        let hh = config.height_m / 2.0 - config.resolution;
        world.add_wall(-hw, -hh, hw, -hh);
        world.add_wall(hw, -hh, hw, hh);
        world.add_wall(hw, hh, -hw, hh);
        world.add_wall(-hw, hh, -hw, -hh);
        world.rebuild_distance_field();
        world
    }

    /// Grid dimensions in cells.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Cell containing the world point, if inside the map.
    pub fn world_to_cell(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let cx = ((x - self.origin_x) / self.config.resolution).floor();
        let cy = ((y - self.origin_y) / self.config.resolution).floor();
        if cx >= 0.0 && cy >= 0.0 && (cx as usize) < self.width && (cy as usize) < self.height {
            Some((cx as usize, cy as usize))
        } else {
            None
        }
    }

    /// Mark the cell containing a world point as occupied.
    ///
    /// Call [`GridWorld::rebuild_distance_field`] after mutating occupancy.
    pub fn occupy(&mut self, x: f32, y: f32) {
        if let Some((cx, cy)) = self.world_to_cell(x, y) {
            self.occupied[cy * self.width + cx] = true;
        }
    }

    /// Mark every cell along a segment as occupied.
    pub fn add_wall(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let length = (dx * dx + dy * dy).sqrt();
        let steps = (length / (self.config.resolution * 0.5)).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.occupy(x0 + t * dx, y0 + t * dy);
        }
    }

    /// Recompute the distance field with a multi-source BFS from all
    /// occupied cells (8-connected).
    pub fn rebuild_distance_field(&mut self) {
        self.distance = vec![self.config.max_dist; self.width * self.height];

        let mut queue: VecDeque<(usize, usize, f32)> = VecDeque::new();
        for cy in 0..self.height {
            for cx in 0..self.width {
                if self.occupied[cy * self.width + cx] {
                    self.distance[cy * self.width + cx] = 0.0;
                    queue.push_back((cx, cy, 0.0));
                }
            }
        }

        let neighbors: [(i32, i32, f32); 8] = [
            (-1, 0, 1.0),
            (1, 0, 1.0),
            (0, -1, 1.0),
            (0, 1, 1.0),
            (-1, -1, std::f32::consts::SQRT_2),
            (1, -1, std::f32::consts::SQRT_2),
            (-1, 1, std::f32::consts::SQRT_2),
            (1, 1, std::f32::consts::SQRT_2),
        ];

        while let Some((cx, cy, dist)) = queue.pop_front() {
            if dist > self.distance[cy * self.width + cx] + 1e-3 {
                continue;
            }
            for &(dx, dy, step) in &neighbors {
                let nx = cx as i32 + dx;
                let ny = cy as i32 + dy;
                if nx < 0 || ny < 0 || nx as usize >= self.width || ny as usize >= self.height {
                    continue;
                }
                let idx = ny as usize * self.width + nx as usize;
                let new_dist = dist + step * self.config.resolution;
                if new_dist < self.distance[idx] && new_dist < self.config.max_dist {
                    self.distance[idx] = new_dist;
                    queue.push_back((nx as usize, ny as usize, new_dist));
                }
            }
        }
    }

    /// Ray-cast a full-circle scan from a ground-truth pose.
    ///
    /// Beams without a hit inside `max_range` report infinity (no return).
    pub fn cast_scan(&self, pose: &Pose2D, num_beams: usize, max_range: f32) -> LaserScan {
        let angle_min = -std::f32::consts::PI;
        let angle_increment = std::f32::consts::TAU / num_beams as f32;
        let step = self.config.resolution * 0.5;
        let range_min = self.config.resolution;

        let ranges = (0..num_beams)
            .map(|i| {
                let angle = pose.theta + angle_min + i as f32 * angle_increment;
                let (sin_a, cos_a) = angle.sin_cos();
                let mut t = range_min;
                while t <= max_range {
                    match self.world_to_cell(pose.x + t * cos_a, pose.y + t * sin_a) {
                        Some((cx, cy)) if self.occupied[cy * self.width + cx] => return t,
                        Some(_) => t += step,
                        None => break,
                    }
                }
                f32::INFINITY
            })
            .collect();

        LaserScan::new(angle_min, angle_increment, range_min, max_range, ranges)
    }
}

impl ObstacleField for GridWorld {
    fn nearest_obstacle_distance(&self, x: f32, y: f32) -> Option<f32> {
        self.world_to_cell(x, y)
            .map(|(cx, cy)| self.distance[cy * self.width + cx])
    }
}
