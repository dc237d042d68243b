//! Статическая геометрия уровней + hazards
//!
//! Все блоки — axis-aligned boxes (center + half extents), так что одна и та же
//! раскладка грузится и в sandbox world, и в Rapier (`Collider::cuboid`).

use bevy::prelude::*;

use super::Hazard;

pub const ROOM_WIDTH: f32 = 100.0;
pub const ROOM_HEIGHT: f32 = 100.0;
pub const ROOM_DEPTH: f32 = 150.0;
pub const PLATFORM_DEPTH: f32 = 10.0;

/// Второй уровень сдвинут по X, чтобы обе комнаты жили в одном world
pub const LEVEL2_X_OFFSET: f32 = ROOM_WIDTH + 100.0;

const HOLE_SPACE: f32 = 2.0;
const HOLE_WALL_Z: f32 = ROOM_DEPTH / 2.0 - 110.0;
const DOOR_HALF_EXTENTS: Vec3 = Vec3::new(1.25, 2.5, 0.15);

pub const LEVEL1_START: Vec3 = Vec3::new(0.0, 6.0, ROOM_DEPTH / 2.0 - 2.0);
/// Чекпоинт на четвёртой платформе (перед стеной с дырой)
pub const LEVEL1_CHECKPOINT: Vec3 = Vec3::new(0.0, 51.0, ROOM_DEPTH / 2.0 - 90.0);
pub const LEVEL2_START: Vec3 = Vec3::new(LEVEL2_X_OFFSET, 6.0, ROOM_DEPTH / 2.0 - 2.0);

#[derive(Debug, Clone, PartialEq)]
pub struct StaticBlock {
    pub label: &'static str,
    pub center: Vec3,
    pub half_extents: Vec3,
    pub hazard: Option<Hazard>,
}

impl StaticBlock {
    fn solid(label: &'static str, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            label,
            center,
            half_extents,
            hazard: None,
        }
    }

    fn hazard(label: &'static str, center: Vec3, half_extents: Vec3, hazard: Hazard) -> Self {
        Self {
            label,
            center,
            half_extents,
            hazard: Some(hazard),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub id: u32,
    pub name: &'static str,
    pub start: Vec3,
    pub blocks: Vec<StaticBlock>,
}

impl LevelLayout {
    pub fn hazards(&self) -> impl Iterator<Item = &StaticBlock> {
        self.blocks.iter().filter(|block| block.hazard.is_some())
    }
}

/// Раскладка по номеру уровня
pub fn layout(id: u32) -> Option<LevelLayout> {
    match id {
        1 => Some(level1()),
        2 => Some(level2()),
        _ => None,
    }
}

/// Все уровни (грузятся в world сразу, переход — телепорт)
pub fn all() -> Vec<LevelLayout> {
    vec![level1(), level2()]
}

/// Стены + пол комнаты; пол — hazard, который возвращает на `start`
fn room(x_offset: f32, start: Vec3) -> Vec<StaticBlock> {
    let half_w = ROOM_WIDTH / 2.0;
    let half_h = ROOM_HEIGHT / 2.0;
    let half_d = ROOM_DEPTH / 2.0;

    vec![
        StaticBlock::hazard(
            "floor",
            Vec3::new(x_offset, -1.0, 0.0),
            Vec3::new(half_w, 1.0, half_d),
            Hazard::floor(start),
        ),
        StaticBlock::solid(
            "right_wall",
            Vec3::new(x_offset + half_w + 1.0, half_h, 0.0),
            Vec3::new(1.0, half_h, half_d),
        ),
        StaticBlock::solid(
            "left_wall",
            Vec3::new(x_offset - half_w - 1.0, half_h, 0.0),
            Vec3::new(1.0, half_h, half_d),
        ),
        StaticBlock::solid(
            "front_wall",
            Vec3::new(x_offset, half_h, -half_d - 1.0),
            Vec3::new(half_w, half_h, 1.0),
        ),
        StaticBlock::solid(
            "back_wall",
            Vec3::new(x_offset, half_h, half_d + 1.0),
            Vec3::new(half_w, half_h, 1.0),
        ),
    ]
}

pub fn level1() -> LevelLayout {
    let half_w = ROOM_WIDTH / 2.0;
    let half_h = ROOM_HEIGHT / 2.0;
    let half_d = ROOM_DEPTH / 2.0;
    let half_pd = PLATFORM_DEPTH / 2.0;

    let mut blocks = room(0.0, LEVEL1_START);

    blocks.extend([
        StaticBlock::solid(
            "first_platform",
            Vec3::new(0.0, 0.0, half_d - half_pd),
            Vec3::new(half_w, 5.0, half_pd),
        ),
        StaticBlock::solid(
            "second_platform",
            Vec3::new(0.0, 0.0, half_d - 25.0),
            Vec3::new(half_w, 5.0, half_pd),
        ),
        StaticBlock::solid(
            "third_platform",
            Vec3::new(0.0, 5.0, half_d - 45.0),
            Vec3::new(half_w, 10.0, half_pd),
        ),
        StaticBlock::solid("small_platform_1", Vec3::new(10.0, 25.0, half_d - 60.0), Vec3::new(3.0, 1.0, 3.0)),
        StaticBlock::solid("small_platform_2", Vec3::new(-10.0, 30.0, half_d - 65.0), Vec3::new(3.0, 1.0, 3.0)),
        StaticBlock::solid("small_platform_3", Vec3::new(0.0, 40.0, half_d - 70.0), Vec3::new(1.5, 0.5, 1.5)),
        StaticBlock::solid(
            "fourth_platform",
            Vec3::new(0.0, 25.0, half_d - 90.0),
            Vec3::new(half_w, 25.0, half_pd),
        ),
    ]);

    // Стена с дырой HOLE_SPACE × 2 вокруг (0, 50): любое касание → чекпоинт
    let band = (half_h - HOLE_SPACE) / 2.0;
    let side = half_w - HOLE_SPACE;
    blocks.extend([
        StaticBlock::hazard(
            "hole_wall_top",
            Vec3::new(0.0, half_h + band + HOLE_SPACE, HOLE_WALL_Z),
            Vec3::new(half_w, band, 0.5),
            Hazard::checkpoint(LEVEL1_CHECKPOINT),
        ),
        StaticBlock::hazard(
            "hole_wall_bottom",
            Vec3::new(0.0, half_h - band - HOLE_SPACE, HOLE_WALL_Z),
            Vec3::new(half_w, band, 0.5),
            Hazard::checkpoint(LEVEL1_CHECKPOINT),
        ),
        StaticBlock::hazard(
            "hole_wall_left",
            Vec3::new(-half_w + side / 2.0, half_h, HOLE_WALL_Z),
            Vec3::new(side / 2.0, half_h, 0.495),
            Hazard::checkpoint(LEVEL1_CHECKPOINT),
        ),
        StaticBlock::hazard(
            "hole_wall_right",
            Vec3::new(half_w - side / 2.0, half_h, HOLE_WALL_Z),
            Vec3::new(side / 2.0, half_h, 0.495),
            Hazard::checkpoint(LEVEL1_CHECKPOINT),
        ),
        StaticBlock::solid(
            "last_platform",
            Vec3::new(0.0, 5.0, -half_d + half_pd),
            Vec3::new(half_w, 5.0, half_pd),
        ),
        StaticBlock::hazard(
            "door",
            Vec3::new(0.0, 10.0 + DOOR_HALF_EXTENTS.y, -half_d + DOOR_HALF_EXTENTS.z),
            DOOR_HALF_EXTENTS,
            Hazard::level_exit(2, LEVEL2_START),
        ),
    ]);

    LevelLayout {
        id: 1,
        name: "Level 1",
        start: LEVEL1_START,
        blocks,
    }
}

pub fn level2() -> LevelLayout {
    let half_d = ROOM_DEPTH / 2.0;
    let half_pd = PLATFORM_DEPTH / 2.0;

    let mut blocks = room(LEVEL2_X_OFFSET, LEVEL2_START);
    blocks.push(StaticBlock::solid(
        "start_platform",
        Vec3::new(LEVEL2_X_OFFSET, 0.0, half_d - half_pd),
        Vec3::new(ROOM_WIDTH / 2.0, 5.0, half_pd),
    ));

    LevelLayout {
        id: 2,
        name: "Level 2",
        start: LEVEL2_START,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::HazardKind;

    fn block<'a>(level: &'a LevelLayout, label: &str) -> &'a StaticBlock {
        level
            .blocks
            .iter()
            .find(|b| b.label == label)
            .unwrap_or_else(|| panic!("no block {}", label))
    }

    #[test]
    fn test_start_rests_on_first_platform() {
        let level = level1();
        let platform = block(&level, "first_platform");
        let top = platform.center.y + platform.half_extents.y;

        // Игрок высотой 2 × 1.0 стоит ровно на платформе
        assert_eq!(level.start.y - 1.0, top);
        assert!((level.start.z - platform.center.z).abs() <= platform.half_extents.z);
    }

    #[test]
    fn test_hole_leaves_gap_around_center() {
        let level = level1();
        let top = block(&level, "hole_wall_top");
        let bottom = block(&level, "hole_wall_bottom");
        let left = block(&level, "hole_wall_left");
        let right = block(&level, "hole_wall_right");

        assert_eq!(top.center.y - top.half_extents.y, 52.0);
        assert_eq!(bottom.center.y + bottom.half_extents.y, 48.0);
        assert_eq!(left.center.x + left.half_extents.x, -2.0);
        assert_eq!(right.center.x - right.half_extents.x, 2.0);
    }

    #[test]
    fn test_level1_hazards() {
        let level = level1();
        let kinds: Vec<HazardKind> = level.hazards().filter_map(|b| b.hazard).map(|h| h.kind).collect();

        assert_eq!(kinds.iter().filter(|k| **k == HazardKind::Floor).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == HazardKind::Checkpoint).count(), 4);
        assert!(kinds.contains(&HazardKind::LevelExit { next_level: 2 }));

        let door = block(&level, "door").hazard.unwrap();
        assert_eq!(door.respawn_at, LEVEL2_START);
    }

    #[test]
    fn test_layout_lookup() {
        assert_eq!(layout(2).map(|l| l.start), Some(LEVEL2_START));
        assert!(layout(3).is_none());
        assert_eq!(all().len(), 2);
    }
}
