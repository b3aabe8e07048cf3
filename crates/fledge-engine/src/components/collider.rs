//! Axis-aligned collision: a rectangle or a solid/empty tile grid attached
//! to an entity, queried by overlap tests and mask-filtered world scans.

use glam::{IVec2, Vec2};

use crate::ecs::{Component, ComponentId, Ctx, World};
use crate::math::RectI;
use crate::renderer::{Batch, Color};

/// Collision category bitmask. Categories are single bits; a query matches
/// when any bit is shared. `NONE` is the empty mask and never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mask(pub u32);

impl Mask {
    pub const NONE: Mask = Mask(0);
    pub const SOLID: Mask = Mask(1 << 0);
    pub const PLAYER_ATTACK: Mask = Mask(1 << 1);
    pub const COLLECTIBLE: Mask = Mask(1 << 2);
    pub const ENEMY: Mask = Mask(1 << 3);

    pub fn intersects(self, other: Mask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Mask {
    type Output = Mask;

    fn bitor(self, rhs: Mask) -> Mask {
        Mask(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Mask) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone)]
enum Shape {
    /// Rectangle in entity-local pixels.
    Rect(RectI),
    /// Row-major occupancy grid of `columns * rows` cells.
    Grid {
        columns: i32,
        rows: i32,
        tile_size: i32,
        cells: Vec<bool>,
    },
}

/// The shape kind is fixed at construction; switching shape means building
/// a new collider.
#[derive(Debug, Clone)]
pub struct Collider {
    pub mask: Mask,
    shape: Shape,
}

impl Collider {
    pub fn rect(rect: RectI) -> Self {
        Self {
            mask: Mask::NONE,
            shape: Shape::Rect(rect),
        }
    }

    pub fn grid(columns: i32, rows: i32, tile_size: i32) -> Self {
        assert!(columns > 0 && rows > 0, "grid collider needs positive dimensions");
        Self {
            mask: Mask::NONE,
            shape: Shape::Grid {
                columns,
                rows,
                tile_size,
                cells: vec![false; (columns * rows) as usize],
            },
        }
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = mask;
        self
    }

    /// Replace the local rectangle. Panics on a grid collider.
    pub fn set_rect(&mut self, rect: RectI) {
        match &mut self.shape {
            Shape::Rect(r) => *r = rect,
            Shape::Grid { .. } => panic!("set_rect on a grid collider"),
        }
    }

    /// Panics on a rect collider or out-of-bounds cell.
    pub fn set_cell(&mut self, x: i32, y: i32, value: bool) {
        match &mut self.shape {
            Shape::Grid {
                columns,
                rows,
                cells,
                ..
            } => {
                assert!(
                    x >= 0 && x < *columns && y >= 0 && y < *rows,
                    "cell ({}, {}) outside {}x{} grid",
                    x,
                    y,
                    columns,
                    rows
                );
                cells[(x + y * *columns) as usize] = value;
            }
            Shape::Rect(_) => panic!("set_cell on a rect collider"),
        }
    }

    /// Panics on a rect collider or out-of-bounds cell.
    pub fn get_cell(&self, x: i32, y: i32) -> bool {
        match &self.shape {
            Shape::Grid {
                columns,
                rows,
                cells,
                ..
            } => {
                assert!(
                    x >= 0 && x < *columns && y >= 0 && y < *rows,
                    "cell ({}, {}) outside {}x{} grid",
                    x,
                    y,
                    columns,
                    rows
                );
                cells[(x + y * *columns) as usize]
            }
            Shape::Rect(_) => panic!("get_cell on a rect collider"),
        }
    }

    /// Reset every grid cell to unoccupied. Panics on a rect collider.
    pub fn clear(&mut self) {
        match &mut self.shape {
            Shape::Grid { cells, .. } => cells.fill(false),
            Shape::Rect(_) => panic!("clear on a rect collider"),
        }
    }

    /// Pure geometric overlap with positions resolved by the caller:
    /// `self` placed at `self_pos` (any query offset already applied),
    /// `other` at `other_pos`.
    ///
    /// Rect-vs-rect is a half-open intersection. Rect-vs-grid clips the
    /// rect into the grid's tile space and reports any occupied covered
    /// cell. A grid subject is unsupported and panics rather than
    /// silently reporting a miss.
    pub fn overlaps_at(&self, self_pos: IVec2, other: &Collider, other_pos: IVec2) -> bool {
        match (&self.shape, &other.shape) {
            (Shape::Rect(a), Shape::Rect(b)) => {
                a.translated(self_pos).overlaps(&b.translated(other_pos))
            }
            (
                Shape::Rect(a),
                Shape::Grid {
                    columns,
                    rows,
                    tile_size,
                    cells,
                },
            ) => {
                // The rect in the grid's local space.
                let rect = a.translated(self_pos - other_pos);
                let tile = *tile_size as f32;
                let x_start = ((rect.left() as f32 / tile).floor() as i32).clamp(0, *columns);
                let x_end = ((rect.right() as f32 / tile).ceil() as i32).clamp(0, *columns);
                let y_start = ((rect.top() as f32 / tile).floor() as i32).clamp(0, *rows);
                let y_end = ((rect.bottom() as f32 / tile).ceil() as i32).clamp(0, *rows);

                for j in y_start..y_end {
                    for i in x_start..x_end {
                        if cells[(i + j * columns) as usize] {
                            return true;
                        }
                    }
                }
                false
            }
            (Shape::Grid { .. }, _) => {
                panic!("grid colliders are not supported as the overlap subject")
            }
        }
    }
}

impl Component for Collider {
    fn render(&mut self, ctx: &mut Ctx, batch: &mut Batch) {
        if !ctx.world.debug_colliders {
            return;
        }
        let fill = Color::new(255, 0, 0, 160);
        let pos = ctx.position();
        match &self.shape {
            Shape::Rect(r) => {
                batch.quad(
                    (pos + r.top_left()).as_vec2(),
                    r.size().as_vec2(),
                    fill,
                );
            }
            Shape::Grid {
                columns,
                rows,
                tile_size,
                cells,
            } => {
                for j in 0..*rows {
                    for i in 0..*columns {
                        if cells[(i + j * columns) as usize] {
                            batch.quad(
                                (pos + IVec2::new(i * tile_size, j * tile_size)).as_vec2(),
                                Vec2::splat(*tile_size as f32),
                                fill,
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Overlap between two collider components, with `offset` applied to `a`.
/// Stale keys report no overlap.
pub fn overlaps(world: &World, a: ComponentId, b: ComponentId, offset: IVec2) -> bool {
    let (Some(ca), Some(cb)) = (world.get::<Collider>(a), world.get::<Collider>(b)) else {
        return false;
    };
    let (Some(ma), Some(mb)) = (world.meta(a), world.meta(b)) else {
        return false;
    };
    let (Some(ea), Some(eb)) = (world.get_entity(ma.owner()), world.get_entity(mb.owner()))
    else {
        return false;
    };
    ca.overlaps_at(ea.position + offset, cb, eb.position)
}

/// Broad-phase query: the first collider in the world (registration order)
/// whose mask intersects `mask` and whose shape overlaps `own` displaced
/// by `offset`. Never returns `own` itself.
pub fn check(world: &World, own: ComponentId, mask: Mask, offset: IVec2) -> Option<ComponentId> {
    for key in world.components_of::<Collider>() {
        if key == own {
            continue;
        }
        let Some(other) = world.get::<Collider>(key) else {
            continue;
        };
        if !other.mask.intersects(mask) {
            continue;
        }
        if overlaps(world, own, key, offset) {
            return Some(key);
        }
    }
    None
}
