//! Tile map: renders a map's tile layers and maintains the sibling grid
//! collider for its solid cells.

use glam::{Affine2, IVec2, Vec2};

use crate::assets::{MapInfo, MapObject};
use crate::components::collider::{Collider, Mask};
use crate::ecs::{Component, Ctx};
use crate::math::RectI;
use crate::renderer::{Batch, Color, Subtexture};

/// Built from a [`MapInfo`] on awake: the entity moves to the map's rect,
/// a SOLID grid [`Collider`] is attached (or refilled when one already
/// exists), and the visual grid is populated from the solid and background
/// layers. Constructed with `None` when no map covers the requested
/// position — awake then reports failure and the component stays inert.
pub struct TileMapComponent {
    map: Option<MapInfo>,
    grid: Vec<Option<Subtexture>>,
    columns: i32,
    rows: i32,
    tile_size: i32,
    objects: Vec<MapObject>,
}

impl TileMapComponent {
    pub fn new(map: Option<MapInfo>) -> Self {
        Self {
            map,
            grid: Vec::new(),
            columns: 0,
            rows: 0,
            tile_size: 0,
            objects: Vec::new(),
        }
    }

    /// Spawn points from the map's object layer, in world space.
    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    /// Pixel rect the map covers in world space.
    pub fn bounds(&self) -> RectI {
        match &self.map {
            Some(map) => RectI::from_pos_size(
                map.rect.top_left(),
                IVec2::new(
                    self.columns * self.tile_size,
                    self.rows * self.tile_size,
                ),
            ),
            None => RectI::default(),
        }
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Subtexture> {
        self.grid[(x + y * self.columns) as usize].as_ref()
    }
}

impl Component for TileMapComponent {
    fn awake(&mut self, ctx: &mut Ctx) -> bool {
        let Some(map) = self.map.take() else {
            return false;
        };

        ctx.entity_mut().position = map.rect.top_left();
        self.columns = map.columns as i32;
        self.rows = map.rows as i32;
        self.tile_size = map.tile_size as i32;
        self.grid = vec![None; (self.columns * self.rows) as usize];

        // Reuse an existing grid collider, otherwise attach one.
        let collider_key = match ctx.find::<Collider>() {
            Some(key) => key,
            None => {
                ctx.add(
                    Collider::grid(self.columns, self.rows, self.tile_size)
                        .with_mask(Mask::SOLID),
                )
                .key
            }
        };
        let Some(collider) = ctx.world.get_mut::<Collider>(collider_key) else {
            self.map = Some(map);
            return false;
        };
        collider.clear();

        for j in 0..self.rows {
            for i in 0..self.columns {
                let index = (i + j * self.columns) as usize;
                let solid_id = map.solid[index];
                if solid_id != 0 {
                    collider.set_cell(i, j, true);
                    self.grid[index] = Some(map.tileset.tile_subtexture(solid_id));
                }
                if let Some(&background_id) = map.background.get(index) {
                    if background_id != 0 {
                        self.grid[index] = Some(map.tileset.tile_subtexture(background_id));
                    }
                }
            }
        }

        self.objects = map
            .objects
            .iter()
            .map(|o| MapObject {
                position: map.rect.top_left() + o.position,
                kind: o.kind.clone(),
            })
            .collect();

        log::debug!(
            "tile map `{}` built: {}x{} tiles, {} objects",
            map.name,
            self.columns,
            self.rows,
            self.objects.len()
        );
        self.map = Some(map);
        true
    }

    fn render(&mut self, ctx: &mut Ctx, batch: &mut Batch) {
        if self.map.is_none() {
            return;
        }
        let origin = ctx.position().as_vec2();
        batch.push_matrix(Affine2::from_translation(origin), false);
        for j in 0..self.rows {
            for i in 0..self.columns {
                if let Some(subtexture) = self.cell(i, j) {
                    batch.tex_sub(
                        subtexture,
                        Vec2::new(
                            (i * self.tile_size) as f32,
                            (j * self.tile_size) as f32,
                        ),
                        Color::WHITE,
                    );
                }
            }
        }
        batch.pop_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Content;
    use crate::components::collider;
    use crate::core::{Clock, Frame};
    use crate::ecs::World;
    use crate::input::Input;

    fn content() -> Content {
        Content::from_json(
            r#"{
                "atlases": [{ "name": "tiles", "width": 64, "height": 64 }],
                "maps": [{
                    "name": "start",
                    "rect": [32, 16, 48, 32],
                    "columns": 3,
                    "rows": 2,
                    "tile_size": 16,
                    "tileset": { "atlas": "tiles", "columns": 4 },
                    "solid":      [1, 0, 2, 0, 0, 3],
                    "background": [0, 4, 0, 0, 0, 0],
                    "objects": [{ "x": 8, "y": 8, "kind": "spawn" }]
                }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn awake_without_map_reports_failure() {
        let content = Content::default();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let e = world.add_entity(IVec2::ZERO);
        let added = world.add(e, TileMapComponent::new(None), &frame);
        assert!(!added.awake_ok);
        // Still attached, per the awake contract; no collider was built.
        assert!(world.get::<TileMapComponent>(added.key).is_some());
        assert!(world.find::<Collider>(e).is_none());
    }

    #[test]
    fn awake_builds_grid_collider_and_positions_entity() {
        let content = content();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let map = content.find_map_info(IVec2::new(40, 20)).cloned();
        let e = world.add_entity(IVec2::ZERO);
        let added = world.add(e, TileMapComponent::new(map), &frame);
        assert!(added.awake_ok);
        assert_eq!(world.entity(e).position, IVec2::new(32, 16));

        let collider_key = world.find::<Collider>(e).unwrap();
        let grid = world.get::<Collider>(collider_key).unwrap();
        assert!(grid.mask.intersects(Mask::SOLID));
        assert!(grid.get_cell(0, 0));
        assert!(!grid.get_cell(1, 0));
        assert!(grid.get_cell(2, 0));
        assert!(grid.get_cell(2, 1));

        let map_component = world.get::<TileMapComponent>(added.key).unwrap();
        assert_eq!(map_component.bounds(), RectI::new(32, 16, 48, 32));
        assert_eq!(map_component.objects()[0].position, IVec2::new(40, 24));
    }

    #[test]
    fn solid_cells_obstruct_rect_queries() {
        let content = content();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let map = content.find_map_info(IVec2::new(40, 20)).cloned();
        let e = world.add_entity(IVec2::ZERO);
        world.add(e, TileMapComponent::new(map), &frame);

        // A probe over the map's first solid tile (world [32,48)x[16,32)).
        let probe_entity = world.add_entity(IVec2::new(36, 20));
        let probe = world
            .add(
                probe_entity,
                Collider::rect(RectI::new(0, 0, 4, 4)),
                &frame,
            )
            .key;
        assert!(collider::check(&world, probe, Mask::SOLID, IVec2::ZERO).is_some());

        // Over the empty middle column.
        let clear_entity = world.add_entity(IVec2::new(52, 20));
        let clear = world
            .add(
                clear_entity,
                Collider::rect(RectI::new(0, 0, 4, 4)),
                &frame,
            )
            .key;
        assert_eq!(collider::check(&world, clear, Mask::SOLID, IVec2::ZERO), None);
    }

    #[test]
    fn background_layer_fills_visual_grid_only() {
        let content = content();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let map = content.find_map_info(IVec2::new(40, 20)).cloned();
        let e = world.add_entity(IVec2::ZERO);
        let key = world.add(e, TileMapComponent::new(map), &frame).key;

        let map_component = world.get::<TileMapComponent>(key).unwrap();
        // Cell (1,0) is only in the background layer: drawn, not solid.
        assert!(map_component.cell(1, 0).is_some());
        let collider_key = world.find::<Collider>(e).unwrap();
        assert!(!world.get::<Collider>(collider_key).unwrap().get_cell(1, 0));
        // Cell (1,1) is in neither layer.
        assert!(map_component.cell(1, 1).is_none());
    }

    #[test]
    fn render_emits_one_quad_per_filled_cell() {
        let content = content();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let map = content.find_map_info(IVec2::new(40, 20)).cloned();
        let e = world.add_entity(IVec2::ZERO);
        world.add(e, TileMapComponent::new(map), &frame);

        let mut batch = Batch::new();
        world.render::<TileMapComponent>(&mut batch, &frame);
        // Four filled cells (three solid + one background), two tris each.
        assert_eq!(batch.triangle_count(), 8);
        // First quad lands at the map origin.
        assert_eq!(batch.vertices()[0].position, [32.0, 16.0]);
    }
}
