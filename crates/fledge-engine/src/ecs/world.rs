//! The owning arena for all entities and components, and the per-frame
//! update/render driver.
//!
//! Every cross-reference in the engine is a generational key into the
//! world's slot maps: stale keys resolve to `None` instead of dangling.
//! Component hooks run under a checkout discipline — the component's box
//! is moved out of its slot, the hook gets `&mut World`, and the box is
//! returned afterwards (or dropped, when the hook removed its own slot).
//! Structural mutation from inside hooks is therefore safe by
//! construction, and per-type iteration works on a bucket snapshot taken
//! at bucket start, so membership changes only affect the next pass.

use glam::IVec2;
use slotmap::SlotMap;

use crate::core::Frame;
use crate::ecs::component::Component;
use crate::ecs::entity::Entity;
use crate::ecs::registry::TypeRegistry;
use crate::renderer::Batch;

slotmap::new_key_type! {
    pub struct EntityId;
    pub struct ComponentId;
}

/// Shared state carried by every component, kept outside the component box
/// so it stays readable while the component itself is checked out.
#[derive(Debug, Clone, Copy)]
pub struct ComponentMeta {
    /// Participates in `World::update`.
    pub active: bool,
    /// Participates in `World::render`.
    pub visible: bool,
    /// Render sort key; higher depths render first.
    pub depth: i32,
    type_id: usize,
    owner: EntityId,
}

impl ComponentMeta {
    pub fn type_id(&self) -> usize {
        self.type_id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }
}

struct Slot {
    meta: ComponentMeta,
    /// `None` while the component is checked out into a running hook.
    inner: Option<Box<dyn Component>>,
}

/// Result of attaching a component. `awake_ok` reports the awake hook's
/// verdict; a failed awake never rolls back the registration.
#[derive(Debug, Clone, Copy)]
pub struct Added {
    pub key: ComponentId,
    pub awake_ok: bool,
}

/// What a component hook sees: the world, the frame collaborators, and
/// which component it is running as.
pub struct Ctx<'a, 'f> {
    pub world: &'a mut World,
    pub frame: Frame<'f>,
    /// The entity owning the running component.
    pub entity: EntityId,
    /// The running component itself.
    pub key: ComponentId,
}

impl Ctx<'_, '_> {
    /// Whether the owning entity still exists and is alive. Hooks that run
    /// callbacks able to destroy the entity re-check this before touching
    /// it again.
    pub fn alive(&self) -> bool {
        self.world
            .get_entity(self.entity)
            .map(|e| e.alive())
            .unwrap_or(false)
    }

    pub fn entity(&self) -> &Entity {
        self.world.entity(self.entity)
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        self.world.entity_mut(self.entity)
    }

    pub fn position(&self) -> IVec2 {
        self.entity().position
    }

    /// First sibling component of kind `T`, if any.
    pub fn find<T: Component>(&self) -> Option<ComponentId> {
        self.world.find::<T>(self.entity)
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.world.get::<T>(self.find::<T>()?)
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let key = self.find::<T>()?;
        self.world.get_mut::<T>(key)
    }

    /// Attach a new component to the owning entity.
    pub fn add<T: Component>(&mut self, component: T) -> Added {
        let frame = self.frame;
        self.world.add(self.entity, component, &frame)
    }

    /// Detach and drop the running component.
    pub fn remove_self(&mut self) {
        self.world.remove(self.key);
    }

    /// Destroy the owning entity (and all its components) immediately.
    pub fn destroy_entity(&mut self) {
        self.world.destroy_entity(self.entity);
    }
}

#[derive(Default)]
pub struct World {
    types: TypeRegistry,
    entities: SlotMap<EntityId, Entity>,
    components: SlotMap<ComponentId, Slot>,
    /// Per-type dense key lists, indexed by type id, in attach order.
    buckets: Vec<Vec<ComponentId>>,
    /// Draw collider shapes during render, for debugging.
    pub debug_colliders: bool,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // -- entities --

    pub fn add_entity(&mut self, position: IVec2) -> EntityId {
        let id = self.entities.insert(Entity::new(position));
        log::trace!("entity {:?} created at {}", id, position);
        id
    }

    /// Destroy an entity and every component attached to it, immediately.
    /// Panics when the entity does not belong to this world.
    pub fn destroy_entity(&mut self, entity: EntityId) {
        let e = self
            .entities
            .get_mut(entity)
            .expect("entity does not belong to this world");
        e.alive = false;
        let keys = std::mem::take(&mut e.components);
        for key in keys {
            self.drop_component(key);
        }
        self.entities.remove(entity);
        log::trace!("entity {:?} destroyed", entity);
    }

    /// Destroy every live entity. Called on teardown.
    pub fn clear(&mut self) {
        let all: Vec<EntityId> = self.entities.keys().collect();
        for entity in all {
            self.destroy_entity(entity);
        }
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        self.entities.get(id).expect("stale entity key")
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        self.entities.get_mut(id).expect("stale entity key")
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -- components --

    /// Attach `component` to `entity`: register it in the entity's list and
    /// the per-type bucket, then run its awake hook. Panics when the entity
    /// does not belong to this world.
    pub fn add<T: Component>(&mut self, entity: EntityId, component: T, frame: &Frame) -> Added {
        assert!(
            self.entities.contains_key(entity),
            "entity does not belong to this world"
        );
        let type_id = self.types.id::<T>();
        if self.buckets.len() <= type_id {
            self.buckets.resize_with(type_id + 1, Vec::new);
        }
        let key = self.components.insert(Slot {
            meta: ComponentMeta {
                active: true,
                visible: true,
                depth: 0,
                type_id,
                owner: entity,
            },
            inner: Some(Box::new(component)),
        });
        self.entities[entity].components.push(key);
        self.buckets[type_id].push(key);

        let awake_ok = self.run_awake(key, frame);
        if !awake_ok {
            log::warn!(
                "{} awake failed on entity {:?}; component left attached",
                self.types.name(type_id),
                entity
            );
        }
        Added { key, awake_ok }
    }

    /// Detach and drop one component. Unknown keys are a caller bug: a
    /// debug assertion in debug builds, a no-op in release.
    pub fn remove(&mut self, key: ComponentId) {
        let Some(slot) = self.components.get(key) else {
            debug_assert!(false, "removing a component that is not attached");
            return;
        };
        let owner = slot.meta.owner;
        if let Some(e) = self.entities.get_mut(owner) {
            e.components.retain(|&k| k != key);
        }
        self.drop_component(key);
    }

    fn drop_component(&mut self, key: ComponentId) {
        if let Some(slot) = self.components.remove(key) {
            self.buckets[slot.meta.type_id].retain(|&k| k != key);
        }
    }

    pub fn meta(&self, key: ComponentId) -> Option<&ComponentMeta> {
        self.components.get(key).map(|s| &s.meta)
    }

    pub fn meta_mut(&mut self, key: ComponentId) -> Option<&mut ComponentMeta> {
        self.components.get_mut(key).map(|s| &mut s.meta)
    }

    /// Typed access. `None` for stale keys, kind mismatches, and
    /// components currently checked out into a hook.
    pub fn get<T: Component>(&self, key: ComponentId) -> Option<&T> {
        let boxed: &dyn Component = self.components.get(key)?.inner.as_deref()?;
        boxed.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Component>(&mut self, key: ComponentId) -> Option<&mut T> {
        let boxed: &mut dyn Component = self.components.get_mut(key)?.inner.as_deref_mut()?;
        boxed.as_any_mut().downcast_mut::<T>()
    }

    /// First component of kind `T` on `entity`, scanning in attach order.
    pub fn find<T: Component>(&self, entity: EntityId) -> Option<ComponentId> {
        let type_id = self.types.lookup::<T>()?;
        self.entities
            .get(entity)?
            .components
            .iter()
            .copied()
            .find(|&k| self.components.get(k).map(|s| s.meta.type_id) == Some(type_id))
    }

    /// Every component of kind `T` currently registered, in attach order,
    /// regardless of active/visible/alive state. A snapshot: safe to
    /// mutate the world while walking it.
    pub fn components_of<T: Component>(&self) -> Vec<ComponentId> {
        match self.types.lookup::<T>() {
            Some(type_id) => self.buckets[type_id].clone(),
            None => Vec::new(),
        }
    }

    /// The first-registered component of kind `T`.
    pub fn first<T: Component>(&self) -> Option<ComponentId> {
        let type_id = self.types.lookup::<T>()?;
        self.buckets[type_id].first().copied()
    }

    pub fn component_kinds(&self) -> usize {
        self.types.count()
    }

    // -- frame driving --

    /// Tick every active component whose entity is alive, one type bucket
    /// at a time in ascending type-id order. Bucket membership is
    /// snapshotted at bucket start, so components added or removed during
    /// the pass affect only the next one.
    pub fn update(&mut self, frame: &Frame) {
        for type_id in 0..self.buckets.len() {
            let snapshot = self.buckets[type_id].clone();
            for key in snapshot {
                let runnable = self.components.get(key).is_some_and(|slot| {
                    slot.meta.active
                        && self
                            .entities
                            .get(slot.meta.owner)
                            .is_some_and(|e| e.alive)
                });
                if !runnable {
                    continue;
                }
                let Some((mut boxed, owner)) = self.checkout(key) else {
                    continue;
                };
                let mut ctx = Ctx {
                    world: &mut *self,
                    frame: *frame,
                    entity: owner,
                    key,
                };
                boxed.update(&mut ctx);
                self.put_back(key, boxed);
            }
        }
    }

    /// Render every visible component of kind `T` with a live entity,
    /// sorted by descending depth (stable for equal depths).
    pub fn render<T: Component>(&mut self, batch: &mut Batch, frame: &Frame) {
        let Some(type_id) = self.types.lookup::<T>() else {
            return;
        };
        let mut visible: Vec<(i32, ComponentId)> = self.buckets[type_id]
            .iter()
            .filter(|&&key| {
                self.components.get(key).is_some_and(|slot| {
                    slot.meta.visible
                        && self
                            .entities
                            .get(slot.meta.owner)
                            .is_some_and(|e| e.alive)
                })
            })
            .map(|&key| (self.components[key].meta.depth, key))
            .collect();
        visible.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, key) in visible {
            self.render_component(key, frame, batch);
        }
    }

    /// Run one component's render hook. Components delegating to a sibling
    /// (a gameplay script wrapping its sprite in an extra matrix) call this
    /// through `ctx.world`.
    pub fn render_component(&mut self, key: ComponentId, frame: &Frame, batch: &mut Batch) {
        let Some((mut boxed, owner)) = self.checkout(key) else {
            return;
        };
        let mut ctx = Ctx {
            world: &mut *self,
            frame: *frame,
            entity: owner,
            key,
        };
        boxed.render(&mut ctx, batch);
        self.put_back(key, boxed);
    }

    fn run_awake(&mut self, key: ComponentId, frame: &Frame) -> bool {
        let Some((mut boxed, owner)) = self.checkout(key) else {
            return true;
        };
        let mut ctx = Ctx {
            world: &mut *self,
            frame: *frame,
            entity: owner,
            key,
        };
        let ok = boxed.awake(&mut ctx);
        self.put_back(key, boxed);
        ok
    }

    fn checkout(&mut self, key: ComponentId) -> Option<(Box<dyn Component>, EntityId)> {
        let slot = self.components.get_mut(key)?;
        let boxed = slot.inner.take()?;
        Some((boxed, slot.meta.owner))
    }

    fn put_back(&mut self, key: ComponentId, boxed: Box<dyn Component>) {
        // The slot is gone when the hook removed its own component or
        // destroyed its entity; the box drops here in that case.
        if let Some(slot) = self.components.get_mut(key) {
            slot.inner = Some(boxed);
        }
    }
}
