//! Headless Flappy Bird run: spawns the scene, scripts flap input, steps
//! fixed frames and renders through a draw-call-counting device. Useful as
//! an end-to-end exercise of the engine without a window.

mod background;
mod bird;
mod floor;
mod pipe;
mod slider;

use background::Background;
use bird::Bird;
use floor::Floor;
use pipe::Pipe;

use fledge_engine::{
    Batch, Clock, Content, Frame, Input, Key, RenderDevice, RenderPass, Target, TimerComponent,
    Vertex, World, FRAME_DURATION_MS,
};
use glam::IVec2;

const WIDTH: i32 = 288;
const HEIGHT: i32 = 512;
const PIPE_GAP: i32 = 90;
const PIPE_INTERVAL_MS: f32 = 1400.0;
const RUN_FRAMES: u32 = 900;

/// Counts uploads and draw calls instead of touching a GPU.
#[derive(Default)]
struct RecordingDevice {
    uploads: u32,
    draw_calls: u32,
    draw_calls_last_frame: u32,
}

impl RenderDevice for RecordingDevice {
    fn upload(&mut self, _vertices: &[Vertex], _indices: &[u32]) {
        self.uploads += 1;
        self.draw_calls_last_frame = 0;
    }

    fn draw(&mut self, _pass: &RenderPass) {
        self.draw_calls += 1;
        self.draw_calls_last_frame += 1;
    }
}

fn manifest() -> &'static str {
    r#"{
        "atlases": [
            { "name": "sheet", "width": 512, "height": 512, "path": "sheet.png" }
        ],
        "sprites": {
            "bird": {
                "atlas": "sheet",
                "pivot": [8, 8],
                "animations": {
                    "U": [
                        { "rect": [0, 0, 16, 16], "duration_ms": 90 },
                        { "rect": [16, 0, 16, 16], "duration_ms": 90 }
                    ],
                    "D": [
                        { "rect": [32, 0, 16, 16], "duration_ms": 90 },
                        { "rect": [48, 0, 16, 16], "duration_ms": 90 }
                    ]
                }
            },
            "pipe": {
                "atlas": "sheet",
                "pivot": [13, 0],
                "animations": {
                    "idle": [ { "rect": [0, 32, 26, 160] } ]
                }
            },
            "base": {
                "atlas": "sheet",
                "animations": {
                    "idle": [ { "rect": [0, 200, 288, 56] } ]
                }
            },
            "sky": {
                "atlas": "sheet",
                "animations": {
                    "idle": [ { "rect": [0, 256, 288, 200] } ]
                }
            }
        }
    }"#
}

fn spawn_scene(world: &mut World, frame: &Frame) {
    let background = world.add_entity(IVec2::ZERO);
    world.add(background, Background::new(WIDTH), frame);

    let floor = world.add_entity(IVec2::ZERO);
    world.add(floor, Floor::new(WIDTH, HEIGHT), frame);

    let bird = world.add_entity(IVec2::new(WIDTH / 3, HEIGHT / 2));
    world.add(bird, Bird::new(), frame);
}

/// Repeating timer that spawns pipe pairs at a wandering gap height.
fn spawn_pipe_spawner(world: &mut World, frame: &Frame) -> fledge_engine::EntityId {
    let spawner = world.add_entity(IVec2::ZERO);
    let mut rng: u32 = 0x9e37_79b9;
    world.add(
        spawner,
        TimerComponent::repeating(PIPE_INTERVAL_MS).with_action(move |ctx| {
            rng = rng.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let gap_center = 120 + ((rng >> 16) % 220) as i32;
            let x = WIDTH + 20;

            let top = ctx.world.add_entity(IVec2::new(x, gap_center - PIPE_GAP / 2));
            let frame = ctx.frame;
            ctx.world.add(top, Pipe::new(true), &frame);
            let bottom = ctx.world.add_entity(IVec2::new(x, gap_center + PIPE_GAP / 2));
            ctx.world.add(bottom, Pipe::new(false), &frame);

            log::debug!("pipe pair spawned, gap at {}", gap_center);
            true
        }),
        frame,
    );
    spawner
}

/// One point per bottom pipe whose center scrolls past the bird.
fn update_score(world: &mut World, bird_x: i32) -> u32 {
    let mut scored = 0;
    for key in world.components_of::<Pipe>() {
        let Some(owner) = world.meta(key).map(|m| m.owner()) else {
            continue;
        };
        let Some(pipe_x) = world.get_entity(owner).map(|e| e.position.x) else {
            continue;
        };
        if let Some(pipe) = world.get_mut::<Pipe>(key) {
            if !pipe.top && !pipe.scored && pipe_x < bird_x {
                pipe.scored = true;
                scored += 1;
            }
        }
    }
    scored
}

fn main() {
    pretty_env_logger::init();

    let content = Content::from_json(manifest()).expect("embedded manifest is valid");
    let mut input = Input::new();
    let mut clock = Clock::new();
    let mut world = World::new();
    let mut batch = Batch::new();
    let mut device = RecordingDevice::default();
    let target = Target::backbuffer(WIDTH as u32, HEIGHT as u32);

    {
        let frame = Frame::new(&content, &input, &clock);
        spawn_scene(&mut world, &frame);
    }
    let spawner = {
        let frame = Frame::new(&content, &input, &clock);
        spawn_pipe_spawner(&mut world, &frame)
    };

    let bird_entity = world
        .first::<Bird>()
        .and_then(|key| world.meta(key).map(|m| m.owner()))
        .expect("bird spawned");
    let bird_x = world.entity(bird_entity).position.x;

    let mut score = 0;
    let mut death_frame = None;
    let mut spawner_alive = true;

    for frame_index in 0..RUN_FRAMES {
        // Scripted input: tap flap on a steady rhythm while alive.
        if frame_index % 40 == 0 {
            input.key_down(Key::Space);
        } else {
            input.key_up(Key::Space);
        }

        {
            let frame = Frame::new(&content, &input, &clock);
            world.update(&frame);
        }
        input.step();
        clock.advance(FRAME_DURATION_MS as u64);

        score += update_score(&mut world, bird_x);

        let dead = world
            .first::<Bird>()
            .and_then(|key| world.get::<Bird>(key))
            .map(|b| b.dead)
            .unwrap_or(false);
        if dead && death_frame.is_none() {
            death_frame = Some(frame_index);
        }
        if dead && spawner_alive {
            world.destroy_entity(spawner);
            spawner_alive = false;
        }

        // Render back to front; draw order is the application's call.
        batch.clear();
        {
            let frame = Frame::new(&content, &input, &clock);
            world.render::<Background>(&mut batch, &frame);
            world.render::<Pipe>(&mut batch, &frame);
            world.render::<Floor>(&mut batch, &frame);
            world.render::<Bird>(&mut batch, &frame);
        }
        batch.render(&mut device, target);
    }

    println!("frames run:      {}", RUN_FRAMES);
    println!("pipes cleared:   {}", score);
    match death_frame {
        Some(frame) => println!("bird died at:    frame {}", frame),
        None => println!("bird survived the whole run"),
    }
    println!("buffer uploads:  {}", device.uploads);
    println!("draw calls:      {}", device.draw_calls);
}
