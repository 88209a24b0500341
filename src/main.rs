//! Headless demo: a hunter follows its prey around a wall, the prey hides
//! behind crates, and a third agent wanders.
//!
//! Run with `RUST_LOG=debug` to see replans and cover choices. An optional
//! first argument names a RON steering config.

use std::cell::RefCell;
use std::rc::Rc;

use steering::prelude::*;

const DT: f32 = 1.0 / 60.0;
const TICKS: u32 = 900;
const STAND_HEIGHT: f32 = 0.9;

type Body = Rc<RefCell<Kinematics>>;

/// An agent with a kinematic capsule in the physics world
struct Actor {
    body: Body,
    rigid_body: RigidBodyHandle,
    steering: Steering<Body, Body>,
}

impl Actor {
    fn spawn(physics: &mut Physics, config: &SteeringConfig, position: Vec3, max_speed: f32, seed: u64) -> Self {
        let footprint = Footprint::new(0.4, STAND_HEIGHT);
        let rigid_body = physics.create_kinematic_body(position, Quat::IDENTITY);
        let collider = physics.add_capsule_collider(rigid_body, footprint.half_height, footprint.radius);

        let body = Rc::new(RefCell::new(
            Kinematics::new(position, max_speed)
                .with_id(collider.actor_id())
                .with_footprint(footprint),
        ));
        let steering = Steering::new(config.clone(), Rc::clone(&body), Rc::clone(&body))
            .with_wander_seed(seed);

        Self {
            body,
            rigid_body,
            steering,
        }
    }

    /// Apply a velocity delta on the ground plane and sync the physics body
    fn apply(&self, physics: &mut Physics, delta: Vec3) {
        let mut body = self.body.borrow_mut();
        body.integrate(delta.with_z(0.0), DT);
        physics.set_kinematic_position(self.rigid_body, body.position);
    }

    fn position(&self) -> Vec3 {
        self.body.borrow().position
    }
}

fn add_wall(physics: &mut Physics, grid: &mut NavGrid, center: Vec2, half_extents: Vec2) {
    let body = physics.create_static_body(center.extend(1.0), Quat::IDENTITY);
    physics.add_box_collider(body, half_extents.extend(1.0));
    // Pad by the agent radius so planned paths keep clear of the wall
    let padding = Vec2::splat(0.5);
    grid.block_rect(center - half_extents - padding, center + half_extents + padding);
}

fn add_crate(physics: &mut Physics, position: Vec2) {
    let body = physics.create_static_body(position.extend(0.6), Quat::IDENTITY);
    let collider = physics.add_box_collider(body, Vec3::splat(0.6));
    physics.add_tag(collider, "Cover");
}

fn load_config() -> Result<SteeringConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(SteeringConfig::load_ron(path)?),
        None => Ok(SteeringConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    config.validate()?;
    log::info!("Starting steering demo ({TICKS} ticks)");

    let mut physics = Physics::new();
    let mut grid = NavGrid::new(40, 40, 1.0).with_origin(Vec2::splat(-20.0));

    add_wall(&mut physics, &mut grid, Vec2::new(0.0, 0.0), Vec2::new(1.0, 8.0));
    add_crate(&mut physics, Vec2::new(8.0, 4.0));
    add_crate(&mut physics, Vec2::new(10.0, -6.0));

    let mut hunter = Actor::spawn(&mut physics, &config, Vec3::new(-10.0, 0.0, STAND_HEIGHT), 4.0, 1);
    let prey = Actor::spawn(&mut physics, &config, Vec3::new(6.0, 0.0, STAND_HEIGHT), 3.0, 2);
    let mut wanderer = Actor::spawn(&mut physics, &config, Vec3::new(-10.0, -12.0, STAND_HEIGHT), 2.0, 3);

    hunter.steering.follow(prey.body.clone());
    physics.step(DT);

    for tick in 0..TICKS {
        let now = tick as f32 * DT;
        let env = Environment::new(&physics, &grid, &physics);

        let hunter_delta =
            hunter.steering.update_path(&env, now) + hunter.steering.obstacle_avoidance(&physics);
        let prey_delta = prey.steering.hide(&*hunter.body, 8.0, &env)
            + prey.steering.obstacle_avoidance(&physics);
        let wander_delta = wanderer.steering.wander(DT) + wanderer.steering.obstacle_avoidance(&physics);

        let state = hunter.steering.follow_state();

        hunter.apply(&mut physics, hunter_delta);
        prey.apply(&mut physics, prey_delta);
        wanderer.apply(&mut physics, wander_delta);
        physics.step(DT);

        if tick % 60 == 0 {
            let (h, p, w) = (hunter.position(), prey.position(), wanderer.position());
            log::info!(
                "t={now:5.2}s hunter=({:6.2}, {:6.2}) [{state:?}] prey=({:6.2}, {:6.2}) wanderer=({:6.2}, {:6.2}) gap={:.2}",
                h.x,
                h.y,
                p.x,
                p.y,
                w.x,
                w.y,
                h.distance(p)
            );
        }
    }

    hunter.steering.stop_following();
    log::info!("Demo finished");
    Ok(())
}
