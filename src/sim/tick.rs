//! Fixed timestep simulation tick
//!
//! Advances a `Level` by exactly one step. Position is moved directly for the
//! paddle; balls integrate their velocity.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::bounds::aabb_aabb_intersects;
use super::state::{Ball, Block, Level, Paddle};
use crate::input::InputState;
use crate::math::{Direction, cardinal_direction};
use crate::settings::Settings;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Launch any ball still sitting on the paddle
    pub launch: bool,
}

impl TickInput {
    /// Read the shared flags, consuming the launch edge
    pub fn take_from(input: &mut InputState) -> Self {
        Self {
            move_left: input.move_left,
            move_right: input.move_right,
            launch: input.take_launch(),
        }
    }
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    BallLaunched,
    PaddleHit,
    BlockHit { index: usize, destroyed: bool },
    /// A ball reached the bottom of the field
    BallLost,
    /// Every breakable block is gone
    LevelCleared,
}

/// Advance the level by one fixed step of `dt` seconds
pub fn tick(
    level: &mut Level,
    input: &TickInput,
    settings: &Settings,
    rng: &mut Pcg32,
    dt: f32,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    level.snapshot();

    let Level {
        blocks,
        paddles,
        balls,
        width,
        height,
    } = level;

    for paddle in paddles.iter_mut() {
        update_paddle(paddle, input, *width, settings.paddle_speed, dt);
    }

    for ball in balls.iter_mut() {
        if ball.stuck_to_paddle {
            let Some(paddle) = paddles.first() else {
                continue;
            };
            follow_paddle(ball, paddle, settings.ball_fire_speed);

            if input.launch {
                launch(ball, settings.launch_spread, rng);
                events.push(GameEvent::BallLaunched);
            }
            continue;
        }

        ball.body.translate(ball.body.vel * dt);

        if bounce_off_walls(ball, *width) {
            log::trace!("Wall bounce at {:?}", ball.body.pos());
        }

        if ball.body.y() + ball.radius() >= *height {
            events.push(GameEvent::BallLost);
            continue;
        }

        for paddle in paddles.iter() {
            if paddle_collision(ball, paddle, settings) {
                events.push(GameEvent::PaddleHit);
            }
        }

        for (index, block) in blocks.iter_mut().enumerate() {
            if !block.alive {
                continue;
            }
            if block_collision(ball, block) {
                let destroyed = !block.is_solid();
                if destroyed {
                    block.alive = false;
                }
                events.push(GameEvent::BlockHit { index, destroyed });
            }
        }
    }

    if level.is_cleared() {
        events.push(GameEvent::LevelCleared);
    }

    events
}

/// Move the paddle horizontally, keeping both edges inside the field.
///
/// Velocity reports the direction of travel; it is not integrated.
pub fn update_paddle(paddle: &mut Paddle, input: &TickInput, field_width: f32, speed: f32, dt: f32) {
    let displacement = speed * dt;
    let half_width = paddle.bounds().half_width();
    let x = paddle.body.x();

    paddle.body.vel = Vec2::ZERO;

    match (input.move_left, input.move_right) {
        (true, false) => {
            let new_x = (x - displacement).max(half_width);
            if new_x < x {
                paddle.body.set_x(new_x);
                paddle.body.vel.x = -speed;
            }
        }
        (false, true) => {
            let new_x = (x + displacement).min(field_width - half_width);
            if new_x > x {
                paddle.body.set_x(new_x);
                paddle.body.vel.x = speed;
            }
        }
        _ => {}
    }
}

/// Keep a stuck ball resting on top of the paddle
fn follow_paddle(ball: &mut Ball, paddle: &Paddle, fire_speed: f32) {
    ball.body.set_pos(Vec2::new(
        paddle.body.x(),
        paddle.bounds().top() - ball.radius(),
    ));
    ball.body.vel = Vec2::new(paddle.body.vel.x, -fire_speed);
}

fn launch(ball: &mut Ball, spread: f32, rng: &mut Pcg32) {
    if spread > 0.0 {
        ball.body.vel.x += rng.random_range(-spread..=spread);
    }
    ball.stuck_to_paddle = false;
}

/// Clamp against the left, right and top edges and turn the velocity
/// component back into the field. Returns true on any contact.
fn bounce_off_walls(ball: &mut Ball, field_width: f32) -> bool {
    let r = ball.radius();
    let mut bounced = false;

    if ball.body.x() - r < 0.0 {
        ball.body.set_x(r);
        ball.body.vel.x = ball.body.vel.x.abs();
        bounced = true;
    } else if ball.body.x() + r > field_width {
        ball.body.set_x(field_width - r);
        ball.body.vel.x = -ball.body.vel.x.abs();
        bounced = true;
    }

    if ball.body.y() - r < 0.0 {
        ball.body.set_y(r);
        ball.body.vel.y = ball.body.vel.y.abs();
        bounced = true;
    }

    bounced
}

/// Redirect the ball off the paddle.
///
/// The horizontal part scales with how far from the paddle centre the ball
/// hit, the vertical part always points up, and the speed is kept.
fn paddle_collision(ball: &mut Ball, paddle: &Paddle, settings: &Settings) -> bool {
    let bounds = *paddle.bounds();
    if !ball.body.shape().intersects(&bounds) {
        return false;
    }

    let offset = if bounds.half_width() > 0.0 {
        ((ball.body.x() - bounds.center.x) / bounds.half_width()).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let mut speed = ball.body.vel.length();
    if speed == 0.0 {
        speed = settings.ball_fire_speed;
    }

    let direction = Vec2::new(offset * settings.paddle_deflection, -1.0).normalize();
    ball.body.vel = direction * speed;
    ball.body.set_y(bounds.top() - ball.radius());

    true
}

/// Push the ball out of a block along one axis and bounce it.
///
/// The cardinal direction of the penetration picks the axis: East/West
/// corrects horizontally, North/South vertically. When the ball centre is
/// on or inside the block the penetration is zero and the reverse of the
/// travel direction is used instead.
fn block_collision(ball: &mut Ball, block: &Block) -> bool {
    // broad phase
    if !aabb_aabb_intersects(ball.body.aabb(), block.bounds()) {
        return false;
    }
    let Some(penetration) = ball.body.shape().resolve(block.bounds()) else {
        return false;
    };

    let direction = cardinal_direction(penetration).or_else(|| cardinal_direction(-ball.body.vel));
    let r = ball.radius();

    match direction {
        Some(Direction::East) => {
            ball.body.translate(Vec2::new(r - penetration.x.abs(), 0.0));
            ball.body.vel.x = ball.body.vel.x.abs();
        }
        Some(Direction::West) => {
            ball.body.translate(Vec2::new(-(r - penetration.x.abs()), 0.0));
            ball.body.vel.x = -ball.body.vel.x.abs();
        }
        Some(Direction::North) => {
            ball.body.translate(Vec2::new(0.0, r - penetration.y.abs()));
            ball.body.vel.y = ball.body.vel.y.abs();
        }
        Some(Direction::South) => {
            ball.body.translate(Vec2::new(0.0, -(r - penetration.y.abs())));
            ball.body.vel.y = -ball.body.vel.y.abs();
        }
        None => {}
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bounds::Aabb;
    use proptest::prelude::*;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn empty_level(settings: &Settings) -> Level {
        let grid: [&[u8]; 0] = [];
        Level::load(&grid, settings.render_width, settings.render_height, settings)
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn quiet_settings() -> Settings {
        Settings {
            launch_spread: 0.0,
            ..Settings::default()
        }
    }

    fn free_ball(level: &mut Level, pos: Vec2, vel: Vec2) {
        let ball = &mut level.balls[0];
        ball.stuck_to_paddle = false;
        ball.body.set_pos(pos);
        ball.body.vel = vel;
    }

    #[test]
    fn test_stuck_ball_follows_paddle() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        let input = TickInput {
            move_right: true,
            ..Default::default()
        };
        tick(&mut level, &input, &settings, &mut rng(), DT);

        let paddle = &level.paddles[0];
        let ball = &level.balls[0];
        assert!(ball.stuck_to_paddle);
        assert_eq!(ball.body.x(), paddle.body.x());
        assert_eq!(ball.body.y(), paddle.bounds().top() - ball.radius());
        assert_eq!(ball.body.vel, Vec2::new(settings.paddle_speed, -settings.ball_fire_speed));
    }

    #[test]
    fn test_launch_happens_once() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        let launch = TickInput {
            launch: true,
            ..Default::default()
        };

        let events = tick(&mut level, &launch, &settings, &mut rng(), DT);
        assert!(events.contains(&GameEvent::BallLaunched));
        assert!(!level.balls[0].stuck_to_paddle);

        let y_before = level.balls[0].body.y();
        let events = tick(&mut level, &launch, &settings, &mut rng(), DT);
        assert!(!events.contains(&GameEvent::BallLaunched));
        assert!(!level.balls[0].stuck_to_paddle);
        // free ball integrates its upward velocity
        let expected = y_before - settings.ball_fire_speed * DT;
        assert!((level.balls[0].body.y() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_launch_spread_is_bounded() {
        let settings = Settings::default();
        let mut level = empty_level(&settings);
        let launch = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut level, &launch, &settings, &mut rng(), DT);
        assert!(level.balls[0].body.vel.x.abs() <= settings.launch_spread);
    }

    #[test]
    fn test_paddle_velocity_reports_direction() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        let x0 = level.paddles[0].body.x();

        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        tick(&mut level, &left, &settings, &mut rng(), DT);
        assert_eq!(level.paddles[0].body.vel.x, -settings.paddle_speed);
        assert!((level.paddles[0].body.x() - (x0 - settings.paddle_speed * DT)).abs() < 1e-3);

        tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        assert_eq!(level.paddles[0].body.vel.x, 0.0);

        let both = TickInput {
            move_left: true,
            move_right: true,
            ..Default::default()
        };
        let x1 = level.paddles[0].body.x();
        tick(&mut level, &both, &settings, &mut rng(), DT);
        assert_eq!(level.paddles[0].body.x(), x1);
    }

    #[test]
    fn test_paddle_stops_at_wall() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        for _ in 0..1000 {
            tick(&mut level, &left, &settings, &mut rng(), DT);
        }
        let paddle = &level.paddles[0];
        assert_eq!(paddle.bounds().left(), 0.0);
        assert_eq!(paddle.body.vel.x, 0.0);

        // a huge step can't push it through either
        update_paddle(&mut level.paddles[0], &left, settings.render_width, 1.0e9, 1.0);
        assert_eq!(level.paddles[0].bounds().left(), 0.0);
    }

    #[test]
    fn test_ball_bounces_off_side_and_top_walls() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        let r = settings.ball_radius;

        free_ball(&mut level, Vec2::new(r + 1.0, 300.0), Vec2::new(-600.0, 0.0));
        tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        assert_eq!(level.balls[0].body.x(), r);
        assert_eq!(level.balls[0].body.vel.x, 600.0);

        free_ball(&mut level, Vec2::new(settings.render_width - r - 1.0, 300.0), Vec2::new(600.0, 0.0));
        tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        assert_eq!(level.balls[0].body.x(), settings.render_width - r);
        assert_eq!(level.balls[0].body.vel.x, -600.0);

        free_ball(&mut level, Vec2::new(400.0, r + 1.0), Vec2::new(0.0, -600.0));
        tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        assert_eq!(level.balls[0].body.y(), r);
        assert_eq!(level.balls[0].body.vel.y, 600.0);
    }

    #[test]
    fn test_ball_lost_at_bottom() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        // well to the side of the paddle
        free_ball(
            &mut level,
            Vec2::new(50.0, settings.render_height - settings.ball_radius - 1.0),
            Vec2::new(0.0, 600.0),
        );
        let events = tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        assert!(events.contains(&GameEvent::BallLost));
    }

    #[test]
    fn test_paddle_hit_aims_by_offset_and_keeps_speed() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        let paddle = *level.paddles[0].bounds();

        // right of centre, falling straight down onto the paddle
        let start = Vec2::new(paddle.center.x + paddle.half_width() / 2.0, paddle.top() - settings.ball_radius);
        free_ball(&mut level, start, Vec2::new(0.0, 300.0));
        let events = tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);

        assert!(events.contains(&GameEvent::PaddleHit));
        let vel = level.balls[0].body.vel;
        assert!(vel.y < 0.0, "ball must go up");
        assert!(vel.x > 0.0, "right-of-centre hit goes right");
        assert!((vel.length() - 300.0).abs() < 1e-2);
        assert_eq!(level.balls[0].body.y(), paddle.top() - settings.ball_radius);
    }

    #[test]
    fn test_centre_paddle_hit_goes_straight_up() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        let paddle = *level.paddles[0].bounds();
        free_ball(
            &mut level,
            Vec2::new(paddle.center.x, paddle.top() - settings.ball_radius),
            Vec2::new(0.0, 200.0),
        );
        tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        let vel = level.balls[0].body.vel;
        assert!(vel.x.abs() < 1e-4);
        assert!((vel.y + 200.0).abs() < 1e-2);
    }

    fn level_with_block(settings: &Settings, kind: u8) -> Level {
        let mut level = empty_level(settings);
        let def = kind as usize - 1;
        level.blocks.push(Block::new(Aabb::new(300.0, 100.0, 200.0, 50.0), def));
        level
    }

    #[test]
    fn test_block_hit_from_below_flips_vertical() {
        let settings = quiet_settings();
        let mut level = level_with_block(&settings, 1);
        // block bottom is at y = 150, ball moving up into it
        free_ball(&mut level, Vec2::new(400.0, 165.0), Vec2::new(30.0, -300.0));
        let events = tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);

        assert!(events.contains(&GameEvent::BlockHit {
            index: 0,
            destroyed: true
        }));
        assert!(!level.blocks[0].alive);
        let ball = &level.balls[0];
        assert_eq!(ball.body.vel, Vec2::new(30.0, 300.0));
        assert!(ball.body.y() - ball.radius() >= 150.0 - 1e-3);
    }

    #[test]
    fn test_block_hit_from_side_flips_horizontal() {
        let settings = quiet_settings();
        let mut level = level_with_block(&settings, 2);
        // block left edge is at x = 300
        free_ball(&mut level, Vec2::new(285.0, 125.0), Vec2::new(300.0, 20.0));
        tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);

        let ball = &level.balls[0];
        assert_eq!(ball.body.vel, Vec2::new(-300.0, 20.0));
        assert!(ball.body.x() + ball.radius() <= 300.0 + 1e-3);
    }

    #[test]
    fn test_solid_block_survives() {
        let settings = quiet_settings();
        let mut level = level_with_block(&settings, 5);
        free_ball(&mut level, Vec2::new(400.0, 165.0), Vec2::new(0.0, -300.0));
        let events = tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);

        assert!(events.contains(&GameEvent::BlockHit {
            index: 0,
            destroyed: false
        }));
        assert!(level.blocks[0].alive);
        assert!(level.balls[0].body.vel.y > 0.0);
    }

    #[test]
    fn test_stuck_ball_ignores_blocks() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        let paddle_top = level.paddles[0].bounds().top();
        // a block overlapping the resting ball
        level
            .blocks
            .push(Block::new(Aabb::new(350.0, paddle_top - 30.0, 100.0, 10.0), 0));
        tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        assert!(level.blocks[0].alive);
    }

    #[test]
    fn test_clearing_last_block_reports_level_cleared() {
        let settings = quiet_settings();
        let mut level = level_with_block(&settings, 1);
        free_ball(&mut level, Vec2::new(400.0, 165.0), Vec2::new(0.0, -300.0));
        let events = tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        assert!(events.contains(&GameEvent::LevelCleared));
    }

    #[test]
    fn test_snapshot_taken_before_moving() {
        let settings = quiet_settings();
        let mut level = empty_level(&settings);
        free_ball(&mut level, Vec2::new(400.0, 300.0), Vec2::new(60.0, 0.0));
        tick(&mut level, &TickInput::default(), &settings, &mut rng(), DT);
        assert_eq!(level.balls[0].body.prev_pos(), Vec2::new(400.0, 300.0));
        assert!((level.balls[0].body.x() - 401.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn paddle_never_leaves_field(moves in proptest::collection::vec(0u8..4, 1..400)) {
            let settings = quiet_settings();
            let mut level = empty_level(&settings);
            let mut rng = rng();
            for m in moves {
                let input = TickInput {
                    move_left: m & 1 != 0,
                    move_right: m & 2 != 0,
                    launch: false,
                };
                tick(&mut level, &input, &settings, &mut rng, DT);
                let bounds = level.paddles[0].bounds();
                prop_assert!(bounds.left() >= 0.0);
                prop_assert!(bounds.right() <= settings.render_width);
            }
        }
    }
}
