//! Tilt Ball headless runner
//!
//! Plays one round of a level with a keyboard autopilot at a fixed 60 Hz
//! display clock and logs what happens. Useful for tuning settings files.
//!
//! Usage: `tilt-ball [level.json] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The host page drives GameSession directly
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), String> {
    use std::cell::Cell;
    use std::rc::Rc;

    use tilt_ball::Settings;
    use tilt_ball::sim::{GameSession, InputMode, Key, Layout, SessionPhase, SimEvent};

    const FRAME_SECS: f64 = 1.0 / 60.0;
    const DEMO_LEVEL: &str = include_str!("../levels/demo.json");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let layout = match args.first() {
        Some(path) => Layout::from_json(&read(path)?)?,
        None => Layout::from_json(DEMO_LEVEL)?,
    };
    let settings = match args.get(1) {
        Some(path) => Settings::from_json(&read(path)?)?,
        None => Settings::default(),
    };

    log::info!("Tilt Ball (headless) starting...");
    let start = layout.start_position();
    let goal = layout.goal;
    let mut session = GameSession::new(layout, start, &settings)?;
    session.set_input_mode(InputMode::Keyboard);

    let obstacle_hits = Rc::new(Cell::new(0u32));
    let wall_hits = Rc::new(Cell::new(0u32));
    {
        let obstacle_hits = Rc::clone(&obstacle_hits);
        let wall_hits = Rc::clone(&wall_hits);
        session.subscribe(move |event: &SimEvent| match event {
            SimEvent::ObstacleHit { index, .. } => {
                obstacle_hits.set(obstacle_hits.get() + 1);
                log::info!("Bumped obstacle {index}");
            }
            SimEvent::WallHit => wall_hits.set(wall_hits.get() + 1),
            SimEvent::GoalReached => log::info!("Goal!"),
        });
    }

    let mut now = 0.0;
    session.begin(now);
    let mut frames = 0u64;
    let phase = loop {
        now += FRAME_SECS;
        frames += 1;

        // Autopilot: hold the keys pointing at the goal
        let ball_pos = session.engine().ball().map(|b| b.pos);
        if let (Some(goal), Some(pos)) = (goal, ball_pos) {
            let dx = goal.x - pos.x;
            let dy = goal.y - pos.y;
            steer(&mut session, dx, Key::ArrowLeft, Key::ArrowRight);
            steer(&mut session, dy, Key::ArrowUp, Key::ArrowDown);
        }

        let phase = session.frame(now);
        if phase != SessionPhase::Playing {
            break phase;
        }
    };

    let result = match phase {
        SessionPhase::Won => "reached the goal",
        SessionPhase::TimedOut => "ran out of time",
        _ => "stopped",
    };
    println!(
        "Ball {result} after {frames} frames ({:.1}s left): {} obstacle hits, {} wall hits",
        session.time_remaining(),
        obstacle_hits.get(),
        wall_hits.get()
    );
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn steer<G: tilt_ball::sim::GeometryProvider>(
    session: &mut tilt_ball::sim::GameSession<G>,
    delta: f64,
    negative: tilt_ball::sim::Key,
    positive: tilt_ball::sim::Key,
) {
    const DEADZONE: f64 = 4.0;

    session.key_up(negative);
    session.key_up(positive);
    if delta < -DEADZONE {
        session.key_down(negative);
    } else if delta > DEADZONE {
        session.key_down(positive);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))
}
