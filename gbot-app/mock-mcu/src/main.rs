mod broker;
mod devices;

use std::{path::PathBuf, process::ExitCode, thread};

use broker::{BrokerStats, Faults, LocalBroker};
use clap::Parser;
use devices::{HostLink, LoggingMotor, ScriptedImu};
use embedded_hal_mock::eh1::delay::StdSleep;
use gbot_core::utils::{
    config::sleep, halt, Command, ConnectionState, Duration, Gesture, GloveNode, RobotNode,
    Timing,
};
use serde::Serialize;
use tracing::{error, info};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Glove cycles to run before exiting; 0 runs both nodes forever
    #[clap(long, default_value_t = 60)]
    cycles: u32,
    /// Control-loop period in milliseconds
    #[clap(long, default_value_t = 100)]
    cycle_ms: u64,
    /// Broker connect retry delay in milliseconds
    #[clap(long, default_value_t = 500)]
    retry_ms: u64,
    /// Drop every broker session after this many publishes
    #[clap(long)]
    drop_every: Option<u64>,
    /// Refuse this many broker connect attempts first
    #[clap(long, default_value_t = 0)]
    refuse_connects: u32,
    /// Make the glove IMU fail its startup self-test
    #[clap(long)]
    fail_self_test: bool,
    /// JSON file with an array of IMU samples to replay
    #[clap(long)]
    script: Option<PathBuf>,
    /// Samples per gesture in the built-in sweep
    #[clap(long, default_value_t = 10)]
    hold: usize,
}

#[derive(Serialize)]
struct GloveReport {
    published: u32,
    connects: u32,
    last_gesture: Option<Gesture>,
}

#[derive(Serialize)]
struct RobotReport {
    cycles: u32,
    last_command: Option<Command>,
    motor_calls: u64,
    ignored: u32,
    connects: u32,
    state: ConnectionState,
}

#[derive(Serialize)]
struct Summary {
    glove: Option<GloveReport>,
    robot: RobotReport,
    broker: BrokerStats,
}

fn glove_task(
    imu: ScriptedImu,
    broker: LocalBroker,
    timing: Timing,
    cycles: u32,
) -> Option<GloveReport> {
    let _span = tracing::info_span!("glove").entered();
    let mut delay = StdSleep::new();

    let mut node = match GloveNode::start(imu, &mut HostLink, broker.client(), timing, &mut delay) {
        Ok(node) => node,
        Err(e) => {
            error!("{e}");
            if cycles == 0 {
                halt(&mut delay);
            }
            return None;
        }
    };

    if cycles == 0 {
        node.run(&mut delay);
    }

    let mut last_gesture = None;
    for _ in 0..cycles {
        last_gesture = Some(node.cycle(&mut delay));
        sleep(&mut delay, timing.cycle);
    }

    let publisher = node.publisher();
    Some(GloveReport {
        published: publisher.published(),
        connects: publisher.session().established(),
        last_gesture,
    })
}

fn robot_task(
    broker: LocalBroker,
    timing: Timing,
    cycles: u32,
) -> RobotReport {
    let _span = tracing::info_span!("robot").entered();
    let mut delay = StdSleep::new();
    let mut node = RobotNode::start(
        &mut HostLink,
        broker.client(),
        LoggingMotor::default(),
        timing,
        &mut delay,
    );

    if cycles == 0 {
        node.run(&mut delay);
    }

    for _ in 0..cycles {
        node.cycle(&mut delay);
        sleep(&mut delay, timing.cycle);
    }

    let actuation = node.actuation();
    let receiver = actuation.receiver();
    RobotReport {
        cycles: actuation.cycles(),
        last_command: actuation.motor().last,
        motor_calls: actuation.motor().calls,
        ignored: receiver.ignored(),
        connects: receiver.session().established(),
        state: receiver.session().state(),
    }
}

/// A couple of extra robot cycles so the robot sees the glove's final publish.
/// Zero still means run forever.
fn robot_cycles(glove_cycles: u32) -> u32 {
    if glove_cycles == 0 {
        0
    } else {
        glove_cycles.saturating_add(2)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();

    let samples = match &opts.script {
        Some(path) => match ScriptedImu::load(path) {
            Ok(samples) => samples,
            Err(e) => {
                error!("failed to load sample script {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => ScriptedImu::sweep(opts.hold),
    };

    let timing = Timing {
        cycle: Duration::from_millis(opts.cycle_ms),
        retry: Duration::from_millis(opts.retry_ms),
        ..Timing::default()
    };
    let broker = LocalBroker::new(Faults {
        drop_every: opts.drop_every,
        refuse_connects: opts.refuse_connects,
    });
    info!(samples = samples.len(), cycles = opts.cycles, "starting simulated nodes");

    let cycles = opts.cycles;
    let robot = {
        let broker = broker.clone();
        let robot_cycles = robot_cycles(cycles);
        thread::spawn(move || robot_task(broker, timing, robot_cycles))
    };
    let glove = {
        let broker = broker.clone();
        let imu = ScriptedImu::new(samples, !opts.fail_self_test);
        thread::spawn(move || glove_task(imu, broker, timing, cycles))
    };

    let (glove, robot) = (glove.join(), robot.join());
    let (Ok(glove), Ok(robot)) = (glove, robot) else {
        error!("node thread panicked");
        return ExitCode::FAILURE;
    };

    let summary = Summary {
        glove,
        robot,
        broker: broker.stats(),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("failed to encode summary: {e}"),
    }

    if summary.glove.is_none() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robot_outlasts_the_glove_without_overflow() {
        assert_eq!(robot_cycles(0), 0);
        assert_eq!(robot_cycles(60), 62);
        assert_eq!(robot_cycles(u32::MAX), u32::MAX);
    }

    #[test]
    fn reports_carry_wire_tokens() {
        let glove = GloveReport {
            published: 3,
            connects: 1,
            last_gesture: Some(Gesture::Backward),
        };
        let robot = RobotReport {
            cycles: 5,
            last_command: Some(Command::Left),
            motor_calls: 5,
            ignored: 0,
            connects: 1,
            state: ConnectionState::Connected,
        };

        let glove = serde_json::to_string(&glove).unwrap();
        let robot = serde_json::to_string(&robot).unwrap();
        assert!(glove.contains(r#""last_gesture":"backward""#), "{glove}");
        assert!(robot.contains(r#""last_command":"left""#), "{robot}");
    }
}
