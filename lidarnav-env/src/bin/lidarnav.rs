use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use lidarnav_env::{utils::init_tracing, NavigationTask, NavigationTaskConfig};
use navci::{DummyArticulation, DummyRangeSensor};
use schemars::schema_for;
use tracing::{debug, info};

/// Returns of the synthetic sensor that lie in the scan plane.
const IN_PLANE_RETURNS: usize = 900;
const OFF_PLANE_RETURNS: usize = 300;
const WALL_RADIUS: f64 = 5.0;
const RANGE_NOISE: f64 = 0.05;

#[derive(Parser, Debug)]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct Args {
    #[clap(subcommand)]
    subcommand: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate JSON schema for the specified config file.
    Schema {
        /// Kind of config file.
        #[clap(value_enum, ignore_case = true)]
        kind: ConfigKind,
    },
    /// Prints the default setting as TOML.
    DefaultConfig,
    /// Steps the task against synthetic sensor and robot data.
    Run {
        /// Path to the setting file.
        #[clap(short, long, value_parser)]
        config_path: Option<PathBuf>,
        /// Number of control ticks.
        #[clap(long, default_value_t = 20)]
        ticks: usize,
        /// Constant `[linear, yaw_rate]` action sent to every instance.
        #[clap(long, num_args = 2, default_values_t = [1.0, 0.0], allow_negative_numbers = true)]
        action: Vec<f64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConfigKind {
    NavigationTaskConfig,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    debug!(?args);

    match args.subcommand {
        Command::Schema { kind } => {
            let schema = match kind {
                ConfigKind::NavigationTaskConfig => schema_for!(NavigationTaskConfig),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::DefaultConfig => {
            print!("{}", toml::to_string(&NavigationTaskConfig::default())?);
        }
        Command::Run {
            config_path,
            ticks,
            action,
        } => {
            let config = match lidarnav_env::utils::get_config_path(config_path) {
                Some(path) => NavigationTaskConfig::new(path)?,
                None => {
                    info!("no config path is given, using the default config");
                    NavigationTaskConfig::default()
                }
            };
            run(config, ticks, [action[0], action[1]])?;
        }
    }
    Ok(())
}

fn run(config: NavigationTaskConfig, ticks: usize, action: [f64; 2]) -> Result<()> {
    let num_envs = config.num_envs;
    let sensor = DummyRangeSensor::planar_ring(
        num_envs,
        IN_PLANE_RETURNS,
        OFF_PLANE_RETURNS,
        WALL_RADIUS,
        RANGE_NOISE,
    );
    let robot = DummyArticulation::new(config.joint_names.clone(), num_envs);
    let mut task = NavigationTask::new(config)?;
    let actions = vec![action; num_envs];
    let mut rng = rand::thread_rng();
    let all: Vec<_> = (0..num_envs).collect();
    task.reset_joint_states(&all, &robot, &mut rng)?;

    for tick in 0..ticks {
        task.pre_physics_step(&actions)?;
        task.apply_action(&robot)?;
        let dones = task.dones(&robot)?;
        let rewards = task.rewards(&robot, &dones)?;
        let reset_ids = dones.reset_ids();
        if !reset_ids.is_empty() {
            task.reset(&reset_ids)?;
            task.reset_joint_states(&reset_ids, &robot, &mut rng)?;
        }
        let obs = task.observations(&sensor, &robot)?;

        let row = obs.policy.row(0);
        let goal = &row[row.len() - 2..];
        let projected = obs.world_scan_points.iter().flatten().count();
        info!(
            tick,
            pooling_flag = obs.pooling_flag,
            reward = rewards[0],
            ?goal,
            projected,
            "stepped"
        );
    }
    Ok(())
}
