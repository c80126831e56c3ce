use lidarnav_base::{DifferentialDriveSolver, GoalProjector, WheelJointLayout};
use lidarnav_perception::{RangeScanPreprocessor, TemporalPoolBuffer};
use std::f64::consts::PI;

use nalgebra::Vector3;
use navci::{utils::check_batch_len, Articulation, BaseCommand, RangeSensor};
use rand::Rng;
use tracing::{debug, info, trace};

use crate::{
    Dones, Error, NavigationTaskConfig, ObservationAssembler, ObservationBatch,
    PedestrianEncoder, RewardTerms, ScanProjector, TerminationTerms, WheelState,
    ZeroPedestrianEncoder,
};

/// Everything produced by one observation step.
#[derive(Debug, Clone)]
pub struct TaskObservation {
    pub policy: ObservationBatch,
    /// `true` when every instance has a pooled scan feature this tick.
    pub pooling_flag: bool,
    /// World-frame scan points per instance, for visualization.
    pub world_scan_points: Vec<Option<Vec<Vector3<f64>>>>,
}

/// Per-tick pipeline between the simulator buffers and the policy.
#[derive(Debug)]
pub struct NavigationTask {
    config: NavigationTaskConfig,
    preprocessor: RangeScanPreprocessor,
    pool: TemporalPoolBuffer,
    goal_projector: GoalProjector,
    drive: DifferentialDriveSolver,
    assembler: ObservationAssembler,
    projector: ScanProjector,
    reward_terms: RewardTerms,
    termination: TerminationTerms,
    commands: Vec<BaseCommand>,
    episode_steps: Vec<usize>,
}

impl NavigationTask {
    pub fn new(config: NavigationTaskConfig) -> Result<Self, Error> {
        let pedestrian = ZeroPedestrianEncoder::new(config.pedestrian_block_width);
        Self::with_pedestrian_encoder(config, Box::new(pedestrian))
    }

    /// Fails if any configured shape disagrees with another.
    pub fn with_pedestrian_encoder(
        config: NavigationTaskConfig,
        pedestrian: Box<dyn PedestrianEncoder>,
    ) -> Result<Self, Error> {
        let num_envs = config.num_envs;
        if num_envs == 0 {
            return Err(navci::Error::InvalidConfig {
                name: "num_envs",
                message: "must be positive".to_owned(),
            }
            .into());
        }
        let [angle_min, angle_max] = config.initial_wheel_angle_range;
        if !angle_min.is_finite() || !angle_max.is_finite() || angle_min > angle_max {
            return Err(navci::Error::InvalidConfig {
                name: "initial_wheel_angle_range",
                message: format!("{angle_min} > {angle_max}"),
            }
            .into());
        }
        if pedestrian.width() != config.pedestrian_block_width {
            return Err(navci::Error::ShapeMismatch {
                what: "pedestrian block width",
                expected: config.pedestrian_block_width,
                actual: pedestrian.width(),
            }
            .into());
        }

        let preprocessor = RangeScanPreprocessor::new(config.scan)?;
        let pool = TemporalPoolBuffer::new(num_envs, config.scan.num_beams, config.pooling)?;
        let goal_projector =
            GoalProjector::new(config.goal_points(), num_envs, config.goal_projection)?;
        let layout = WheelJointLayout::from_joint_names(
            &config.joint_names,
            &config.left_wheel_joint,
            &config.right_wheel_joint,
        )?;
        let drive = DifferentialDriveSolver::new(config.drive, layout)?;
        let assembler =
            ObservationAssembler::new(pedestrian, pool.feature_width(), config.num_observations)?;
        let projector = ScanProjector::new(
            config.sensor_offset.transform(),
            config.min_visualized_points,
        );
        let termination = TerminationTerms {
            max_wheel_position: config.max_wheel_position,
            max_episode_length: config.max_episode_length(),
        };
        info!(
            num_envs,
            num_observations = config.num_observations,
            max_episode_length = termination.max_episode_length,
            "navigation task is ready"
        );

        Ok(Self {
            preprocessor,
            pool,
            goal_projector,
            drive,
            assembler,
            projector,
            reward_terms: config.rewards,
            termination,
            commands: vec![BaseCommand::default(); num_envs],
            episode_steps: vec![0; num_envs],
            config,
        })
    }

    pub fn config(&self) -> &NavigationTaskConfig {
        &self.config
    }

    pub fn num_envs(&self) -> usize {
        self.config.num_envs
    }

    pub fn num_observations(&self) -> usize {
        self.assembler.width()
    }

    pub fn commands(&self) -> &[BaseCommand] {
        &self.commands
    }

    pub fn episode_steps(&self) -> &[usize] {
        &self.episode_steps
    }

    pub fn pool(&self) -> &TemporalPoolBuffer {
        &self.pool
    }

    /// Stores the scaled `[linear, yaw_rate]` action of every instance.
    pub fn pre_physics_step(&mut self, actions: &[[f64; 2]]) -> Result<(), Error> {
        check_batch_len(self.num_envs(), actions.len())?;
        let scale = self.config.action_scale;
        for (command, action) in self.commands.iter_mut().zip(actions) {
            *command = BaseCommand::from_action(*action, scale);
        }
        trace!(commands = ?self.commands, "stored base commands");
        Ok(())
    }

    /// Sends the wheel effort targets of the stored commands.
    pub fn apply_action<A>(&self, articulation: &A) -> Result<(), Error>
    where
        A: Articulation + ?Sized,
    {
        let joint_count = articulation.joint_names().len();
        let expected = self.drive.layout().joint_count;
        if joint_count != expected {
            return Err(navci::Error::ShapeMismatch {
                what: "actuator width",
                expected,
                actual: joint_count,
            }
            .into());
        }
        let targets = self.drive.solve_batch(&self.commands, self.num_envs())?;
        articulation.set_joint_effort_targets(&targets)?;
        Ok(())
    }

    /// Preprocesses and pools the current scans, then assembles the policy
    /// observation of every instance.
    pub fn observations<S, A>(
        &mut self,
        sensor: &S,
        articulation: &A,
    ) -> Result<TaskObservation, Error>
    where
        S: RangeSensor + ?Sized,
        A: Articulation + ?Sized,
    {
        let num_envs = self.num_envs();
        let readings = sensor.current_readings()?;
        let root_states = articulation.root_states()?;
        check_batch_len(num_envs, root_states.len())?;

        let scans = self.preprocessor.process_batch(&readings);
        let pooled = self.pool.push(&scans);
        let goals = self.goal_projector.project(&root_states)?;
        let policy = self.assembler.assemble(&pooled, &goals)?;
        let world_scan_points = if scans.len() == num_envs {
            self.projector.project(&scans, &root_states)?
        } else {
            debug!(
                expected = num_envs,
                actual = scans.len(),
                "sensor readings do not cover every instance"
            );
            vec![None; num_envs]
        };

        Ok(TaskObservation {
            policy,
            pooling_flag: pooled.pooling_flag,
            world_scan_points,
        })
    }

    fn wheel_states<A>(&self, articulation: &A) -> Result<Vec<WheelState>, Error>
    where
        A: Articulation + ?Sized,
    {
        let positions = articulation.joint_positions()?;
        let velocities = articulation.joint_velocities()?;
        check_batch_len(self.num_envs(), positions.len())?;
        check_batch_len(self.num_envs(), velocities.len())?;

        let layout = self.drive.layout();
        positions
            .iter()
            .zip(&velocities)
            .map(|(q, qd)| -> Result<_, Error> {
                check_batch_len(layout.joint_count, q.len())?;
                check_batch_len(layout.joint_count, qd.len())?;
                Ok(WheelState {
                    left_position: q[layout.left],
                    left_velocity: qd[layout.left],
                    right_velocity: qd[layout.right],
                })
            })
            .collect()
    }

    /// Advances the episode counters and evaluates the episode end flags.
    pub fn dones<A>(&mut self, articulation: &A) -> Result<Dones, Error>
    where
        A: Articulation + ?Sized,
    {
        let wheels = self.wheel_states(articulation)?;
        for step in &mut self.episode_steps {
            *step += 1;
        }
        let dones = self.termination.evaluate(&wheels, &self.episode_steps);
        trace!(?dones, "evaluated dones");
        Ok(dones)
    }

    pub fn rewards<A>(&self, articulation: &A, dones: &Dones) -> Result<Vec<f64>, Error>
    where
        A: Articulation + ?Sized,
    {
        let wheels = self.wheel_states(articulation)?;
        Ok(self.reward_terms.compute(&wheels, &dones.terminated)?)
    }

    /// Puts the joints of `ids` back at rest, except the left wheel which is
    /// turned by a random angle within `initial_wheel_angle_range`.
    pub fn reset_joint_states<A, R>(
        &self,
        ids: &[usize],
        articulation: &A,
        rng: &mut R,
    ) -> Result<(), Error>
    where
        A: Articulation + ?Sized,
        R: Rng + ?Sized,
    {
        let layout = self.drive.layout();
        let [angle_min, angle_max] = self.config.initial_wheel_angle_range;
        let positions: Vec<_> = ids
            .iter()
            .map(|_| {
                let mut q = vec![0.0; layout.joint_count];
                q[layout.left] = rng.gen_range(angle_min * PI..=angle_max * PI);
                q
            })
            .collect();
        let velocities = vec![vec![0.0; layout.joint_count]; ids.len()];
        debug!(?ids, "writing initial joint states");
        articulation.write_joint_states(ids, &positions, &velocities)?;
        Ok(())
    }

    /// Clears the scan history, episode counter and pending command of `ids`.
    pub fn reset(&mut self, ids: &[usize]) -> Result<(), Error> {
        self.pool.reset(ids)?;
        for &i in ids {
            self.episode_steps[i] = 0;
            self.commands[i] = BaseCommand::default();
        }
        Ok(())
    }
}
