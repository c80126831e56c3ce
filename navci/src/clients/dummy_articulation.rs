use std::sync::Mutex;

use crate::{
    error::Error,
    traits::{Articulation, JointEffortTargets, RootState},
    utils::check_batch_len,
};

#[derive(Debug)]
pub struct DummyArticulation {
    pub joint_names: Vec<String>,
    pub root_states: Mutex<Vec<RootState>>,
    pub joint_positions: Mutex<Vec<Vec<f64>>>,
    pub joint_velocities: Mutex<Vec<Vec<f64>>>,
    pub effort_targets: Mutex<Option<JointEffortTargets>>,
}

impl DummyArticulation {
    /// Creates `num_instances` robots at the origin with every joint at rest.
    pub fn new(joint_names: Vec<String>, num_instances: usize) -> Self {
        let dof = joint_names.len();
        Self {
            joint_names,
            root_states: Mutex::new(vec![RootState::default(); num_instances]),
            joint_positions: Mutex::new(vec![vec![0.0; dof]; num_instances]),
            joint_velocities: Mutex::new(vec![vec![0.0; dof]; num_instances]),
            effort_targets: Mutex::new(None),
        }
    }

    pub fn set_root_states(&self, states: Vec<RootState>) {
        *self.root_states.lock().unwrap() = states;
    }

    pub fn set_joint_state(&self, positions: Vec<Vec<f64>>, velocities: Vec<Vec<f64>>) {
        *self.joint_positions.lock().unwrap() = positions;
        *self.joint_velocities.lock().unwrap() = velocities;
    }

    /// The last targets passed to [`Articulation::set_joint_effort_targets`].
    pub fn last_effort_targets(&self) -> Option<JointEffortTargets> {
        self.effort_targets.lock().unwrap().clone()
    }
}

impl Articulation for DummyArticulation {
    fn joint_names(&self) -> Vec<String> {
        self.joint_names.clone()
    }

    fn root_states(&self) -> Result<Vec<RootState>, Error> {
        Ok(self.root_states.lock().unwrap().clone())
    }

    fn joint_positions(&self) -> Result<Vec<Vec<f64>>, Error> {
        Ok(self.joint_positions.lock().unwrap().clone())
    }

    fn joint_velocities(&self) -> Result<Vec<Vec<f64>>, Error> {
        Ok(self.joint_velocities.lock().unwrap().clone())
    }

    fn set_joint_effort_targets(&self, targets: &JointEffortTargets) -> Result<(), Error> {
        if targets.joint_count() != self.joint_names.len() {
            return Err(Error::LengthMismatch {
                model: self.joint_names.len(),
                input: targets.joint_count(),
            });
        }
        *self.effort_targets.lock().unwrap() = Some(targets.clone());
        Ok(())
    }

    fn write_joint_states(
        &self,
        instances: &[usize],
        positions: &[Vec<f64>],
        velocities: &[Vec<f64>],
    ) -> Result<(), Error> {
        check_batch_len(instances.len(), positions.len())?;
        check_batch_len(instances.len(), velocities.len())?;
        let dof = self.joint_names.len();
        for row in positions.iter().chain(velocities) {
            check_batch_len(dof, row.len())?;
        }
        let mut current_positions = self.joint_positions.lock().unwrap();
        let mut current_velocities = self.joint_velocities.lock().unwrap();
        let num_instances = current_positions.len();
        if let Some(&index) = instances.iter().find(|&&i| i >= num_instances) {
            return Err(Error::InstanceOutOfRange {
                index,
                num_instances,
            });
        }
        for (k, &i) in instances.iter().enumerate() {
            current_positions[i].clone_from(&positions[k]);
            current_velocities[i].clone_from(&velocities[k]);
        }
        Ok(())
    }
}
