use crate::WheelState;

/// Episode end flags of every instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dones {
    pub terminated: Vec<bool>,
    pub time_out: Vec<bool>,
}

impl Dones {
    /// Instances whose episode ended for either reason.
    pub fn reset_ids(&self) -> Vec<usize> {
        self.terminated
            .iter()
            .zip(&self.time_out)
            .enumerate()
            .filter(|(_, (t, o))| **t || **o)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminationTerms {
    pub max_wheel_position: f64,
    pub max_episode_length: usize,
}

impl TerminationTerms {
    pub fn is_terminated(&self, wheels: &WheelState) -> bool {
        wheels.left_position.abs() > self.max_wheel_position
    }

    pub fn is_time_out(&self, episode_step: usize) -> bool {
        episode_step + 1 >= self.max_episode_length
    }

    pub fn evaluate(&self, wheels: &[WheelState], episode_steps: &[usize]) -> Dones {
        Dones {
            terminated: wheels.iter().map(|w| self.is_terminated(w)).collect(),
            time_out: episode_steps.iter().map(|s| self.is_time_out(*s)).collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_termination() {
        let terms = TerminationTerms {
            max_wheel_position: 40.0,
            max_episode_length: 30720,
        };
        let wheel = |p| WheelState {
            left_position: p,
            ..Default::default()
        };
        assert!(!terms.is_terminated(&wheel(40.0)));
        assert!(terms.is_terminated(&wheel(-40.5)));
        assert!(!terms.is_time_out(30718));
        assert!(terms.is_time_out(30719));

        let dones = terms.evaluate(&[wheel(0.0), wheel(41.0), wheel(0.0)], &[0, 0, 30719]);
        assert_eq!(dones.terminated, vec![false, true, false]);
        assert_eq!(dones.time_out, vec![false, false, true]);
        assert_eq!(dones.reset_ids(), vec![1, 2]);
    }
}
