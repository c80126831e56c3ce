use tracing::debug;

use crate::{Articulation, Error};

pub fn get_joint_index<A>(articulation: &A, joint_name: &str) -> Result<usize, Error>
where
    A: Articulation + ?Sized,
{
    find_joint_index(&articulation.joint_names(), joint_name)
}

pub fn find_joint_index(joint_names: &[String], joint_name: &str) -> Result<usize, Error> {
    let index = joint_names
        .iter()
        .position(|name| name == joint_name)
        .ok_or_else(|| Error::NoJoint(joint_name.to_owned()))?;
    debug!(joint_name, index, "resolved joint index");
    Ok(index)
}

/// Fails with [`Error::LengthMismatch`] unless a batch of collaborator data
/// has one entry per environment instance.
pub fn check_batch_len(num_instances: usize, len: usize) -> Result<(), Error> {
    if num_instances == len {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            model: num_instances,
            input: len,
        })
    }
}
