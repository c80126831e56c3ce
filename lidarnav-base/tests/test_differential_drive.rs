use std::sync::Arc;

use assert_approx_eq::assert_approx_eq;
use lidarnav_base::{differential_drive::*, VelocityTransformer};
use navci::{Articulation, BaseCommand, DummyArticulation};

fn carter_joint_names() -> Vec<String> {
    [
        "joint_caster_base",
        "joint_wheel_left",
        "joint_wheel_right",
        "joint_caster_left",
        "joint_caster_right",
        "joint_swing_left",
        "joint_swing_right",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn test_diff_drive() {
    const ACTION_SCALE: f64 = 0.5;

    let robot = Arc::new(DummyArticulation::new(carter_joint_names(), 3));
    let layout = WheelJointLayout::from_joint_names(
        &robot.joint_names(),
        "joint_wheel_left",
        "joint_wheel_right",
    )
    .unwrap();
    let dd = DifferentialDriveSolver::new(DifferentialDriveParameters::default(), layout).unwrap();

    let commands: Vec<_> = [[1.0, -1.0], [1.0, 0.0], [0.0, 1.0]]
        .into_iter()
        .map(|a| BaseCommand::from_action(a, ACTION_SCALE))
        .collect();
    let targets = dd.solve_batch(&commands, 3).unwrap();
    robot.set_joint_effort_targets(&targets).unwrap();

    let sent = robot.last_effort_targets().unwrap();
    assert_eq!(sent.joint_count(), 7);
    assert_approx_eq!(sent.row(0)[1], 63.3465, 1e-9);
    assert_approx_eq!(sent.row(0)[2], 41.6535, 1e-9);

    // Driving straight: both wheels get the same target.
    assert_eq!(sent.row(1)[1], sent.row(1)[2]);
    assert_approx_eq!(sent.row(1)[1], 52.5);

    // Turning in place: wheels get opposite targets.
    assert_eq!(sent.row(2)[1], -sent.row(2)[2]);

    for row in sent.rows() {
        for (j, v) in row.iter().enumerate() {
            if j != 1 && j != 2 {
                assert_eq!(*v, 0.0);
            }
        }
    }

    let wheels = dd.transform_velocity_base_to_wheel(&commands[0]);
    let back = dd.transform_velocity_wheel_to_base(&wheels);
    assert_approx_eq!(back.linear, commands[0].linear);
    assert_approx_eq!(back.yaw_rate, commands[0].yaw_rate);

    assert!(dd.solve_batch(&commands, 4).is_err());
}
