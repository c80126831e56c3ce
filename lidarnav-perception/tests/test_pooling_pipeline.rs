use lidarnav_perception::{
    pool_frames, PoolState, RangeScanPreprocessor, ScanPreprocessorConfig, TemporalPoolBuffer,
    TemporalPoolConfig,
};
use navci::{IndexMap, RangeSensor, RawScan, Vector3};

const NUM_INSTANCES: usize = 2;

/// 1000 returns of which 400 lie in the scan plane, ranges in `[0.5, 29.5]`.
fn sensor_reading(seed: usize) -> RawScan {
    let points: Vec<_> = (0..1000)
        .map(|i| {
            let z = if i % 5 < 2 { 0.015 } else { -0.4 };
            Vector3::new(1.0, 0.0, z)
        })
        .collect();
    let ranges = (0..1000)
        .map(|i| 0.5 + ((i * 7 + seed * 13) % 30) as f64)
        .collect();
    RawScan::new(points, ranges)
}

fn readings(tick: usize) -> IndexMap<String, RawScan> {
    (0..NUM_INSTANCES)
        .map(|i| (format!("env_{i}/lidar"), sensor_reading(tick + i)))
        .collect()
}

#[test]
fn test_pooling_after_depth_ticks() {
    let preprocessor = RangeScanPreprocessor::new(ScanPreprocessorConfig::default()).unwrap();
    let mut buffer =
        TemporalPoolBuffer::new(NUM_INSTANCES, 720, TemporalPoolConfig::default()).unwrap();

    for tick in 0..9 {
        let scans = preprocessor.process_batch(&readings(tick));
        assert!(scans.iter().all(|s| s.points.len() == 720 && s.ranges.len() == 720));
        let result = buffer.push(&scans);
        assert!(!result.pooling_flag, "tick {tick}");
        assert_eq!(buffer.len(0), tick + 1);
    }

    for tick in 9..15 {
        let scans = preprocessor.process_batch(&readings(tick));
        let result = buffer.push(&scans);
        assert!(result.pooling_flag, "tick {tick}");
        assert!((0..NUM_INSTANCES).all(|i| buffer.state(i) == PoolState::Ready));
        assert_eq!(buffer.len(1), 9);
        for i in 0..NUM_INSTANCES {
            let feature = result.feature(i).unwrap();
            assert_eq!(feature.len(), 6400);
            assert!(feature.iter().all(|v| (-1.0..=1.0).contains(v)));
            assert_eq!(&feature[..1600], &feature[4800..]);
        }
    }
}

#[test]
fn test_min_never_exceeds_mean() {
    let preprocessor = RangeScanPreprocessor::new(ScanPreprocessorConfig::default()).unwrap();
    let scans: Vec<_> = (0..10)
        .map(|tick| preprocessor.process(&sensor_reading(tick)))
        .collect();
    let mut grid = vec![0.0; TemporalPoolConfig::default().grid_len()];
    pool_frames(scans.iter().map(|s| s.ranges.as_slice()), 80, &mut grid).unwrap();
    for rows in grid.chunks_exact(2 * 80) {
        let (mins, means) = rows.split_at(80);
        for (min, mean) in mins.iter().zip(means) {
            assert!(min <= mean);
            assert!((0.0..=30.0).contains(min));
        }
    }
}

#[test]
fn test_empty_reading_restarts_every_history() {
    let preprocessor = RangeScanPreprocessor::new(ScanPreprocessorConfig::default()).unwrap();
    let mut buffer =
        TemporalPoolBuffer::new(NUM_INSTANCES, 720, TemporalPoolConfig::default()).unwrap();
    for tick in 0..10 {
        buffer.push(&preprocessor.process_batch(&readings(tick)));
    }
    assert_eq!(buffer.state(0), PoolState::Ready);

    let sensor = navci::DummyRangeSensor::new(readings(10));
    let mut current = sensor.current_readings().unwrap();
    current[1] = RawScan::default();
    let result = buffer.push(&preprocessor.process_batch(&current));
    assert!(result.is_skipped());
    assert!(!result.pooling_flag);
    assert_eq!(buffer.len(0), 0);
    assert_eq!(buffer.len(1), 0);

    for tick in 11..20 {
        let result = buffer.push(&preprocessor.process_batch(&readings(tick)));
        assert!(!result.pooling_flag, "tick {tick}");
    }
    assert!(buffer.push(&preprocessor.process_batch(&readings(20))).pooling_flag);
}

#[test]
fn test_pool_frames_rejects_oversized_history() {
    let frames = vec![vec![1.0; 720]; 11];
    let mut grid = vec![0.0; TemporalPoolConfig::default().grid_len()];
    assert!(pool_frames(&frames, 80, &mut grid).is_err());
    assert!(pool_frames([vec![1.0; 40]], 80, &mut grid).is_err());
    assert!(pool_frames(&frames[..10], 80, &mut grid).is_ok());
}
