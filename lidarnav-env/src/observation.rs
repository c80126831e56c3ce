use lidarnav_perception::PoolingResult;
use nalgebra::Vector2;
use navci::{utils::check_batch_len, Error};
use tracing::trace;

use crate::PedestrianEncoder;

const GOAL_WIDTH: usize = 2;

/// Policy observations of every instance, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationBatch {
    width: usize,
    data: Vec<f64>,
}

impl ObservationBatch {
    pub fn zeros(num_instances: usize, width: usize) -> Self {
        Self {
            width,
            data: vec![0.0; num_instances * width],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn num_instances(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.data.len() / self.width
        }
    }

    pub fn row(&self, instance: usize) -> &[f64] {
        &self.data[instance * self.width..(instance + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.width.max(1))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Concatenates `[pedestrian | pooled scan | goal]` into one row per instance.
pub struct ObservationAssembler {
    pedestrian: Box<dyn PedestrianEncoder>,
    pooled_width: usize,
    width: usize,
}

impl std::fmt::Debug for ObservationAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationAssembler")
            .field("pedestrian_width", &self.pedestrian.width())
            .field("pooled_width", &self.pooled_width)
            .field("width", &self.width)
            .finish()
    }
}

impl ObservationAssembler {
    /// Fails unless the three blocks add up to `declared_width`.
    pub fn new(
        pedestrian: Box<dyn PedestrianEncoder>,
        pooled_width: usize,
        declared_width: usize,
    ) -> Result<Self, Error> {
        let width = pedestrian.width() + pooled_width + GOAL_WIDTH;
        if width != declared_width {
            return Err(Error::ShapeMismatch {
                what: "observation width",
                expected: declared_width,
                actual: width,
            });
        }
        Ok(Self {
            pedestrian,
            pooled_width,
            width,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Instances without a pooled feature this tick get an all-zero row.
    pub fn assemble(
        &self,
        pooled: &PoolingResult,
        goals: &[Vector2<f64>],
    ) -> Result<ObservationBatch, Error> {
        let num_instances = goals.len();
        check_batch_len(num_instances, pooled.ready().len())?;
        if pooled.feature_width() != self.pooled_width {
            return Err(Error::ShapeMismatch {
                what: "pooled feature width",
                expected: self.pooled_width,
                actual: pooled.feature_width(),
            });
        }

        let mut batch = ObservationBatch::zeros(num_instances, self.width);
        let ped_width = self.pedestrian.width();
        for (instance, (row, goal)) in batch
            .data
            .chunks_exact_mut(self.width)
            .zip(goals)
            .enumerate()
        {
            let Some(feature) = pooled.feature(instance) else {
                continue;
            };
            let (ped, rest) = row.split_at_mut(ped_width);
            let (scan, goal_out) = rest.split_at_mut(self.pooled_width);
            self.pedestrian.encode(instance, ped);
            scan.copy_from_slice(feature);
            goal_out.copy_from_slice(goal.as_slice());
        }
        trace!(num_instances, "assembled observations");
        Ok(batch)
    }
}

#[cfg(test)]
mod test {
    use lidarnav_perception::{Scan, TemporalPoolBuffer, TemporalPoolConfig};

    use super::*;
    use crate::ZeroPedestrianEncoder;

    fn config() -> TemporalPoolConfig {
        TemporalPoolConfig {
            depth: 2,
            num_bins: 2,
            replicas: 1,
            ..Default::default()
        }
    }

    fn scan(value: f64) -> Scan {
        Scan {
            points: vec![Default::default(); 4],
            ranges: vec![value; 4],
        }
    }

    fn assembler() -> ObservationAssembler {
        ObservationAssembler::new(Box::new(ZeroPedestrianEncoder::new(3)), 8, 13).unwrap()
    }

    #[test]
    fn test_width_must_match() {
        let result = ObservationAssembler::new(Box::new(ZeroPedestrianEncoder::new(3)), 8, 12);
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 12,
                actual: 13,
                ..
            })
        ));
    }

    #[test]
    fn test_rows_are_zero_until_ready() {
        let assembler = assembler();
        let goals = [Vector2::new(0.5, -1.0), Vector2::new(1.0, 1.0)];
        let mut buffer = TemporalPoolBuffer::new(2, 4, config()).unwrap();

        let pooled = buffer.push(&[scan(15.0), scan(15.0)]);
        let batch = assembler.assemble(&pooled, &goals).unwrap();
        assert_eq!(batch.num_instances(), 2);
        assert_eq!(batch.width(), 13);
        assert!(batch.as_slice().iter().all(|v| *v == 0.0));

        let pooled = buffer.push(&[scan(15.0), scan(15.0)]);
        let batch = assembler.assemble(&pooled, &goals).unwrap();
        let row = batch.row(0);
        assert_eq!(&row[..3], &[0.0; 3]);
        assert!(row[3..11].iter().all(|v| *v == 0.0));
        assert_eq!(&row[11..], &[0.5, -1.0]);
        assert_eq!(&batch.row(1)[11..], &[1.0, 1.0]);
    }

    #[test]
    fn test_partially_ready_batch() {
        let assembler = assembler();
        let goals = [Vector2::new(0.5, -1.0), Vector2::new(1.0, 1.0)];
        let mut buffer = TemporalPoolBuffer::new(2, 4, config()).unwrap();
        buffer.push(&[scan(3.0), scan(3.0)]);
        buffer.reset(&[1]).unwrap();

        let pooled = buffer.push(&[scan(3.0), scan(3.0)]);
        let batch = assembler.assemble(&pooled, &goals).unwrap();
        assert!(!pooled.pooling_flag);
        assert_eq!(&batch.row(0)[11..], &[0.5, -1.0]);
        assert!(batch.row(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_goal_count_must_match() {
        let mut buffer = TemporalPoolBuffer::new(2, 4, config()).unwrap();
        let pooled = buffer.push(&[scan(3.0), scan(3.0)]);
        assert!(assembler()
            .assemble(&pooled, &[Vector2::new(0.0, 0.0)])
            .is_err());
    }
}
