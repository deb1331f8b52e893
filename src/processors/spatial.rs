use crate::error::{Result, WeatherError};
use crate::models::{AggLoc, AggPolicy, BoundingBox, Point, PointSet, WeatherRecord};
use crate::utils::constants::{COUNTRY_CENTROID_LAT, COUNTRY_CENTROID_LON, EMPTY_TARGET_VALUE};
use crate::utils::coordinates::nearest;
use tracing::debug;

/// Precomputed mapping from a native grid onto a target point set.
struct Mapping {
    targets: PointSet,
    policy: AggPolicy,
    /// Native grid indices taking part in the reduction
    sources: Vec<usize>,
    /// One: nearest source position per target. Mean: nearest target per source.
    closest: Vec<usize>,
    grid_len: usize,
}

impl Mapping {
    fn apply(&self, values: &[f64]) -> Vec<f64> {
        match self.policy {
            AggPolicy::One => self
                .closest
                .iter()
                .map(|&source| values[self.sources[source]])
                .collect(),
            AggPolicy::Mean => {
                let mut sums = vec![0.0; self.targets.len()];
                let mut counts = vec![0usize; self.targets.len()];
                for (&source, &target) in self.sources.iter().zip(&self.closest) {
                    sums[target] += values[source];
                    counts[target] += 1;
                }
                sums.into_iter()
                    .zip(counts)
                    .map(|(sum, count)| {
                        if count == 0 {
                            EMPTY_TARGET_VALUE
                        } else {
                            sum / count as f64
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Reduces message grids onto a smaller set of target points.
pub struct SpatialAggregator {
    country: Point,
}

impl SpatialAggregator {
    pub fn new() -> Self {
        Self {
            country: Point::new(COUNTRY_CENTROID_LAT, COUNTRY_CENTROID_LON),
        }
    }

    pub fn with_country(country: Point) -> Self {
        Self { country }
    }

    /// Aggregate with the default policy of the location mode.
    pub fn aggregate(&self, records: Vec<WeatherRecord>, aggloc: &AggLoc) -> Result<Vec<WeatherRecord>> {
        self.aggregate_with_policy(records, aggloc, aggloc.default_policy())
    }

    pub fn aggregate_with_policy(
        &self,
        records: Vec<WeatherRecord>,
        aggloc: &AggLoc,
        policy: AggPolicy,
    ) -> Result<Vec<WeatherRecord>> {
        if records.is_empty() {
            return Err(WeatherError::validation("no records to aggregate"));
        }
        aggloc.validate()?;

        if let AggLoc::Grid = aggloc {
            return Ok(records);
        }

        let mapping = self.build_mapping(&records[0].grid, aggloc, policy)?;
        debug!(
            "Aggregating {} records onto {} {} target(s) with {:?} policy",
            records.len(),
            mapping.targets.len(),
            aggloc.name(),
            policy
        );

        records
            .into_iter()
            .map(|record| {
                if record.grid.len() != mapping.grid_len || record.values.len() != mapping.grid_len {
                    return Err(WeatherError::validation(format!(
                        "grid of '{}' at {} has {} points, expected {}",
                        record.short_name,
                        record.validity_date_time,
                        record.values.len(),
                        mapping.grid_len
                    )));
                }

                Ok(WeatherRecord {
                    values: mapping.apply(&record.values),
                    grid: mapping.targets.clone(),
                    ..record
                })
            })
            .collect()
    }

    fn build_mapping(&self, grid: &PointSet, aggloc: &AggLoc, policy: AggPolicy) -> Result<Mapping> {
        let (targets, sources) = match aggloc {
            AggLoc::Grid => (grid.clone(), (0..grid.len()).collect()),
            AggLoc::Points(points) => (PointSet::from_points(points), (0..grid.len()).collect()),
            AggLoc::Country => (PointSet::single(self.country), (0..grid.len()).collect()),
            AggLoc::BoundingBox(bbox) => {
                if policy != AggPolicy::Mean {
                    return Err(WeatherError::validation(
                        "bounding box aggregation requires the mean policy",
                    ));
                }
                (PointSet::single(bbox.midpoint()), Self::points_in_box(grid, bbox)?)
            }
        };

        let source_points = grid.select(&sources);
        let closest = match policy {
            AggPolicy::One => nearest(&targets, &source_points)?,
            AggPolicy::Mean => nearest(&source_points, &targets)?,
        };

        Ok(Mapping {
            targets,
            policy,
            sources,
            closest,
            grid_len: grid.len(),
        })
    }

    /// Indices of the grid points inside the box. The box has to lie within
    /// the grid's extent and contain at least one point.
    fn points_in_box(grid: &PointSet, bbox: &BoundingBox) -> Result<Vec<usize>> {
        let extent = grid
            .bounds()
            .ok_or_else(|| WeatherError::validation("records carry an empty grid"))?;
        if !bbox.is_within(extent) {
            return Err(WeatherError::validation("bounding box must be within data area"));
        }

        let inside: Vec<usize> = grid
            .iter()
            .enumerate()
            .filter(|(_, point)| bbox.contains(*point))
            .map(|(i, _)| i)
            .collect();

        if inside.is_empty() {
            return Err(WeatherError::validation("bounding box contains no points"));
        }
        Ok(inside)
    }
}

impl Default for SpatialAggregator {
    fn default() -> Self {
        Self::new()
    }
}
