use crate::error::{Result, WeatherError};
use crate::models::{BoundingBox, Point, PointSet};
use validator::Validate;

/// Convert DMS (Degrees:Minutes:Seconds) format to decimal degrees
///
/// # Examples
/// ```
/// use weather_extractor::utils::dms_to_decimal;
///
/// let decimal = dms_to_decimal("46:09:04").unwrap();
/// assert!((decimal - 46.151111).abs() < 0.000001);
/// ```
pub fn dms_to_decimal(dms: &str) -> Result<f64> {
    let parts: Vec<&str> = dms.split(':').collect();

    if parts.len() != 3 {
        return Err(WeatherError::InvalidCoordinate(format!(
            "Invalid DMS format: '{}'. Expected format: 'DD:MM:SS'",
            dms
        )));
    }

    let is_negative = dms.starts_with('-');

    let degrees = parts[0].parse::<f64>().map_err(|_| {
        WeatherError::InvalidCoordinate(format!("Invalid degrees value: '{}'", parts[0]))
    })?;

    let minutes = parts[1].parse::<f64>().map_err(|_| {
        WeatherError::InvalidCoordinate(format!("Invalid minutes value: '{}'", parts[1]))
    })?;

    let seconds = parts[2].parse::<f64>().map_err(|_| {
        WeatherError::InvalidCoordinate(format!("Invalid seconds value: '{}'", parts[2]))
    })?;

    if !(0.0..60.0).contains(&minutes) {
        return Err(WeatherError::InvalidCoordinate(format!(
            "Minutes must be between 0 and 60, got: {}",
            minutes
        )));
    }

    if !(0.0..60.0).contains(&seconds) {
        return Err(WeatherError::InvalidCoordinate(format!(
            "Seconds must be between 0 and 60, got: {}",
            seconds
        )));
    }

    let decimal_value = degrees.abs() + minutes / 60.0 + seconds / 3600.0;

    if is_negative {
        Ok(-decimal_value)
    } else {
        Ok(decimal_value)
    }
}

/// Parse coordinate that might be in DMS or decimal format
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();

    if !trimmed.contains(':') {
        trimmed.parse::<f64>().map_err(|_| {
            WeatherError::InvalidCoordinate(format!("Invalid coordinate value: '{}'", coord_str))
        })
    } else {
        dms_to_decimal(trimmed)
    }
}

/// Parse a `LAT,LON` pair into a validated point
pub fn parse_point(value: &str) -> Result<Point> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 2 {
        return Err(WeatherError::InvalidCoordinate(format!(
            "Invalid point: '{}'. Expected format: 'LAT,LON'",
            value
        )));
    }

    let point = Point::new(parse_coordinate(parts[0])?, parse_coordinate(parts[1])?);
    point.validate()?;
    Ok(point)
}

/// Parse `LAT1,LON1,LAT2,LON2` into a bounding box; corner order does not matter
pub fn parse_bounding_box(value: &str) -> Result<BoundingBox> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 4 {
        return Err(WeatherError::InvalidCoordinate(format!(
            "Invalid bounding box: '{}'. Expected format: 'LAT1,LON1,LAT2,LON2'",
            value
        )));
    }

    let coords = parts
        .iter()
        .map(|part| parse_coordinate(part))
        .collect::<Result<Vec<f64>>>()?;

    BoundingBox::from_corners(
        Point::new(coords[0], coords[1]),
        Point::new(coords[2], coords[3]),
    )
}

fn squared_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    (lat1 - lat2).powi(2) + (lon1 - lon2).powi(2)
}

/// For each source point, the index of the closest target point by squared
/// euclidean distance in degrees. Ties go to the first target in order.
pub fn nearest(source: &PointSet, target: &PointSet) -> Result<Vec<usize>> {
    if target.is_empty() {
        return Err(WeatherError::validation(
            "nearest neighbour lookup needs at least one target point",
        ));
    }

    let closest = source
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = squared_distance(p.lat, p.lon, target.lats[0], target.lons[0]);
            for j in 1..target.len() {
                let dist = squared_distance(p.lat, p.lon, target.lats[j], target.lons[j]);
                if dist < best_dist {
                    best_dist = dist;
                    best = j;
                }
            }
            best
        })
        .collect();

    Ok(closest)
}
