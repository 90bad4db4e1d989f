use crate::session::{MeasurementSession, Mode};
use crate::types::{Customer, Services};
use anyhow::{anyhow, Context, Result};
use geo::Coord;
use serde::Deserialize;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One estimate job as the operator writes it: customer details, service
/// selections, and the traced property boundary, either inline or in a
/// GeoJSON file exported from a mapping tool.
#[derive(Debug, Deserialize)]
pub struct EstimateJob {
    pub customer: Customer,
    #[serde(default)]
    pub pricing: JobPricing,
    #[serde(default)]
    pub services: Services,
    #[serde(default)]
    pub polygons: Vec<JobPolygon>,
    /// Path to a GeoJSON boundary file, resolved relative to the job file.
    pub boundary_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobPricing {
    /// Overrides the configured default rate when set.
    pub rate_per_sq_ft: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct JobPolygon {
    /// Vertices as `[lat, lng]` pairs, in click order.
    pub points: Vec<[f64; 2]>,
}

pub fn load_job(path: &Path) -> Result<EstimateJob> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file: {:?}", path))?;
    let job: EstimateJob =
        toml::from_str(&content).with_context(|| "Failed to parse TOML job file")?;
    Ok(job)
}

/// Collect every traced ring of the job: inline polygons first, then the
/// boundary file if one is named.
pub fn job_rings(job: &EstimateJob, job_path: &Path) -> Result<Vec<Vec<Coord<f64>>>> {
    let mut rings: Vec<Vec<Coord<f64>>> = job
        .polygons
        .iter()
        .map(|polygon| {
            polygon
                .points
                .iter()
                .map(|[lat, lng]| Coord { x: *lng, y: *lat })
                .collect()
        })
        .collect();

    if let Some(boundary) = &job.boundary_file {
        let resolved = match job_path.parent() {
            Some(dir) if boundary.is_relative() => dir.join(boundary),
            _ => boundary.clone(),
        };
        rings.extend(load_boundary_rings(&resolved)?);
    }

    Ok(rings)
}

/// Replay the job's rings through a measuring session, as if each had been
/// clicked out on the map. Batch jobs get the same minimum-vertex check
/// and the same per-ring area contract as interactive tracing.
pub fn session_from_rings(rings: Vec<Vec<Coord<f64>>>) -> Result<MeasurementSession> {
    let mut session = MeasurementSession::new();
    session.set_mode(Mode::Draw);
    for (index, ring) in rings.into_iter().enumerate() {
        for point in ring {
            session
                .append_point(point)
                .map_err(|e| anyhow!("polygon {}: {}", index + 1, e))?;
        }
        session
            .finish_polygon()
            .map_err(|e| anyhow!("polygon {}: {}", index + 1, e))?;
    }
    session.set_mode(Mode::View);
    Ok(session)
}

fn load_boundary_rings(path: &Path) -> Result<Vec<Vec<Coord<f64>>>> {
    use geojson::GeoJson;
    use std::io::BufReader;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Boundary file has no extension"))?;
    if extension != "json" && extension != "geojson" {
        return Err(anyhow!("Unsupported boundary format: {}", extension));
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open boundary file: {:?}", path))?;
    let reader = BufReader::new(file);
    let geojson = GeoJson::from_reader(reader).context("Failed to parse boundary GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Boundary GeoJSON must be a FeatureCollection")),
    };

    let mut rings = Vec::new();

    for feature in collection.features {
        let geometry = match feature.geometry {
            Some(geometry) => {
                let converted: geo::Geometry<f64> = geometry
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert boundary geometry: {:?}", e))?;
                converted
            }
            None => continue,
        };

        match geometry {
            geo::Geometry::Polygon(polygon) => rings.push(exterior_ring(&polygon)),
            geo::Geometry::MultiPolygon(multi) => {
                for polygon in &multi {
                    rings.push(exterior_ring(polygon));
                }
            }
            _ => continue, // skip points/lines
        }
    }

    Ok(rings)
}

/// Exterior ring as click points: GeoJSON rings repeat the first vertex at
/// the end, which a traced path never does.
fn exterior_ring(polygon: &geo::Polygon<f64>) -> Vec<Coord<f64>> {
    let mut ring = polygon.exterior().0.clone();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inline_polygons_replay_into_a_session() {
        let job: EstimateJob = toml::from_str(
            r#"
            [customer]
            name = "Pat Doyle"
            address = "12 Ocean Dr"

            [[polygons]]
            points = [[26.1224, -80.1373], [26.1225, -80.1373], [26.1225, -80.1372], [26.1224, -80.1372]]
            "#,
        )
        .unwrap();

        let rings = job_rings(&job, Path::new("job.toml")).unwrap();
        assert_eq!(rings.len(), 1);
        // [lat, lng] pairs land as x = lng, y = lat.
        assert_eq!(rings[0][0], Coord { x: -80.1373, y: 26.1224 });

        let session = session_from_rings(rings).unwrap();
        assert_eq!(session.finished_polygons().len(), 1);
        assert!(session.total_area_sq_ft() > 0);
        assert!(job.services.mowing);
        assert!(job.pricing.rate_per_sq_ft.is_none());
    }

    #[test]
    fn short_rings_fail_the_replay() {
        let rings = vec![vec![
            Coord { x: -80.1373, y: 26.1224 },
            Coord { x: -80.1372, y: 26.1224 },
        ]];
        let err = session_from_rings(rings).unwrap_err();
        assert!(err.to_string().contains("polygon 1"));
    }

    #[test]
    fn boundary_file_rings_drop_the_closing_vertex() {
        let mut file = tempfile::Builder::new()
            .suffix(".geojson")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"{{"type":"FeatureCollection","features":[{{"type":"Feature","properties":{{}},
                "geometry":{{"type":"Polygon","coordinates":[[
                    [-80.1373,26.1224],[-80.1372,26.1224],[-80.1372,26.1225],
                    [-80.1373,26.1225],[-80.1373,26.1224]
                ]]}}}}]}}"#
        )
        .unwrap();

        let rings = load_boundary_rings(file.path()).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
        assert_ne!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn non_geojson_boundaries_are_rejected() {
        let err = load_boundary_rings(Path::new("boundary.shp")).unwrap_err();
        assert!(err.to_string().contains("Unsupported boundary format"));
    }
}
