use anyhow::{bail, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::transform::transform;
use proj4rs::Proj;

use crate::layer::RefFrame;

fn proj_for(frame: RefFrame) -> Result<Proj> {
    let def = match frame {
        RefFrame::WGS84 => "+proj=longlat +datum=WGS84 +no_defs",
        RefFrame::WEB_MERCATOR => {
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs"
        }
        RefFrame(other) => bail!("unsupported reference frame EPSG:{other}"),
    };
    Ok(Proj::from_proj_string(def)?)
}

/// Reproject a geometry between reference frames. Same-frame calls are a
/// clone; geographic frames convert through radians as proj expects.
pub fn reproject(
    geom: &MultiPolygon<f64>,
    from: RefFrame,
    to: RefFrame,
) -> Result<MultiPolygon<f64>> {
    if from == to {
        return Ok(geom.clone());
    }
    let src = proj_for(from)?;
    let dst = proj_for(to)?;

    geom.try_map_coords(|coord| -> Result<Coord<f64>> {
        let mut point = if src.is_latlong() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&src, &dst, &mut point)?;
        let (x, y) = if dst.is_latlong() {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };
        Ok(Coord { x, y })
    })
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    #[test]
    fn same_frame_is_identity() {
        let geom = MultiPolygon(vec![polygon![
            (x: 10.0, y: 20.0),
            (x: 11.0, y: 20.0),
            (x: 11.0, y: 21.0),
            (x: 10.0, y: 20.0),
        ]]);
        let out = reproject(&geom, RefFrame::WEB_MERCATOR, RefFrame::WEB_MERCATOR).unwrap();
        assert_eq!(out, geom);
    }

    #[test]
    fn lonlat_origin_maps_to_mercator_origin() {
        let geom = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 0.001, y: 0.0),
            (x: 0.001, y: 0.001),
            (x: 0.0, y: 0.0),
        ]]);
        let out = reproject(&geom, RefFrame::WGS84, RefFrame::WEB_MERCATOR).unwrap();
        let first = out.0[0].exterior().0[0];
        assert!(first.x.abs() < 1e-6);
        assert!(first.y.abs() < 1e-6);
    }

    #[test]
    fn unsupported_frame_is_an_error() {
        let geom = MultiPolygon(vec![]);
        assert!(reproject(&geom, RefFrame(9999), RefFrame::WEB_MERCATOR).is_err());
    }
}
