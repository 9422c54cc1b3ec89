mod proj;
mod shp;

pub use proj::reproject;
pub use shp::{find_shapefile_in_folder, load_layer, polygon_to_geo};
