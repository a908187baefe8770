pub mod geojson_vt;
pub mod mvt;
pub mod tile;

pub use geojson_vt::*;
pub use mvt::MvtAdapter;
pub use tile::*;
