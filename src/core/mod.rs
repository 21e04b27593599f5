pub mod dataset;
pub mod geometry;
pub mod scale;
pub mod study;
pub mod types;

pub use dataset::ResultDataset;
pub use geometry::{exterior_bounds, exterior_rings, polygon_vertex_count};
pub use scale::LinearScale;
pub use study::{
    ClientConfig, Country, CreateStudyRequest, Customer, CustomerId, StudyDraft, StudyId,
    StudyRecord,
};
pub use types::{BoundsAccumulator, LngLat, LngLatBounds, MapView};
