//! Environment collaborators
//!
//! Geometry queries, path search and actor tags are owned by the host. The
//! steering layer only talks to them through these traits.

mod queries;

pub use queries::{
    CapsuleSweep, CollisionChannel, CollisionQuery, CoverTags, Environment, ObjectTypes,
    OverlapHit, PathSearch, ProbeHit, RayProbe,
};
