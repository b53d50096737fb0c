//! Convex winding kernel and coplanar face merging for BSP map compilers.
//!
//! The crate has three layers:
//!
//! - [`Winding`]: convex polygons on a plane, with base-winding creation,
//!   clipping and dividing against arbitrary planes.
//! - [`FaceMerger`]: joins adjacent coplanar [`Face`]s with identical surface
//!   attributes into larger convex faces.
//! - [`bsp::BspTree::merge_all`]: runs the merger over every node of a BSP
//!   tree on the rayon pool and re-subdivides the results with a
//!   [`Subdivider`].
//!
//! Planes are shared through a [`PlaneTable`] and referenced by [`PlaneId`].
//! Windings are wound counter-clockwise when viewed from the front of their
//! plane.

pub mod bsp;

mod config;
mod cuttable;
mod error;
mod face;
mod merge;
mod plane;
mod sphere;
mod subdivide;
mod winding;

pub use config::{MergeConfig, CONTINUOUS_EPSILON, MAX_EDGES};
pub use cuttable::Cuttable;
pub use error::{GeometryError, MergeError, Result};
pub use face::{Contents, Face, FaceSide, SurfaceAttributes, TexInfoId};
pub use merge::FaceMerger;
pub use plane::{
    Classification, Plane3D, PlaneId, PlaneSide, PlaneTable, DIST_EPSILON, NORMAL_EPSILON,
    ON_EPSILON,
};
pub use sphere::BoundingSphere;
pub use subdivide::{AxialSubdivider, NoSubdivision, Subdivider, SUBDIVIDE_SIZE};
pub use winding::{
    Winding, BASE_WINDING_HALF_SIZE, BOGUS_RANGE, MAX_POINTS_ON_WINDING,
};
