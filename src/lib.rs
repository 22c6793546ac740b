//! transvoxel_core — a framework-independent voxel polygonization core.
//!
//! This crate owns two things: a block-partitioned, run-length-compressed
//! voxel grid ([`grid::VoxelGrid`]), and a Transvoxel polygonizer that
//! turns it into an LOD hierarchy of triangle meshes with seamless
//! transition cells between levels ([`polygonize`]).
//!
//! # Example
//!
//! ```ignore
//! use transvoxel_core::config::PolygonizeConfig;
//! use transvoxel_core::grid::VoxelGrid;
//! use transvoxel_core::polygonize::run_full;
//! use transvoxel_core::surface_source::SphereSource;
//!
//! let source = SphereSource { center: [32.0, 32.0, 32.0], radius: 20.0 };
//! let grid = VoxelGrid::from_surface(64, 64, 64, [0.0, 0.0, 0.0], 1.0, &source).unwrap();
//! let map = run_full(&grid, &PolygonizeConfig::default());
//! println!("{} blocks at level 0", map.levels[0].len());
//! ```

pub mod block;
pub mod block_cache;
pub mod case_tables;
pub mod cell;
pub mod config;
pub mod constants;
pub mod coords;
pub mod edge_table;
pub mod error;
pub mod grid;
pub mod logging;
pub mod material_map;
pub mod polygon_map;
pub mod polygonize;
pub mod surface_source;
pub mod types;

pub use config::PolygonizeConfig;
pub use error::GridError;
pub use grid::{InjectionKind, VoxelGrid};
pub use material_map::{MaterialMap, TextureTriplet};
pub use polygon_map::{PolygonBlock, PolygonMap, Statistics, TransitionFaceId, Vertex};
pub use polygonize::{run_full, run_incremental, ModificationDescriptor};
pub use types::{MaterialId, MATERIAL_EMPTY};
