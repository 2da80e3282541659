#![deny(unsafe_code)]
//! Core of the metaball engine.
//!
//! A [`Scene`] moves a [`FieldSourceSet`] of circular sources, samples their
//! summed field on a [`ContourGrid`], and joins the threshold crossings into
//! [`Segment`]s once per frame. Supporting pieces: the static [`Lattice`]
//! topology, [`assembly`] strategies with saddle resolution, the sample
//! [`cache`] and frame budget, [`SceneConfig`] with its JSON parameter
//! helpers, the [`Xorshift64`] PRNG, and [`EngineError`].

pub mod assembly;
pub mod cache;
pub mod config;
pub mod error;
pub mod grid;
pub mod lattice;
pub mod params;
pub mod prng;
pub mod scene;
pub mod segment;
pub mod source;

pub use assembly::{assemble, saddle_pairing, AssemblyStrategy, SaddlePairing};
pub use cache::{FrameBudget, SampleCache};
pub use config::{BoundaryPolicy, CachePolicy, SceneConfig};
pub use error::EngineError;
pub use glam::DVec2;
pub use grid::{ContourGrid, Edge, EdgeLink, Vertex};
pub use lattice::{Lattice, Orientation};
pub use prng::Xorshift64;
pub use scene::{FrameStats, Scene};
pub use segment::Segment;
pub use source::{FieldSourceSet, Kernel, ScalarField, Source, CUTOFF_TOLERANCE};
