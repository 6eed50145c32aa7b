//! Core engine of a genomic track viewer.
//!
//! The heart of the crate is the viewport-driven track cache and the
//! incremental renderer: every animation frame either re-projects previously
//! built geometry with a single affine transform (cheap, taken during smooth
//! panning) or rebuilds the scene from cached feature records (taken on zoom
//! jumps and data refreshes). Around it sit the pure satellite algorithms:
//! the exon/intron structure transformer, the collapsible zone layout
//! manager and the axis tick generator.
//!
//! Rendering is expressed as plain draw commands appended to a [`scene`]
//! container; the [`viewer`] module composites them to terminal cells.

pub mod data;
pub mod events;
pub mod feature;
pub mod layout;
pub mod region;
pub mod scene;
pub mod ticks;
pub mod track;
pub mod viewer;
pub mod viewport;
