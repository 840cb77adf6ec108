//! # forest-gen
//!
//! An engine-agnostic procedural generation core for walkable forest scenes.
//!
//! It decouples the *generation* of a forest (L-system tree grammars, turtle
//! interpretation, fractal terrain heightfields) from its *presentation*,
//! producing plain geometric data — [`TreeBlueprint`] segment lists, a
//! [`HeightField`] with a fixed triangulation contract, and ground-height
//! lookups — that any renderer can turn into meshes.

pub mod blueprint;
pub mod error;
pub mod forest;
pub mod grammar;
pub mod interpreter;
pub mod terrain;
pub mod turtle;

pub use blueprint::*;
pub use error::*;
pub use forest::*;
pub use grammar::*;
pub use interpreter::*;
pub use terrain::*;
pub use turtle::*;
