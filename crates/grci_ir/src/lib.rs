//! Intermediate representation for compiled GRCI HDL modules.
//!
//! After width inference and lowering, every module is a [`ModuleDesc`]: its
//! parameters with concrete bit offsets and widths, its part instances with
//! per-input-bit [`Connection`] lists, a per-output-bit [`Driver`] table, and
//! the aggregate counts used to pre-size the simulation arenas. Descriptions
//! live in a [`DescTable`] alongside the three built-in primitives.

#![warn(missing_docs)]

pub mod arena;
pub mod description;
pub mod ids;
pub mod limits;
pub mod table;

pub use arena::{Arena, ArenaId};
pub use description::{Connection, DescKind, Driver, ModuleDesc, ParamDesc, PartDesc};
pub use ids::DescId;
pub use table::DescTable;
