//! vCard serialization (2.1, 3.0, 4.0).
//!
//! - Fold: content line folding at a byte budget
//! - Params: table-driven parameter emission per version and property kind
//! - Serializer: writing sessions with canonical ordering and instance selection
//! - Compat: vendor `X-` properties for 2.1/3.0 consumers

pub mod compat;
mod fold;
mod params;
mod serializer;

pub use compat::{CompatTransform, transforms_for};
pub use fold::{fold, fold_line};
pub use params::{
    EmitContext, EmitStep, ParameterSerializer, emission_steps, serialize_parameters,
};
pub use serializer::{
    VcfWriter, WriterOptions, serialize, serialize_as, serialize_property,
};
