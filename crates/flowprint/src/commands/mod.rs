//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod export;

pub(crate) use convert::ConvertArgs;
pub(crate) use export::ExportArgs;
