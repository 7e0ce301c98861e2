#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod backend;
pub mod conditional;
pub mod defines;
pub mod effect;
pub mod errors;
pub mod hotload;
pub mod io;
pub mod manager;
pub mod markup;
pub mod pipeline;
pub mod program;
pub mod settings;
pub mod utils;

pub use backend::{BackendCapabilities, GpuProgramId, LinkRequest, LinkedProgram, ShaderBackend, ShadingStyle};
pub use conditional::{ConditionEvaluator, PreprocessorEvaluator};
pub use defines::DefineSet;
pub use effect::{EffectCacheKey, Pass, Technique};
pub use errors::{Result, ShaderError};
pub use io::{DirectoryFileSystem, MemoryFileSystem, VirtualFileSystem};
pub use manager::ShaderManager;
pub use markup::{Element, SchemaValidator};
pub use pipeline::GraphicsPipelineStateDesc;
pub use program::{CompiledProgram, ProgramCacheKey, ProgramHandle, ProgramInterface, StreamFlags};
pub use settings::ShaderSettings;
pub use utils::interner;
