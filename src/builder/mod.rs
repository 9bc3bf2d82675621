//! Native and shader build stages.
//!
//! This module turns toolchain profiles into rendered invocations and runs
//! them, either directly or through a transient activation script.

pub mod invocation;
pub mod shader;
pub mod staged;
pub mod toolchain;

pub use invocation::{build_invocation, Invocation, InvocationBody, ScriptFlavor, Step, StepKind};
pub use shader::{ShaderJob, ShaderPipeline};
pub use staged::{run_staged, TransientScript};
pub use toolchain::{
    CommandSpec, GccToolchain, MsvcToolchain, Pipeline, Toolchain, ToolchainPlatform,
    ToolchainProfile,
};
