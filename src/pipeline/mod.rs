//! Pipeline components: walk, digest workers, sequencer, and the driver that wires them.

pub mod cancel;
pub mod context;
pub mod digester;
pub mod orchestrator;
pub mod sequencer;
pub mod walk;

pub use cancel::CancelSignal;
pub use context::{PipelineChannels, PipelineHandles, PipelineTuning, create_pipeline_channels};
pub use digester::{digest_node, spawn_digest_workers};
pub use orchestrator::{
    drive_pipeline, install_interrupt_handler, run_pipeline, run_pipeline_with_fs,
    shutdown_pipeline_handles,
};
pub use sequencer::{Sequencer, run_sequencer_loop, spawn_sequencer_thread};
pub use walk::{FileSystem, OsFileSystem, WalkOpts, WalkOutcome, run_walk_loop, spawn_walk_thread};
