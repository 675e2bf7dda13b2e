pub mod environment;
pub mod id_gen;
pub mod observer;
pub mod registry;
pub mod transitions;
pub mod types;

pub use environment::TaskEnvironment;
pub use id_gen::{deterministic_task_id, random_task_id};
pub use observer::{BroadcastObserver, TaskEvent, TaskObserver};
pub use registry::{SharedTask, TaskRegistry};
pub use transitions::StateTransition;
pub use types::{Task, TaskBuilder, TaskId, TaskKind, TaskStatus, DEFAULT_MAX_RETRIES};
