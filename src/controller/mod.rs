// CONTROLLER: Input, animation, and update loop
pub mod input;
pub mod flight;
pub mod environment;
pub mod animator;
pub mod clock;
pub mod frame_loop;

pub use input::{InputEvent, InputTracker, PointerState};
pub use flight::{FlightAnimator, FlightTargets};
pub use environment::EnvironmentRoller;
pub use animator::Animator;
pub use clock::Clock;
pub use frame_loop::FrameStats;
#[cfg(target_arch = "wasm32")]
pub use frame_loop::FrameLoopContext;
