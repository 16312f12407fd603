pub mod input;
pub mod interaction;
pub mod session;

pub use input::InputEvent;
pub use interaction::{
    Gesture, Interaction, InteractionConfig, NodeSet, OverlayChange, Transition, transition,
};
pub use session::EditorSession;
