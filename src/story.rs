pub mod adventure;
pub mod graph;
pub mod node;

pub use graph::{GraphError, Resolution, StoryGraph};
pub use node::{Answer, Epilogue, Question};
