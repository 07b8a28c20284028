mod component;
mod render;
mod viewport;

pub use component::FlowCanvas;
