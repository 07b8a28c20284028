pub mod details;
pub mod flow_canvas;
pub mod palette;
pub mod toolbar;
