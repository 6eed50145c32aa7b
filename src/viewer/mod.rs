pub mod app;
pub mod render;

pub use app::App;
pub use render::{TrackView, render_ruler, render_status_bar};
