mod handler;
mod model;

pub use handler::{create_wh, delete_wh, get_generation_props, get_wh, list_wh, update_wh};
