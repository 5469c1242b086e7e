pub mod user;
pub mod wh;
