pub mod user;
pub mod wh;

pub use user::{
    Authenticated, ClaimsUpdate, Credentials, Profile, ResetMailSettings, SeedUser, UserService,
    UserView,
};
pub use wh::WhService;
