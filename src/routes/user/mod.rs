mod handler;
mod model;

pub use handler::{
    create_user, delete_user, get_current_user, get_user, list_users, reset_password,
    send_reset_password, update_claims, update_credentials, update_user, user_exists,
};
