pub mod session_auth;

pub use session_auth::{
    clear_session_cookie_header, session_auth_middleware, session_cookie_header,
};
