pub mod session;

pub use session::{Flash, FlashLevel, Session, SessionStore, SESSION_COOKIE};
