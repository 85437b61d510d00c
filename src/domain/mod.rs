pub mod user;
pub mod block;
pub mod room;
pub mod application;
pub mod assignment;
pub mod maintenance;
pub mod announcement;
pub mod notification;
pub mod message;

pub use user::*;
pub use block::*;
pub use room::*;
pub use application::*;
pub use assignment::*;
pub use maintenance::*;
pub use announcement::*;
pub use notification::*;
pub use message::*;
