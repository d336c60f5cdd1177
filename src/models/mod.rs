pub mod category;
pub mod movie;

pub use category::Category;
pub use movie::{Movie, MovieFields};
