// API 数据传输对象模块
// 包含所有与后端交互的数据结构

pub mod auth;
pub mod comment;
pub mod common;
pub mod post;
pub mod tag;
pub mod upload;
pub mod user;

// 重新导出常用类型
pub use auth::*;
pub use comment::*;
pub use common::*;
pub use post::*;
pub use tag::*;
pub use upload::*;
pub use user::*;
