// 会话模块
// cell 持有唯一的会话状态，persist 负责凭据落盘，store 编排登录、注销、刷新流程

mod cell;
mod persist;
mod store;

pub use cell::{EndReason, Session, SessionCell, SessionState};
pub use persist::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, PersistedCredentials,
    RedisCredentialStore,
};
pub use store::SessionStore;
