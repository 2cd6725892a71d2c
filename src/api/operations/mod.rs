// 资源服务模块
// 每种资源一个服务，只负责把调用翻译成接口请求，错误原样向上返回

pub mod auth;
pub mod comment;
pub mod post;
pub mod tag;
pub mod upload;
pub mod user;

// 重新导出常用服务
pub use auth::AuthService;
pub use comment::CommentService;
pub use post::PostService;
pub use tag::TagService;
pub use upload::UploadService;
pub use user::UserService;

use std::borrow::Cow;

use super::client::ApiClient;
use crate::error::ApiError;

/// 把 id 编码成单个路径段，`/`、`?`、`#` 不会改变请求的接口
pub(crate) fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// 批量操作至少需要一个 id，空集合在本地拒绝，不发请求
pub(crate) fn ensure_ids(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    if ids.is_empty() {
        return Err(client.reject(ApiError::validation("请至少选择一项")));
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(client.reject(ApiError::validation("存在无效的 id")));
    }
    Ok(())
}

pub(crate) fn ensure_id(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(client.reject(ApiError::validation("id 不能为空")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::segment;

    #[test]
    fn ids_stay_within_one_path_segment() {
        assert_eq!(segment("post-1"), "post-1");
        assert_eq!(segment("post-3/publish"), "post-3%2Fpublish");
        assert_eq!(segment("a?b#c"), "a%3Fb%23c");
    }
}
