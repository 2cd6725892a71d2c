/// 登录页
pub const LOGIN_PATH: &str = "/login";

/// 已登录用户的默认落地页
pub const DEFAULT_LANDING_PATH: &str = "/posts";

/// 需要令牌才能访问的路由前缀
pub const PROTECTED_PREFIXES: [&str; 4] = ["/posts", "/tags", "/comments", "/users"];

/// 仅未登录时访问的路由前缀
pub const AUTH_ONLY_PREFIXES: [&str; 1] = ["/login"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectToDefault,
}

impl GuardDecision {
    /// 需要跳转时返回目标路径
    pub fn target(&self) -> Option<&'static str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectToDefault => Some(DEFAULT_LANDING_PATH),
        }
    }
}

/// 页面跳转出口，由界面层实现
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn redirect(&self, path: &str) {
        tracing::info!("redirect to {}", path);
    }
}

/// 按段匹配前缀，`/postsx` 不算 `/posts` 下的路由
fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// 导航守卫，只看路径和令牌是否存在
///
/// 无法区分过期令牌和有效令牌，过期由请求层的 401 处理兜底。
pub fn evaluate(path: &str, has_token: bool) -> GuardDecision {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    // 根路径固定跳转登录页
    if path.is_empty() || path == "/" {
        return GuardDecision::RedirectToLogin;
    }

    if !has_token && PROTECTED_PREFIXES.iter().any(|p| under(path, p)) {
        return GuardDecision::RedirectToLogin;
    }

    if has_token && AUTH_ONLY_PREFIXES.iter().any(|p| under(path, p)) {
        return GuardDecision::RedirectToDefault;
    }

    GuardDecision::Allow
}
