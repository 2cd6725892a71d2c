mod route_guard;

pub use route_guard::{
    AUTH_ONLY_PREFIXES, DEFAULT_LANDING_PATH, GuardDecision, LOGIN_PATH, Navigator,
    PROTECTED_PREFIXES, TracingNavigator, evaluate,
};
