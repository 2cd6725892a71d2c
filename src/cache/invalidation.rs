// 变更操作 -> 受影响缓存键族 的声明式对照表
// 跨实体的影响在这里逐条列出，调用方不需要记住哪些列表会受牵连

use super::keys::{KeyPattern, auth_keys, comment_keys, post_keys, tag_keys, user_keys};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// 标记失效，下一次读取等待网络结果
    Invalidate(KeyPattern),
    /// 直接删除，实体已不存在
    Remove(KeyPattern),
}

/// 一次已被服务端确认的变更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    PostCreated,
    PostUpdated { id: String },
    PostPublished { id: String },
    PostUnpublished { id: String },
    PostDeleted { id: String },
    PostsBatchDeleted { ids: Vec<String> },
    PostsStatusChanged { ids: Vec<String> },

    TagCreated,
    TagUpdated { id: String },
    TagDeleted { id: String },
    TagsBatchDeleted { ids: Vec<String> },

    CommentCreated,
    CommentUpdated { id: String },
    CommentStatusChanged { id: String },
    CommentsStatusChanged { ids: Vec<String> },
    CommentDeleted { id: String },
    CommentsBatchDeleted { ids: Vec<String> },
    CommentReplied { parent_id: String },

    UserCreated,
    UserUpdated { id: String },
    UserStatusChanged { id: String },
    UsersStatusChanged { ids: Vec<String> },
    UserDeleted { id: String },
    UsersBatchDeleted { ids: Vec<String> },
    UserUnlocked { id: String },
    UserPasswordReset { id: String },

    PasswordChanged,
}

impl Mutation {
    pub fn effects(&self) -> Vec<Effect> {
        use Effect::Invalidate;

        match self {
            Mutation::PostCreated => {
                let mut effects = vec![Invalidate(post_keys::lists())];
                effects.extend(tag_usage_effects());
                effects
            }
            Mutation::PostUpdated { id } => {
                let mut effects = vec![
                    Invalidate(post_keys::lists()),
                    Invalidate(post_keys::detail_pattern(id)),
                ];
                // 文章标签可能变化，标签的文章计数随之变化
                effects.extend(tag_usage_effects());
                effects
            }
            Mutation::PostPublished { id } | Mutation::PostUnpublished { id } => vec![
                Invalidate(post_keys::lists()),
                Invalidate(post_keys::detail_pattern(id)),
            ],
            Mutation::PostDeleted { id } => post_removal_effects(std::slice::from_ref(id)),
            Mutation::PostsBatchDeleted { ids } => post_removal_effects(ids),
            Mutation::PostsStatusChanged { ids } => {
                let mut effects = vec![Invalidate(post_keys::lists())];
                effects.extend(
                    ids.iter()
                        .map(|id| Invalidate(post_keys::detail_pattern(id))),
                );
                effects
            }

            Mutation::TagCreated => tag_catalog_effects(),
            Mutation::TagUpdated { id } => {
                let mut effects = tag_catalog_effects();
                effects.push(Invalidate(tag_keys::detail_pattern(id)));
                effects.extend(tagged_post_effects());
                effects
            }
            Mutation::TagDeleted { id } => tag_removal_effects(std::slice::from_ref(id)),
            Mutation::TagsBatchDeleted { ids } => tag_removal_effects(ids),

            Mutation::CommentCreated => vec![
                Invalidate(comment_keys::lists()),
                Invalidate(comment_keys::stats_pattern()),
            ],
            // 更新可能带状态，统计一并刷新
            Mutation::CommentUpdated { id } => comment_status_effects(std::slice::from_ref(id)),
            Mutation::CommentStatusChanged { id } => {
                comment_status_effects(std::slice::from_ref(id))
            }
            Mutation::CommentsStatusChanged { ids } => comment_status_effects(ids),
            Mutation::CommentDeleted { id } => comment_removal_effects(std::slice::from_ref(id)),
            Mutation::CommentsBatchDeleted { ids } => comment_removal_effects(ids),
            Mutation::CommentReplied { parent_id } => vec![
                Invalidate(comment_keys::lists()),
                Invalidate(comment_keys::stats_pattern()),
                Invalidate(comment_keys::detail_pattern(parent_id)),
            ],

            Mutation::UserCreated => vec![Invalidate(user_keys::lists())],
            Mutation::UserUpdated { id } => vec![
                Invalidate(user_keys::lists()),
                Invalidate(user_keys::detail_pattern(id)),
                // 可能是当前登录用户本人
                Invalidate(auth_keys::profile_pattern()),
            ],
            Mutation::UserStatusChanged { id } | Mutation::UserUnlocked { id } => {
                user_status_effects(std::slice::from_ref(id))
            }
            Mutation::UsersStatusChanged { ids } => user_status_effects(ids),
            Mutation::UserDeleted { id } => user_removal_effects(std::slice::from_ref(id)),
            Mutation::UsersBatchDeleted { ids } => user_removal_effects(ids),
            Mutation::UserPasswordReset { id } => {
                vec![Invalidate(user_keys::detail_pattern(id))]
            }

            Mutation::PasswordChanged => Vec::new(),
        }
    }
}

fn tag_usage_effects() -> Vec<Effect> {
    vec![
        Effect::Invalidate(tag_keys::lists()),
        Effect::Invalidate(tag_keys::catalog_pattern()),
    ]
}

fn tag_catalog_effects() -> Vec<Effect> {
    vec![
        Effect::Invalidate(tag_keys::lists()),
        Effect::Invalidate(tag_keys::catalog_pattern()),
        Effect::Invalidate(tag_keys::searches()),
    ]
}

/// 文章列表和详情内嵌了标签
fn tagged_post_effects() -> Vec<Effect> {
    vec![
        Effect::Invalidate(post_keys::lists()),
        Effect::Invalidate(post_keys::details()),
    ]
}

fn post_removal_effects(ids: &[String]) -> Vec<Effect> {
    let mut effects: Vec<Effect> = ids
        .iter()
        .map(|id| Effect::Remove(post_keys::detail_pattern(id)))
        .collect();
    effects.push(Effect::Invalidate(post_keys::lists()));
    effects.extend(tag_usage_effects());
    // 文章删除后其评论随之消失
    effects.push(Effect::Invalidate(comment_keys::lists()));
    effects.push(Effect::Invalidate(comment_keys::stats_pattern()));
    effects
}

fn tag_removal_effects(ids: &[String]) -> Vec<Effect> {
    let mut effects: Vec<Effect> = ids
        .iter()
        .map(|id| Effect::Remove(tag_keys::detail_pattern(id)))
        .collect();
    effects.extend(tag_catalog_effects());
    effects.extend(tagged_post_effects());
    effects
}

fn comment_status_effects(ids: &[String]) -> Vec<Effect> {
    let mut effects = vec![
        Effect::Invalidate(comment_keys::lists()),
        Effect::Invalidate(comment_keys::stats_pattern()),
    ];
    effects.extend(
        ids.iter()
            .map(|id| Effect::Invalidate(comment_keys::detail_pattern(id))),
    );
    effects
}

fn comment_removal_effects(ids: &[String]) -> Vec<Effect> {
    let mut effects: Vec<Effect> = ids
        .iter()
        .map(|id| Effect::Remove(comment_keys::detail_pattern(id)))
        .collect();
    effects.push(Effect::Invalidate(comment_keys::lists()));
    effects.push(Effect::Invalidate(comment_keys::stats_pattern()));
    effects
}

fn user_status_effects(ids: &[String]) -> Vec<Effect> {
    let mut effects = vec![Effect::Invalidate(user_keys::lists())];
    effects.extend(
        ids.iter()
            .map(|id| Effect::Invalidate(user_keys::detail_pattern(id))),
    );
    effects
}

fn user_removal_effects(ids: &[String]) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(ids.len() * 2 + 1);
    for id in ids {
        effects.push(Effect::Remove(user_keys::detail_pattern(id)));
        effects.push(Effect::Remove(user_keys::login_logs_pattern(id)));
    }
    effects.push(Effect::Invalidate(user_keys::lists()));
    effects
}
