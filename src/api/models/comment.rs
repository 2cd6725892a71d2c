use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Page, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Spam,
}

impl CommentStatus {
    /// 审核操作完成后的提示文案
    pub fn action_label(&self) -> &'static str {
        match self {
            CommentStatus::Approved => "通过",
            CommentStatus::Rejected => "拒绝",
            CommentStatus::Spam => "标记为垃圾",
            CommentStatus::Pending => "待审核",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentVisibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentType {
    #[default]
    Comment,
    Reply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPostRef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub post_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    pub author_website: Option<String>,
    pub author_ip: Option<String>,
    pub user_agent: Option<String>,
    pub status: CommentStatus,
    #[serde(default)]
    pub visibility: CommentVisibility,
    #[serde(default, rename = "type")]
    pub kind: CommentType,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub post: Option<CommentPostRef>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub content: String,
    pub author_name: String,
    pub author_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CommentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<CommentVisibility>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyInput<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentStats {
    #[serde(default)]
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub spam: u64,
}

/// 评论列表，后端可能附带各状态计数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentList {
    pub page: Page<Comment>,
    pub stats: Option<CommentStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentSortField {
    CreatedAt,
    UpdatedAt,
    LikeCount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub post_id: Option<String>,
    pub status: Option<CommentStatus>,
    pub visibility: Option<CommentVisibility>,
    pub keyword: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<CommentSortField>,
    pub sort_order: Option<SortOrder>,
}
