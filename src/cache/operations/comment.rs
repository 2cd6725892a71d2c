use std::sync::Arc;

use super::seed;
use crate::api::models::{
    Comment, CommentList, CommentQuery, CommentStats, CommentStatus, CreateCommentInput,
    UpdateCommentInput,
};
use crate::api::operations::CommentService;
use crate::cache::keys::comment_keys;
use crate::cache::models::QueryState;
use crate::cache::{Mutation, QueryCache, policy};
use crate::error::ApiError;
use crate::notify::{Notice, Notifier};

/// 评论缓存操作
#[derive(Clone)]
pub struct CommentCacheOperations {
    service: CommentService,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl CommentCacheOperations {
    pub fn new(service: CommentService, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            cache,
            notifier,
        }
    }

    pub fn service(&self) -> &CommentService {
        &self.service
    }

    pub async fn list(&self, query: &CommentQuery) -> Result<CommentList, ApiError> {
        let service = self.service.clone();
        let query_owned = query.clone();
        self.cache
            .fetch(&comment_keys::list(query), policy::COMMENT_LIST, move || async move {
                service.list(&query_owned).await
            })
            .await
    }

    pub fn peek_list(&self, query: &CommentQuery) -> QueryState<CommentList> {
        self.cache.peek(&comment_keys::list(query))
    }

    pub async fn get(&self, id: &str) -> Result<Comment, ApiError> {
        let service = self.service.clone();
        let id_owned = id.to_string();
        self.cache
            .fetch(&comment_keys::detail(id), policy::COMMENT_DETAIL, move || async move {
                service.get_by_id(&id_owned).await
            })
            .await
    }

    pub fn peek(&self, id: &str) -> QueryState<Comment> {
        self.cache.peek(&comment_keys::detail(id))
    }

    pub async fn stats(&self) -> Result<CommentStats, ApiError> {
        let service = self.service.clone();
        self.cache
            .fetch(&comment_keys::stats(), policy::COMMENT_STATS, move || async move {
                service.stats().await
            })
            .await
    }

    pub async fn create(&self, input: &CreateCommentInput) -> Result<Comment, ApiError> {
        let comment = self.service.create(input).await?;
        self.cache.apply(&Mutation::CommentCreated);
        seed(
            &self.cache,
            &comment_keys::detail(&comment.id),
            &comment,
            policy::COMMENT_DETAIL,
        );
        self.notifier.notify(Notice::success("评论创建成功"));
        Ok(comment)
    }

    pub async fn update(&self, id: &str, input: &UpdateCommentInput) -> Result<Comment, ApiError> {
        let comment = self.service.update(id, input).await?;
        self.cache
            .apply(&Mutation::CommentUpdated { id: id.to_string() });
        seed(
            &self.cache,
            &comment_keys::detail(&comment.id),
            &comment,
            policy::COMMENT_DETAIL,
        );
        self.notifier.notify(Notice::success("评论更新成功"));
        Ok(comment)
    }

    /// 审核状态变更
    ///
    /// 详情已缓存时先乐观写入新状态，失败后恢复原值。
    pub async fn update_status(
        &self,
        id: &str,
        status: CommentStatus,
    ) -> Result<Comment, ApiError> {
        let key = comment_keys::detail(id);
        let cached: QueryState<Comment> = self.cache.peek(&key);

        let comment = match cached.data {
            Some(mut expected) => {
                expected.status = status;
                self.cache
                    .mutate_optimistic(&key, &expected, self.service.update_status(id, status))
                    .await?
            }
            None => self.service.update_status(id, status).await?,
        };

        self.cache
            .apply(&Mutation::CommentStatusChanged { id: id.to_string() });
        seed(&self.cache, &key, &comment, policy::COMMENT_DETAIL);
        self.notifier
            .notify(Notice::success(format!("评论已{}", status.action_label())));
        Ok(comment)
    }

    pub async fn approve(&self, id: &str) -> Result<Comment, ApiError> {
        self.update_status(id, CommentStatus::Approved).await
    }

    pub async fn reject(&self, id: &str) -> Result<Comment, ApiError> {
        self.update_status(id, CommentStatus::Rejected).await
    }

    pub async fn mark_spam(&self, id: &str) -> Result<Comment, ApiError> {
        self.update_status(id, CommentStatus::Spam).await
    }

    pub async fn batch_update_status(
        &self,
        ids: &[String],
        status: CommentStatus,
    ) -> Result<(), ApiError> {
        self.service.batch_update_status(ids, status).await?;
        self.cache
            .apply(&Mutation::CommentsStatusChanged { ids: ids.to_vec() });
        self.notifier.notify(Notice::success(format!(
            "{} 条评论已{}",
            ids.len(),
            status.action_label()
        )));
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.service.delete(id).await?;
        self.cache
            .apply(&Mutation::CommentDeleted { id: id.to_string() });
        self.notifier.notify(Notice::success("评论删除成功"));
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        self.service.batch_delete(ids).await?;
        self.cache
            .apply(&Mutation::CommentsBatchDeleted { ids: ids.to_vec() });
        self.notifier
            .notify(Notice::success(format!("{} 条评论删除成功", ids.len())));
        Ok(())
    }

    pub async fn reply(&self, id: &str, content: &str) -> Result<Comment, ApiError> {
        let reply = self.service.reply(id, content).await?;
        self.cache.apply(&Mutation::CommentReplied {
            parent_id: id.to_string(),
        });
        seed(
            &self.cache,
            &comment_keys::detail(&reply.id),
            &reply,
            policy::COMMENT_DETAIL,
        );
        self.notifier.notify(Notice::success("回复发送成功"));
        Ok(reply)
    }
}
