use anyhow::{Context, Result};
use blog_admin::{
    AdminContext,
    api::models::{CommentQuery, CommentStatus, LoginRequest, PostQuery, PostStatus, TagQuery},
    config::Config,
    session::SessionState,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blog-admin", version, about = "博客后台管理命令行")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 登录并保存凭据
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "BLOG_ADMIN_PASSWORD")]
        password: String,
    },
    /// 注销并清除本地凭据
    Logout,
    /// 显示当前登录用户
    Whoami,
    /// 文章列表
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        keyword: Option<String>,
    },
    /// 标签列表
    Tags {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// 评论列表
    Comments {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        status: Option<String>,
    },
    /// 判断一次导航的守卫结果
    Guard { path: String },
}

fn parse_status<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .with_context(|| format!("无效的状态: {}", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env().context("加载配置失败")?;
    tracing::debug!("接口地址: {}", config.api_base_url);
    let ctx = AdminContext::connect(config)?;

    if let Commands::Guard { path } = &cli.command {
        ctx.session.initialize().await;
        let decision = ctx.guard(path);
        match decision.target() {
            Some(target) => println!("{:?} -> {}", decision, target),
            None => println!("{:?}", decision),
        }
        return Ok(());
    }

    let state = ctx.session.initialize().await;
    let needs_session = !matches!(cli.command, Commands::Login { .. });
    if needs_session && state != SessionState::Authenticated {
        anyhow::bail!("尚未登录，请先执行 blog-admin login");
    }

    match cli.command {
        Commands::Login { username, password } => {
            let session = ctx
                .session
                .login(&LoginRequest::new(username, password))
                .await?;
            println!("已登录: {} ({:?})", session.username, session.role);
        }
        Commands::Logout => {
            ctx.session.logout().await;
            println!("已注销");
        }
        Commands::Whoami => {
            let user = ctx.profile.profile().await?;
            println!("{} <{}> {:?}", user.username, user.email, user.role);
            if let Some(expires_at) = ctx.session.token_expires_at() {
                println!("令牌过期时间: {}", expires_at);
            }
        }
        Commands::Posts {
            page,
            limit,
            status,
            keyword,
        } => {
            let query = PostQuery {
                status: status.as_deref().map(parse_status::<PostStatus>).transpose()?,
                keyword,
                ..PostQuery::page(page, limit)
            };
            let posts = ctx.posts.list(&query).await?;
            for post in &posts.items {
                println!("{}\t{:?}\t{}", post.id, post.status, post.title);
            }
            println!("第 {} 页，共 {} 篇", posts.page, posts.total);
        }
        Commands::Tags { page, limit } => {
            let query = TagQuery {
                page: Some(page),
                limit: Some(limit),
                ..TagQuery::default()
            };
            let tags = ctx.tags.list(&query).await?;
            for tag in &tags.items {
                println!("{}\t{}\t{}", tag.id, tag.name, tag.post_count);
            }
            println!("第 {} 页，共 {} 个", tags.page, tags.total);
        }
        Commands::Comments {
            page,
            limit,
            status,
        } => {
            let query = CommentQuery {
                page: Some(page),
                limit: Some(limit),
                status: status
                    .as_deref()
                    .map(parse_status::<CommentStatus>)
                    .transpose()?,
                ..CommentQuery::default()
            };
            let comments = ctx.comments.list(&query).await?;
            for comment in &comments.page.items {
                println!(
                    "{}\t{:?}\t{}\t{}",
                    comment.id, comment.status, comment.author_name, comment.content
                );
            }
            if let Some(stats) = comments.stats {
                println!(
                    "待审核 {}，已通过 {}，已拒绝 {}，垃圾 {}",
                    stats.pending, stats.approved, stats.rejected, stats.spam
                );
            }
        }
        Commands::Guard { .. } => {}
    }

    Ok(())
}
