// 后端 REST 接口访问层
// transport 负责收发，client 负责鉴权头、信封解包与错误分类，operations 为各资源服务

pub mod client;
pub mod envelope;
pub mod models;
pub mod operations;
pub mod transport;

pub use client::{ApiClient, RequestOptions};
pub use envelope::EnvelopeFormat;
pub use transport::{Body, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
