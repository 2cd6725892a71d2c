// 图片上传服务

use futures_util::future::try_join_all;
use tracing::info;

use crate::api::client::ApiClient;
use crate::api::models::{ImageFile, MAX_IMAGE_BYTES, UploadResponse};
use crate::api::transport::MultipartFile;
use crate::error::ApiError;

/// 表单里的文件字段名
const FILE_FIELD: &str = "file";
/// 上传用途标记
const UPLOAD_TYPE: &str = "post-image";

#[derive(Clone)]
pub struct UploadService {
    client: ApiClient,
}

impl UploadService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 上传前的本地校验：类型必须是图片，大小不超过 5MB
    pub fn validate(&self, file: &ImageFile) -> Result<(), ApiError> {
        if !file.is_image() {
            return Err(self.client.reject(ApiError::validation("只能上传图片文件")));
        }
        if file.bytes.len() > MAX_IMAGE_BYTES {
            return Err(self
                .client
                .reject(ApiError::validation("图片大小不能超过 5MB")));
        }
        Ok(())
    }

    pub async fn upload_image(&self, file: ImageFile) -> Result<UploadResponse, ApiError> {
        self.validate(&file)?;
        let name = file.file_name.clone();

        let multipart = MultipartFile {
            field: FILE_FIELD.to_string(),
            file_name: file.file_name,
            mime: file.mime,
            bytes: file.bytes,
            fields: vec![("type".to_string(), UPLOAD_TYPE.to_string())],
        };
        let response: UploadResponse = self.client.upload("/uploads/images", multipart).await?;
        info!("图片上传完成: {} -> {}", name, response.url);
        Ok(response)
    }

    /// 并发上传多张图片，任意一张失败则整体失败
    pub async fn upload_images(
        &self,
        files: Vec<ImageFile>,
    ) -> Result<Vec<UploadResponse>, ApiError> {
        // 先全部校验，避免部分文件已上传后才发现问题
        for file in &files {
            self.validate(file)?;
        }
        try_join_all(files.into_iter().map(|file| self.upload_image(file))).await
    }
}
