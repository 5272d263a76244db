use bytes::Bytes;

use super::error::*;
use super::models::*;

pub trait FsService: Send + Sync {
    fn list(&self, param: &ListParam) -> impl std::future::Future<Output = Result<FsList>> + Send;

    fn get(&self, path: &str) -> impl std::future::Future<Output = Result<FileInfo>> + Send;

    fn link(&self, path: &str) -> impl std::future::Future<Output = Result<LinkInfo>> + Send;

    /// Uploads `content` to `path` as the multipart field `file` named `file_name`,
    /// overwriting whatever is there.
    fn put_form(
        &self,
        path: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn put_text(
        &self,
        path: &str,
        content: String,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn fetch_raw(&self, raw_url: &str) -> impl std::future::Future<Output = Result<Bytes>> + Send;

    fn fetch_file_content(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send {
        async move {
            let info = self.get(path).await?;
            let bytes = self.fetch_raw(info.raw_url()).await?;
            String::from_utf8(bytes.to_vec()).map_err(|_| Error::UnexpectedResp)
        }
    }

    fn save_file_content(
        &self,
        path: &str,
        content: String,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        self.put_text(path, content)
    }
}

pub trait AuthService {
    /// Logs in and keeps the returned token for every following request.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
