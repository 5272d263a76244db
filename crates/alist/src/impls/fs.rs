use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};

use super::*;
use crate::filetype::FileKind;
use crate::prelude::FsService;

impl FsService for Service {
    // POST /api/fs/list
    async fn list(&self, param: &ListParam) -> Result<FsList> {
        let res = self
            .authorized(self.client.post(self.api_url(consts::API_FS_LIST)))
            .json(param)
            .send()
            .await?
            .json::<PackInfo<FsList>>()
            .await?
            .as_result()?;
        Ok(res.rooted_at(param.path()))
    }

    // POST /api/fs/get
    async fn get(&self, path: &str) -> Result<FileInfo> {
        let info = self
            .authorized(self.client.post(self.api_url(consts::API_FS_GET)))
            .json(&PathParam { path, password: "" })
            .send()
            .await?
            .json::<PackInfo<FileInfo>>()
            .await?
            .as_result()?;
        Ok(info.at_path(path))
    }

    // POST /api/fs/link
    async fn link(&self, path: &str) -> Result<LinkInfo> {
        self.authorized(self.client.post(self.api_url(consts::API_FS_LINK)))
            .json(&PathParam { path, password: "" })
            .send()
            .await?
            .json::<PackInfo<LinkInfo>>()
            .await?
            .as_result()
    }

    // PUT /api/fs/form
    async fn put_form(&self, path: &str, file_name: &str, content: Vec<u8>) -> Result<()> {
        let mime = if file_name.to_lowercase().ends_with(".json") {
            "application/json"
        } else if FileKind::of_name(file_name) == FileKind::Text {
            "text/plain"
        } else {
            "application/octet-stream"
        };
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(file_name.to_owned())
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.authorized(self.client.put(self.api_url(consts::API_FS_FORM)))
            .header(consts::FILE_PATH_HEADER, encode_file_path(path))
            .multipart(form)
            .send()
            .await?
            .json::<PackInfo<serde::de::IgnoredAny>>()
            .await?
            .as_empty()
    }

    // PUT /api/fs/put
    async fn put_text(&self, path: &str, content: String) -> Result<()> {
        self.authorized(self.client.put(self.api_url(consts::API_FS_PUT)))
            .header(consts::FILE_PATH_HEADER, encode_file_path(path))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(content)
            .send()
            .await?
            .json::<PackInfo<serde::de::IgnoredAny>>()
            .await?
            .as_empty()
    }

    // GET {raw_url}, signed by AList, so no token is attached
    async fn fetch_raw(&self, raw_url: &str) -> Result<Bytes> {
        let resp = self.client.get(raw_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16(), raw_url.to_owned()));
        }
        Ok(resp.bytes().await?)
    }
}

/// One directory and its direct entries, as returned by [`walk`].
#[derive(Debug, Clone)]
pub struct DirListing {
    pub path: String,
    pub entries: Vec<AlistFile>,
}

/// Lists `path` and every directory below it. Sibling directories are listed
/// concurrently; the first failure aborts the walk.
pub fn walk<'a, S: FsService>(fs: &'a S, path: String) -> BoxFuture<'a, Result<Vec<DirListing>>> {
    async move {
        let entries = fs.list(&ListParam::new(path.clone())).await?.into_content();
        let subdirs: Vec<String> = entries
            .iter()
            .filter(|f| *f.is_dir())
            .map(|f| f.path().clone())
            .collect();
        let mut out = vec![DirListing { path, entries }];
        let nested = futures::future::try_join_all(subdirs.into_iter().map(|d| walk(fs, d))).await?;
        out.extend(nested.into_iter().flatten());
        Ok(out)
    }
    .boxed()
}
