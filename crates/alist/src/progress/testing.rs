use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::prelude::FsService;
use crate::*;

const RAW_PREFIX: &str = "mem://";

/// In-memory stand-in for an AList server.
#[derive(Debug, Default)]
pub(crate) struct MemoryFs {
    files: Mutex<HashMap<String, Vec<u8>>>,
    puts: AtomicUsize,
    gets: AtomicUsize,
    fail_puts: AtomicBool,
    fail_gets: AtomicBool,
}

impl MemoryFs {
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.set_file(path, content);
        self
    }

    pub fn set_file(&self, path: &str, content: &str) {
        self.files
            .lock()
            .insert(path.to_owned(), content.as_bytes().to_vec());
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }
}

impl FsService for MemoryFs {
    async fn list(&self, param: &ListParam) -> Result<FsList> {
        let dir = param.path().trim_end_matches('/').to_owned();
        let names: Vec<String> = self
            .files
            .lock()
            .keys()
            .filter_map(|p| p.strip_prefix(&format!("{dir}/")).map(str::to_owned))
            .filter(|rest| !rest.contains('/'))
            .collect();
        let content: Vec<serde_json::Value> = names
            .iter()
            .map(|n| serde_json::json!({"name": n, "is_dir": false, "type": 0}))
            .collect();
        let list: FsList = serde_json::from_value(serde_json::json!({ "content": content }))?;
        Ok(list.rooted_at(&dir))
    }

    async fn get(&self, path: &str) -> Result<FileInfo> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(Error::APIErr(500, "storage offline".to_owned()));
        }
        if !self.files.lock().contains_key(path) {
            return Err(Error::APIErr(500, "failed get objs: object not found".to_owned()));
        }
        let name = path.rsplit('/').next().unwrap_or_default();
        let info: FileInfo = serde_json::from_value(serde_json::json!({
            "name": name,
            "is_dir": false,
            "type": 0,
            "raw_url": format!("{RAW_PREFIX}{path}"),
        }))?;
        Ok(info.at_path(path))
    }

    async fn link(&self, path: &str) -> Result<LinkInfo> {
        Ok(serde_json::from_value(
            serde_json::json!({ "url": format!("{RAW_PREFIX}{path}") }),
        )?)
    }

    async fn put_form(&self, path: &str, _file_name: &str, content: Vec<u8>) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::APIErr(500, "storage offline".to_owned()));
        }
        self.files.lock().insert(path.to_owned(), content);
        Ok(())
    }

    async fn put_text(&self, path: &str, content: String) -> Result<()> {
        self.put_form(path, "", content.into_bytes()).await
    }

    async fn fetch_raw(&self, raw_url: &str) -> Result<Bytes> {
        let path = raw_url.strip_prefix(RAW_PREFIX).unwrap_or(raw_url);
        self.files
            .lock()
            .get(path)
            .map(|b| Bytes::from(b.clone()))
            .ok_or_else(|| Error::HttpStatus(404, raw_url.to_owned()))
    }
}
