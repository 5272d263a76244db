use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One entry of an AList directory. The list endpoint does not send `path`,
/// the client fills it in from the listed directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), default)]
pub struct AlistFile {
    name: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    is_dir: bool,
    #[serde(default)]
    modified: String,
    #[serde(default)]
    size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumb: Option<String>,
    #[serde(rename = "type", default)]
    file_type: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<AlistFile>>,
}

impl AlistFile {
    pub(crate) fn with_parent(mut self, dir: &str) -> Self {
        self.path = join_path(dir, &self.name);
        self
    }
}

#[derive(Debug, Clone, Deserialize, Getters)]
pub struct FsList {
    #[serde(default, deserialize_with = "null_as_empty")]
    content: Vec<AlistFile>,
    #[serde(default)]
    total: i64,
    #[serde(default)]
    readme: String,
    #[serde(default)]
    write: bool,
    #[serde(default)]
    provider: String,
}

impl FsList {
    pub fn into_content(self) -> Vec<AlistFile> {
        self.content
    }

    pub(crate) fn rooted_at(mut self, dir: &str) -> Self {
        self.content = self
            .content
            .into_iter()
            .map(|f| f.with_parent(dir))
            .collect();
        self
    }
}

#[derive(Debug, Clone, Deserialize, Getters)]
pub struct FileInfo {
    #[serde(flatten)]
    file: AlistFile,
    #[serde(default)]
    raw_url: String,
    #[serde(default)]
    readme: String,
    #[serde(default)]
    provider: String,
}

impl FileInfo {
    pub(crate) fn at_path(mut self, path: &str) -> Self {
        self.file.path = path.to_owned();
        self
    }
}

#[derive(Debug, Clone, Deserialize, Getters)]
pub struct LinkInfo {
    url: String,
    #[serde(default)]
    header: std::collections::HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Getters, Builder)]
#[builder(setter(into), default)]
pub struct ListParam {
    path: String,
    password: String,
    page: u32,
    /// 0 asks AList for every entry in one page.
    per_page: u32,
    refresh: bool,
}

impl Default for ListParam {
    fn default() -> Self {
        Self {
            path: "/".to_owned(),
            password: String::new(),
            page: 1,
            per_page: 0,
            refresh: false,
        }
    }
}

impl ListParam {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PathParam<'a> {
    pub path: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginParam<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: serde::de::DeserializeOwned")]
pub struct PackInfo<T: serde::de::DeserializeOwned> {
    code: i32,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

impl<T> PackInfo<T>
where
    T: serde::de::DeserializeOwned,
{
    pub fn as_result(self) -> super::Result<T> {
        match self.code {
            super::consts::SUCCESS_CODE => self.data.ok_or(super::Error::UnexpectedResp),
            code => Err(super::Error::APIErr(code, self.message)),
        }
    }

    /// For endpoints that answer `data: null` on success.
    pub fn as_empty(self) -> super::Result<()> {
        match self.code {
            super::consts::SUCCESS_CODE => Ok(()),
            code => Err(super::Error::APIErr(code, self.message)),
        }
    }
}

/// Joins an AList directory and an entry name without doubling the separator.
pub fn join_path(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name.trim_start_matches('/'))
}

fn null_as_empty<'de, D, T>(de: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_list_fills_paths() -> anyhow::Result<()> {
        let body = r#"{"code":200,"message":"success","data":{
            "content":[
                {"name":"01 intro.mp4","size":1024,"is_dir":false,"modified":"2024-05-01T10:00:00Z","sign":"","thumb":"","type":2},
                {"name":"chapter 2","size":0,"is_dir":true,"modified":"2024-05-01T10:00:00Z","type":1}
            ],
            "total":2,"readme":"","write":true,"provider":"Local"}}"#;
        let list = serde_json::from_str::<PackInfo<FsList>>(body)?
            .as_result()?
            .rooted_at("/courses/rust/");
        assert_eq!(*list.total(), 2);
        assert_eq!(list.content()[0].path(), "/courses/rust/01 intro.mp4");
        assert_eq!(list.content()[1].path(), "/courses/rust/chapter 2");
        assert!(*list.content()[1].is_dir());
        Ok(())
    }

    #[test]
    fn test_empty_dir_has_null_content() -> anyhow::Result<()> {
        let body = r#"{"code":200,"message":"success","data":{"content":null,"total":0}}"#;
        let list = serde_json::from_str::<PackInfo<FsList>>(body)?.as_result()?;
        assert!(list.content().is_empty());
        Ok(())
    }

    #[test]
    fn test_api_error_code() -> anyhow::Result<()> {
        let body = r#"{"code":500,"message":"object not found","data":null}"#;
        let err = serde_json::from_str::<PackInfo<FileInfo>>(body)?
            .as_result()
            .unwrap_err();
        assert!(matches!(err, Error::APIErr(500, ref msg) if msg == "object not found"));
        assert!(err.is_not_found());
        Ok(())
    }

    #[test]
    fn test_success_without_data() -> anyhow::Result<()> {
        let body = r#"{"code":200,"message":"success","data":null}"#;
        serde_json::from_str::<PackInfo<serde::de::IgnoredAny>>(body)?.as_empty()?;
        let body = r#"{"code":200,"message":"success","data":null}"#;
        let err = serde_json::from_str::<PackInfo<FileInfo>>(body)?
            .as_result()
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedResp));
        Ok(())
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "a.mp4"), "/a.mp4");
        assert_eq!(join_path("/course", "a.mp4"), "/course/a.mp4");
        assert_eq!(join_path("/course/", ".course_progress.json"), "/course/.course_progress.json");
    }

    #[test]
    fn test_list_param_builder() -> anyhow::Result<()> {
        let param = ListParamBuilder::default()
            .path("/courses")
            .refresh(true)
            .build()?;
        assert_eq!(param.path(), "/courses");
        assert_eq!(*param.page(), 1);
        assert!(*param.refresh());
        Ok(())
    }
}
