use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("unexpected resp")]
    UnexpectedResp,
    #[error("api err,code: {0}, msg: {1}")]
    APIErr(i32, String),
    #[error("http status {0} from {1}")]
    HttpStatus(u16, String),
    #[error("reqwest err: {0}")]
    ReqwestErr(#[from] reqwest::Error),
    #[error("parse failed {0}")]
    Parse(#[from] serde_json::Error),
    #[error("progress file is not a json object")]
    NotObject,
    #[error("no course selected")]
    NoCourse,
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("config err: {0}")]
    Config(String),
    #[error("config parse failed {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("config encode failed {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// AList answers a missing object with HTTP 200 and a non-200 `code`
    /// whose message says "not found"; plain 404s are treated the same.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::APIErr(code, msg) => *code == 404 || msg.to_lowercase().contains("not found"),
            Error::HttpStatus(status, _) => *status == 404,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::APIErr(500, "failed get storage: object not found".to_owned()).is_not_found());
        assert!(Error::APIErr(404, "gone".to_owned()).is_not_found());
        assert!(Error::HttpStatus(404, "http://x/raw".to_owned()).is_not_found());
        assert!(!Error::APIErr(401, "token is expired".to_owned()).is_not_found());
        assert!(!Error::UnexpectedResp.is_not_found());
    }
}
