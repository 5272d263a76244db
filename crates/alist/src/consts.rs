pub const DEFAULT_SERVER_URL: &str = "http://localhost:5244";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// AList wraps every response in `{code, message, data}`; this is the success code.
pub const SUCCESS_CODE: i32 = 200;

pub const API_FS_LIST: &str = "/api/fs/list";
pub const API_FS_GET: &str = "/api/fs/get";
pub const API_FS_LINK: &str = "/api/fs/link";
pub const API_FS_FORM: &str = "/api/fs/form";
pub const API_FS_PUT: &str = "/api/fs/put";
pub const API_AUTH_LOGIN: &str = "/api/auth/login";

pub const FILE_PATH_HEADER: &str = "File-Path";

pub const ENV_SERVER_URL: &str = "ALIST_SERVER_URL";
pub const ENV_TOKEN: &str = "ALIST_TOKEN";
