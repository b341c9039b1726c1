use crate::routes::{chat, files, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "codechat-server",
    description = "Streaming chat relay and project file access for the codechat editor",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(files::FilesApi::openapi());
    root
}
