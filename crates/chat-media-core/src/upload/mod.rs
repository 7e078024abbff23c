mod observer;
mod pipeline;
mod upload_result;

pub use {observer::UploadObserver, pipeline::UploadPipeline, upload_result::UploadResult};
