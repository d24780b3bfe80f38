pub mod metrics;
pub mod providers;

pub use providers::gradio::GradioClient;
