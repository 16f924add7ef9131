pub use inference_client::RemoteInferenceClient;

pub mod inference_client;
