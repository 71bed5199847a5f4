pub mod assistant_client;
pub mod backend;
pub mod chat_client;
pub mod forms_client;

pub use assistant_client::AssistantClient;
pub use backend::{FileHandle, GenerationBackend, RunHandle, RunStatus};
pub use chat_client::ChatClient;
pub use forms_client::FormsClient;
