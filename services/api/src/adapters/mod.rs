pub mod chat_llm;
pub mod db;
pub mod memory;

pub use chat_llm::OpenAiChatAdapter;
pub use db::DbAdapter;
pub use memory::MemoryDbAdapter;
